// Sales Analytics System - Core Library
// Exposes the pipeline stages for use in the CLI and tests

pub mod ingest;         // Raw file → lines (encoding fallback, header drop)
pub mod parser;         // Lines → TransactionRecord
pub mod validation;     // Business rules + region/amount filters
pub mod analytics;      // Seven aggregate views
pub mod catalog;        // Remote product catalog
pub mod enrich;         // Catalog join + enriched file
pub mod report;         // Text report
pub mod pipeline;       // Stage orchestration
pub mod config;
pub mod console;

#[cfg(feature = "interactive")]
pub mod prompt;

// Re-export commonly used types
pub use ingest::{read_sales_data, try_read_sales_data, SourceEncoding};
pub use parser::{parse_transactions, TransactionRecord};
pub use validation::{
    apply, describe, validate_and_filter,
    DataStats, FilterOptions, FilterOutcome, ValidationRule, ValidationSummary,
};
pub use analytics::{
    analyze, customer_analysis, daily_sales_trend, find_peak_sales_day,
    low_performing_products, region_wise_sales, top_selling_products, total_revenue,
    CustomerStat, DailyStat, PeakDay, ProductAggregate, RegionStat, SalesAnalysis,
};
pub use catalog::{
    create_product_mapping, fetch_all_products,
    CatalogEntry, CatalogInfo, CatalogMap, CatalogSource, HttpCatalogClient, StaticCatalog,
};
pub use enrich::{
    enrich_sales_data, extract_catalog_key, save_enriched_data,
    EnrichedRecord, EnrichmentSummary,
};
pub use report::{generate_sales_report, render_report};
pub use pipeline::{
    FilterSource, FixedFilters, HaltReason, Pipeline, PipelineEvent, PipelineObserver,
    PipelineOutcome, PipelineRun, RecordingObserver, SilentObserver, Stage,
};
pub use config::{CatalogConfig, PipelineConfig};
pub use console::ConsoleObserver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
