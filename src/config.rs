// ⚙️ Pipeline configuration - file locations and catalog endpoint

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_FILE: &str = "data/sales_data.txt";
pub const DEFAULT_ENRICHED_FILE: &str = "data/enriched_sales_data.txt";
pub const DEFAULT_REPORT_FILE: &str = "output/sales_report.txt";
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products?limit=100";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Pipe-delimited sales log to ingest
    pub data_file: PathBuf,
    /// Destination of the enriched, pipe-delimited records
    pub enriched_file: PathBuf,
    /// Destination of the text report
    pub report_file: PathBuf,
    pub catalog: CatalogConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            enriched_file: PathBuf::from(DEFAULT_ENRICHED_FILE),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
            catalog: CatalogConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Relocate all three files under `base`
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        PipelineConfig {
            data_file: base.join(DEFAULT_DATA_FILE),
            enriched_file: base.join(DEFAULT_ENRICHED_FILE),
            report_file: base.join(DEFAULT_REPORT_FILE),
            catalog: CatalogConfig::default(),
        }
    }
}
