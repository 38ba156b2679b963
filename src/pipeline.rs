// 🔄 Sales Pipeline - read → parse → validate/filter → analyze → enrich → write
//
// Presentation stays outside: the pipeline only emits PipelineEvents to an
// observer, and asks a FilterSource which filters to apply.

use crate::analytics::{self, SalesAnalysis};
use crate::catalog::{create_product_mapping, CatalogSource};
use crate::config::PipelineConfig;
use crate::enrich::{self, EnrichedRecord, EnrichmentSummary};
use crate::ingest;
use crate::parser;
use crate::report;
use crate::validation::{self, DataStats, FilterOptions, ValidationSummary};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// STAGES & EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Parse,
    FilterOptions,
    Validate,
    Analyze,
    FetchCatalog,
    Enrich,
    SaveEnriched,
    Report,
    Complete,
}

impl Stage {
    pub const TOTAL: usize = 10;

    /// 1-based position in the run
    pub fn number(&self) -> usize {
        match self {
            Stage::Read => 1,
            Stage::Parse => 2,
            Stage::FilterOptions => 3,
            Stage::Validate => 4,
            Stage::Analyze => 5,
            Stage::FetchCatalog => 6,
            Stage::Enrich => 7,
            Stage::SaveEnriched => 8,
            Stage::Report => 9,
            Stage::Complete => 10,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Stage::Read => "Reading sales data...",
            Stage::Parse => "Parsing and cleaning data...",
            Stage::FilterOptions => "Filter Options Available:",
            Stage::Validate => "Validating transactions...",
            Stage::Analyze => "Analyzing sales data...",
            Stage::FetchCatalog => "Fetching product data from API...",
            Stage::Enrich => "Enriching sales data...",
            Stage::SaveEnriched => "Saving enriched data...",
            Stage::Report => "Generating report...",
            Stage::Complete => "Process Complete!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// Ingestion produced no lines (missing, undecodable or empty file)
    NoData,
    /// Nothing survived validation and filtering
    NoValidRecords,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    ReadFailed(String),
    LinesRead(usize),
    RecordsParsed(usize),
    DataStats(DataStats),
    Validated(ValidationSummary),
    Analyzed(SalesAnalysis),
    CatalogUnavailable(String),
    CatalogFetched(usize),
    Enriched(EnrichmentSummary),
    EnrichedSaved(PathBuf),
    ReportSaved(PathBuf),
    WriteFailed { stage: Stage, error: String },
    Halted(HaltReason),
    Completed,
}

/// Receives stage notifications; the default implementation ignores them
pub trait PipelineObserver {
    fn notify(&mut self, _event: &PipelineEvent) {}
}

/// Observer that discards everything
#[derive(Debug, Default)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

/// Observer that keeps every event, in order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<PipelineEvent>,
}

impl PipelineObserver for RecordingObserver {
    fn notify(&mut self, event: &PipelineEvent) {
        self.events.push(event.clone());
    }
}

// ============================================================================
// FILTER SOURCE
// ============================================================================

/// Decides which filters to apply, given what the valid data looks like
pub trait FilterSource {
    fn choose_filters(&mut self, stats: &DataStats) -> Result<FilterOptions>;
}

/// Filters decided up front (command-line flags, tests)
#[derive(Debug, Clone, Default)]
pub struct FixedFilters(pub FilterOptions);

impl FilterSource for FixedFilters {
    fn choose_filters(&mut self, _stats: &DataStats) -> Result<FilterOptions> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub summary: ValidationSummary,
    pub filters: FilterOptions,
    pub analysis: SalesAnalysis,
    pub enriched: Vec<EnrichedRecord>,
    pub enrichment: EnrichmentSummary,
    /// `None` when the write failed
    pub enriched_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
}

impl PipelineRun {
    /// Pretty JSON of the whole run (summary, filters, analysis, enrichment)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize run summary")
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, json)
            .with_context(|| format!("Failed to write run summary: {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Halted(HaltReason),
    Completed(Box<PipelineRun>),
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    catalog: &'a dyn CatalogSource,
    filters: &'a mut dyn FilterSource,
    observer: &'a mut dyn PipelineObserver,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        catalog: &'a dyn CatalogSource,
        filters: &'a mut dyn FilterSource,
        observer: &'a mut dyn PipelineObserver,
    ) -> Self {
        Pipeline {
            config,
            catalog,
            filters,
            observer,
        }
    }

    fn emit(&mut self, event: PipelineEvent) {
        self.observer.notify(&event);
    }

    fn start(&mut self, stage: Stage) {
        self.emit(PipelineEvent::StageStarted(stage));
    }

    fn halt(&mut self, reason: HaltReason) -> PipelineOutcome {
        self.emit(PipelineEvent::Halted(reason));
        PipelineOutcome::Halted(reason)
    }

    /// Run every stage.
    ///
    /// Only the filter source can make this return `Err`; read, fetch and
    /// write failures are reported as events and degrade the run instead.
    pub fn run(&mut self) -> Result<PipelineOutcome> {
        // 1. Read
        self.start(Stage::Read);
        let lines = match ingest::try_read_sales_data(&self.config.data_file) {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!("{:#}", err);
                self.emit(PipelineEvent::ReadFailed(format!("{:#}", err)));
                Vec::new()
            }
        };
        if lines.is_empty() {
            return Ok(self.halt(HaltReason::NoData));
        }
        self.emit(PipelineEvent::LinesRead(lines.len()));

        // 2. Parse
        self.start(Stage::Parse);
        let records = parser::parse_transactions(&lines);
        self.emit(PipelineEvent::RecordsParsed(records.len()));

        // 3. Filter options
        self.start(Stage::FilterOptions);
        let stats = validation::describe(&records);
        self.emit(PipelineEvent::DataStats(stats.clone()));
        let filters = self.filters.choose_filters(&stats)?;

        // 4. Validate + filter
        self.start(Stage::Validate);
        let outcome = validation::apply(&records, &filters);
        self.emit(PipelineEvent::Validated(outcome.summary.clone()));
        if outcome.records.is_empty() {
            return Ok(self.halt(HaltReason::NoValidRecords));
        }
        let valid = outcome.records;

        // 5. Analyze
        self.start(Stage::Analyze);
        let analysis = analytics::analyze(&valid);
        self.emit(PipelineEvent::Analyzed(analysis.clone()));

        // 6. Fetch catalog
        self.start(Stage::FetchCatalog);
        let products = match self.catalog.fetch_products() {
            Ok(products) => products,
            Err(err) => {
                log::warn!("Error fetching catalog data: {:#}", err);
                self.emit(PipelineEvent::CatalogUnavailable(format!("{:#}", err)));
                Vec::new()
            }
        };
        self.emit(PipelineEvent::CatalogFetched(products.len()));

        // 7. Enrich
        self.start(Stage::Enrich);
        let catalog_map = create_product_mapping(&products);
        let enriched = enrich::enrich_sales_data(&valid, &catalog_map);
        let enrichment = EnrichmentSummary::from_records(&enriched);
        self.emit(PipelineEvent::Enriched(enrichment.clone()));

        // 8. Save enriched data
        self.start(Stage::SaveEnriched);
        let enriched_path = self.config.enriched_file.clone();
        let enriched_file = match enrich::save_enriched_data(&enriched, &enriched_path) {
            Ok(()) => {
                self.emit(PipelineEvent::EnrichedSaved(enriched_path.clone()));
                Some(enriched_path)
            }
            Err(err) => {
                log::error!("{:#}", err);
                self.emit(PipelineEvent::WriteFailed {
                    stage: Stage::SaveEnriched,
                    error: format!("{:#}", err),
                });
                None
            }
        };

        // 9. Report
        self.start(Stage::Report);
        let report_path = self.config.report_file.clone();
        let report_file = match report::generate_sales_report(&valid, &enriched, &report_path) {
            Ok(()) => {
                self.emit(PipelineEvent::ReportSaved(report_path.clone()));
                Some(report_path)
            }
            Err(err) => {
                log::error!("{:#}", err);
                self.emit(PipelineEvent::WriteFailed {
                    stage: Stage::Report,
                    error: format!("{:#}", err),
                });
                None
            }
        };

        // 10. Done
        self.start(Stage::Complete);
        self.emit(PipelineEvent::Completed);

        Ok(PipelineOutcome::Completed(Box::new(PipelineRun {
            summary: outcome.summary,
            filters,
            analysis,
            enriched,
            enrichment,
            enriched_file,
            report_file,
        })))
    }
}

// ============================================================================
// TESTS
// ============================================================================
