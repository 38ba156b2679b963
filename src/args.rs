use clap::Parser;
use sales_analytics::config::{
    CatalogConfig, PipelineConfig, DEFAULT_CATALOG_TIMEOUT_SECS, DEFAULT_CATALOG_URL,
    DEFAULT_DATA_FILE, DEFAULT_ENRICHED_FILE, DEFAULT_REPORT_FILE,
};
use sales_analytics::FilterOptions;
use std::path::PathBuf;
use std::time::Duration;

/// Clean a pipe-delimited sales log, analyze it, enrich it from the product
/// catalog and write a text report.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Sales log to read
    #[arg(long, env = "SALES_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Where to write the enriched records
    #[arg(long, env = "SALES_ENRICHED_FILE", default_value = DEFAULT_ENRICHED_FILE)]
    pub enriched_file: PathBuf,

    /// Where to write the report
    #[arg(long, env = "SALES_REPORT_FILE", default_value = DEFAULT_REPORT_FILE)]
    pub report_file: PathBuf,

    /// Product listing endpoint
    #[arg(long, env = "SALES_CATALOG_URL", default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    /// Catalog request timeout in seconds
    #[arg(long, env = "SALES_CATALOG_TIMEOUT_SECS", default_value_t = DEFAULT_CATALOG_TIMEOUT_SECS)]
    pub catalog_timeout_secs: u64,

    /// Keep only this region
    #[arg(long)]
    pub region: Option<String>,

    /// Drop transactions below this amount
    #[arg(long)]
    pub min_amount: Option<f64>,

    /// Drop transactions above this amount
    #[arg(long)]
    pub max_amount: Option<f64>,

    /// Never ask for filters; use the flags above (or none)
    #[arg(long)]
    pub no_prompt: bool,

    /// Also write the run summary as JSON
    #[arg(long, env = "SALES_SUMMARY_JSON")]
    pub summary_json: Option<PathBuf>,
}

impl Args {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            data_file: self.data_file.clone(),
            enriched_file: self.enriched_file.clone(),
            report_file: self.report_file.clone(),
            catalog: CatalogConfig {
                url: self.catalog_url.clone(),
                timeout: Duration::from_secs(self.catalog_timeout_secs),
            },
        }
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            region: self.region.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        }
    }

    /// Filters come from flags when any is set or prompting is disabled
    pub fn filters_from_flags(&self) -> bool {
        self.no_prompt || !self.filter_options().is_empty()
    }
}

pub fn parse() -> Args {
    Args::parse()
}
