mod args;

use anyhow::Result;
use std::process::ExitCode;

use sales_analytics::{
    ConsoleObserver, FilterSource, FixedFilters, HttpCatalogClient, Pipeline, PipelineOutcome,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    ConsoleObserver::banner();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\n❌ CRITICAL ERROR: {:#}", err);
            eprintln!("{:?}", err);
            eprintln!("The program encountered an unexpected error and had to stop.");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = args::parse();
    let config = args.pipeline_config();

    let catalog = HttpCatalogClient::from_config(&config.catalog)?;
    let mut filters = filter_source(&args);
    let mut observer = ConsoleObserver::new();

    let outcome = Pipeline::new(&config, &catalog, &mut *filters, &mut observer).run()?;

    if let PipelineOutcome::Completed(run) = outcome {
        if run.enriched_file.is_none() || run.report_file.is_none() {
            log::warn!("Finished with write failures; see messages above");
        }
        if let Some(path) = &args.summary_json {
            run.save_json(path)?;
            println!("✓ Run summary saved to: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(feature = "interactive")]
fn filter_source(args: &args::Args) -> Box<dyn FilterSource> {
    if args.filters_from_flags() {
        Box::new(FixedFilters(args.filter_options()))
    } else {
        Box::new(sales_analytics::prompt::PromptFilters::detect())
    }
}

#[cfg(not(feature = "interactive"))]
fn filter_source(args: &args::Args) -> Box<dyn FilterSource> {
    if !args.filters_from_flags() {
        log::info!("Interactive prompt not available (build with --features interactive); no filters applied");
    }
    Box::new(FixedFilters(args.filter_options()))
}
