// 🖥️ Console progress - prints pipeline events as "[n/10]" narration

use crate::pipeline::{HaltReason, PipelineEvent, PipelineObserver, Stage};
use crate::report::format_currency;

#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        ConsoleObserver
    }

    pub fn banner() {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("📊 SALES ANALYTICS SYSTEM");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}

impl PipelineObserver for ConsoleObserver {
    fn notify(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted(stage) => {
                println!("\n[{}/{}] {}", stage.number(), Stage::TOTAL, stage.label());
            }
            PipelineEvent::ReadFailed(error) => {
                eprintln!("❌ {}", error);
            }
            PipelineEvent::LinesRead(count) => {
                println!("✓ Successfully read {} transactions", count);
            }
            PipelineEvent::RecordsParsed(count) => {
                println!("✓ Parsed {} records", count);
            }
            PipelineEvent::DataStats(stats) => {
                println!("Available Regions: {}", stats.regions.join(", "));
                println!(
                    "Transaction Amount Range: {} - {}",
                    format_currency(stats.min_amount),
                    format_currency(stats.max_amount)
                );
            }
            PipelineEvent::Validated(summary) => {
                println!("✓ Valid: {} | Invalid: {}", summary.final_count, summary.invalid);
                for (rule, count) in &summary.rejected_by_rule {
                    println!("   • {}: {}", rule.description(), count);
                }
                if summary.filtered_by_region > 0 || summary.filtered_by_amount > 0 {
                    println!(
                        "   Filtered out: {} by region, {} by amount",
                        summary.filtered_by_region, summary.filtered_by_amount
                    );
                }
            }
            PipelineEvent::Analyzed(analysis) => {
                println!("✓ Analysis complete: {}", analysis.summary());
            }
            PipelineEvent::CatalogUnavailable(error) => {
                eprintln!("⚠️  Catalog unavailable: {}", error);
            }
            PipelineEvent::CatalogFetched(count) => {
                println!("✓ Fetched {} products", count);
            }
            PipelineEvent::Enriched(summary) => {
                println!(
                    "✓ Enriched {}/{} transactions ({:.1}%)",
                    summary.matched, summary.total, summary.success_rate
                );
            }
            PipelineEvent::EnrichedSaved(path) => {
                println!("✓ Saved to: {}", path.display());
            }
            PipelineEvent::ReportSaved(path) => {
                println!("✓ Report saved to: {}", path.display());
            }
            PipelineEvent::WriteFailed { stage, error } => {
                eprintln!("❌ {} failed: {}", stage.label().trim_end_matches("..."), error);
            }
            PipelineEvent::Halted(HaltReason::NoData) => {
                println!("No data found or empty file. Exiting.");
            }
            PipelineEvent::Halted(HaltReason::NoValidRecords) => {
                println!("No valid data remaining after filtering. Aborting analysis.");
            }
            PipelineEvent::Completed => {
                println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                println!("🎉 Done!");
            }
        }
    }
}
