// 📝 Sales Report - fixed-section text document
//
// Rendering recomputes every aggregate from the records it is given, so a
// report is self-consistent even when called on its own.

use crate::analytics::{self, REPORT_LOW_PERFORMER_THRESHOLD};
use crate::enrich::{EnrichedRecord, EnrichmentSummary};
use crate::parser::TransactionRecord;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const RULE_HEAVY: &str = "==================================================";
const RULE_LIGHT: &str = "--------------------------------------------------";

/// Rows shown in the top products / top customers tables
const TOP_ROWS: usize = 5;

/// Unmatched product names listed in the enrichment section
const UNMATCHED_SAMPLE: usize = 5;

// ============================================================================
// NUMBER FORMATTING
// ============================================================================

/// `1234567.891` → `"1,234,567.89"`
pub fn format_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// `1234.5` → `"$1,234.50"`
pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value))
}

// ============================================================================
// RENDERING
// ============================================================================

/// Render the full report for `records` and their enriched counterparts
pub fn render_report(
    records: &[TransactionRecord],
    enriched: &[EnrichedRecord],
    generated_at: NaiveDateTime,
) -> Result<String> {
    let mut out = String::new();
    write_sections(&mut out, records, enriched, generated_at)
        .context("Failed to render sales report")?;
    Ok(out)
}

fn write_sections(
    out: &mut String,
    records: &[TransactionRecord],
    enriched: &[EnrichedRecord],
    generated_at: NaiveDateTime,
) -> std::fmt::Result {
    let total_revenue = analytics::total_revenue(records);
    let total_txns = records.len();
    let avg_order_value = if total_txns > 0 {
        total_revenue / total_txns as f64
    } else {
        0.0
    };

    let first_date = records.iter().map(|r| r.date.as_str()).min();
    let last_date = records.iter().map(|r| r.date.as_str()).max();
    let date_range = match (first_date, last_date) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "N/A".to_string(),
    };

    // Header
    writeln!(out, "SALES ANALYTICS REPORT")?;
    writeln!(out, "{}", RULE_HEAVY)?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Records Processed: {}", total_txns)?;
    writeln!(out, "{}", RULE_HEAVY)?;
    writeln!(out)?;

    // Overall summary
    writeln!(out, "OVERALL SUMMARY")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "Total Revenue:       {}", format_currency(total_revenue))?;
    writeln!(out, "Total Transactions:  {}", total_txns)?;
    writeln!(out, "Average Order Value: {}", format_currency(avg_order_value))?;
    writeln!(out, "Date Range:          {}", date_range)?;
    writeln!(out)?;

    // Regions, highest sales first
    let mut regions = analytics::region_wise_sales(records);
    regions.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));

    writeln!(out, "REGION-WISE PERFORMANCE")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "{:<15} {:<15} {:<15} {:<15}", "Region", "Sales", "% of Total", "Transactions")?;
    for region in &regions {
        writeln!(
            out,
            "{:<15} ${:<14} {:<14}% {:<15}",
            region.region,
            format_thousands(region.total_sales),
            format!("{:.2}", region.percentage),
            region.transaction_count
        )?;
    }
    writeln!(out)?;

    // Top products
    writeln!(out, "TOP 5 PRODUCTS")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "{:<5} {:<30} {:<10} {:<15}", "Rank", "Product Name", "Qty Sold", "Revenue")?;
    for (rank, product) in analytics::top_selling_products(records, TOP_ROWS).iter().enumerate() {
        writeln!(
            out,
            "{:<5} {:<30} {:<10} ${:<15}",
            rank + 1,
            product.name,
            product.total_quantity,
            format_thousands(product.total_revenue)
        )?;
    }
    writeln!(out)?;

    // Top customers
    writeln!(out, "TOP 5 CUSTOMERS")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "{:<5} {:<15} {:<15} {:<10}", "Rank", "Customer ID", "Total Spent", "Orders")?;
    for (rank, customer) in analytics::customer_analysis(records).iter().take(TOP_ROWS).enumerate() {
        writeln!(
            out,
            "{:<5} {:<15} ${:<14} {:<10}",
            rank + 1,
            customer.customer_id,
            format_thousands(customer.total_spent),
            customer.purchase_count
        )?;
    }
    writeln!(out)?;

    // Daily trend
    writeln!(out, "DAILY SALES TREND")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "{:<15} {:<15} {:<10} {:<15}", "Date", "Revenue", "Txns", "Unique Cust")?;
    for day in analytics::daily_sales_trend(records) {
        writeln!(
            out,
            "{:<15} ${:<14} {:<9} {:<15}",
            day.date,
            format_thousands(day.revenue),
            day.transaction_count,
            day.unique_customers
        )?;
    }
    writeln!(out)?;

    // Product performance
    writeln!(out, "PRODUCT PERFORMANCE ANALYSIS")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    let peak = analytics::find_peak_sales_day(records);
    match &peak.date {
        Some(date) => writeln!(
            out,
            "Best Selling Day: {} (Revenue: {}, Txns: {})",
            date,
            format_currency(peak.revenue),
            peak.transaction_count
        )?,
        None => writeln!(out, "Best Selling Day: N/A")?,
    }

    let low = analytics::low_performing_products(records, REPORT_LOW_PERFORMER_THRESHOLD);
    writeln!(out, "Low Performing Products (Qty < {}):", REPORT_LOW_PERFORMER_THRESHOLD)?;
    if low.is_empty() {
        writeln!(out, "  None")?;
    }
    for product in &low {
        writeln!(
            out,
            "  - {}: {} sold ({})",
            product.name,
            product.total_quantity,
            format_currency(product.total_revenue)
        )?;
    }
    writeln!(out)?;

    // Enrichment
    let enrichment = EnrichmentSummary::from_records(enriched);
    writeln!(out, "API ENRICHMENT SUMMARY")?;
    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "Total Products Processed:       {}", enrichment.total)?;
    writeln!(out, "Successfully Enriched:          {}", enrichment.matched)?;
    writeln!(out, "Enrichment Success Rate:        {:.2}%", enrichment.success_rate)?;
    if !enrichment.unmatched_products.is_empty() {
        let sample: Vec<&str> = enrichment
            .unmatched_products
            .iter()
            .take(UNMATCHED_SAMPLE)
            .map(String::as_str)
            .collect();
        let more = if enrichment.unmatched_products.len() > UNMATCHED_SAMPLE {
            "..."
        } else {
            ""
        };
        writeln!(out, "Products not enriched (Sample): {}{}", sample.join(", "), more)?;
    }

    Ok(())
}

/// Render the report (timestamped now) and write it, creating its directory
pub fn generate_sales_report(
    records: &[TransactionRecord],
    enriched: &[EnrichedRecord],
    path: &Path,
) -> Result<()> {
    let content = render_report(records, enriched, chrono::Local::now().naive_local())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    log::info!("Report written to {}", path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
