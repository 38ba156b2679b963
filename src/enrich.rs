// 🔗 Catalog Enrichment - join records to catalog entries by numeric key
//
// Key rule: first run of ASCII digits in the product id ("P101" → 101).
// No digits → no key → unmatched. Every input record yields one output record.

use crate::catalog::CatalogMap;
use crate::parser::TransactionRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// ENRICHED RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub record: TransactionRecord,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
    pub matched: bool,
}

impl EnrichedRecord {
    pub fn unmatched(record: TransactionRecord) -> Self {
        EnrichedRecord {
            record,
            category: None,
            brand: None,
            rating: None,
            matched: false,
        }
    }
}

// ============================================================================
// KEY EXTRACTION + MERGE
// ============================================================================

/// Numeric catalog key embedded in a product id.
///
/// A digit run too long for `u64` yields no key.
pub fn extract_catalog_key(product_id: &str) -> Option<u64> {
    let start = product_id.find(|c: char| c.is_ascii_digit())?;
    let digits = &product_id[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse().ok()
}

/// Merge catalog attributes into one record (input is left untouched)
pub fn enrich_record(record: &TransactionRecord, catalog: &CatalogMap) -> EnrichedRecord {
    let info = extract_catalog_key(&record.product_id).and_then(|key| catalog.get(&key));

    match info {
        Some(info) => EnrichedRecord {
            record: record.clone(),
            category: info.category.clone(),
            brand: info.brand.clone(),
            rating: info.rating,
            matched: true,
        },
        None => EnrichedRecord::unmatched(record.clone()),
    }
}

/// Enrich every record, preserving order and count
pub fn enrich_sales_data(records: &[TransactionRecord], catalog: &CatalogMap) -> Vec<EnrichedRecord> {
    records.iter().map(|r| enrich_record(r, catalog)).collect()
}

// ============================================================================
// ENRICHMENT SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub matched: usize,
    /// Percentage, 2 decimals; 0 when there is nothing to enrich
    pub success_rate: f64,
    /// Distinct unmatched product names in first-seen order
    pub unmatched_products: Vec<String>,
}

impl EnrichmentSummary {
    pub fn from_records(enriched: &[EnrichedRecord]) -> Self {
        let total = enriched.len();
        let matched = enriched.iter().filter(|e| e.matched).count();
        let success_rate = if total > 0 {
            crate::analytics::round2(matched as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let mut unmatched_products: Vec<String> = Vec::new();
        for e in enriched.iter().filter(|e| !e.matched) {
            if seen.insert(e.record.product_name.as_str()) {
                unmatched_products.push(e.record.product_name.clone());
            }
        }

        EnrichmentSummary {
            total,
            matched,
            success_rate,
            unmatched_products,
        }
    }
}

// ============================================================================
// ENRICHED FILE
// ============================================================================

/// Column order of the enriched output file (matches serialization order)
pub const ENRICHED_HEADERS: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

/// Flat row as written to disk; `None` renders as an empty field
#[derive(Serialize)]
struct EnrichedRow<'a> {
    #[serde(rename = "TransactionID")]
    transaction_id: &'a str,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "ProductID")]
    product_id: &'a str,
    #[serde(rename = "ProductName")]
    product_name: &'a str,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "UnitPrice")]
    unit_price: f64,
    #[serde(rename = "CustomerID")]
    customer_id: &'a str,
    #[serde(rename = "Region")]
    region: &'a str,
    #[serde(rename = "API_Category")]
    category: Option<&'a str>,
    #[serde(rename = "API_Brand")]
    brand: Option<&'a str>,
    #[serde(rename = "API_Rating")]
    rating: Option<f64>,
    #[serde(rename = "API_Match", serialize_with = "serialize_match_flag")]
    matched: bool,
}

/// Match flag as `True` / `False`
fn serialize_match_flag<S: Serializer>(matched: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *matched { "True" } else { "False" })
}

impl<'a> From<&'a EnrichedRecord> for EnrichedRow<'a> {
    fn from(e: &'a EnrichedRecord) -> Self {
        EnrichedRow {
            transaction_id: &e.record.transaction_id,
            date: &e.record.date,
            product_id: &e.record.product_id,
            product_name: &e.record.product_name,
            quantity: e.record.quantity,
            unit_price: e.record.unit_price,
            customer_id: &e.record.customer_id,
            region: &e.record.region,
            category: e.category.as_deref(),
            brand: e.brand.as_deref(),
            rating: e.rating,
            matched: e.matched,
        }
    }
}

/// Render enriched records as pipe-delimited text with a header row
pub fn render_enriched(enriched: &[EnrichedRecord]) -> Result<String> {
    // Same convention as the input log: no quoting, fields cannot contain `|`
    let mut writer = csv::WriterBuilder::new()
        .delimiter(crate::parser::DELIMITER)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    if enriched.is_empty() {
        writer.write_record(ENRICHED_HEADERS)?;
    }
    for e in enriched {
        writer.serialize(EnrichedRow::from(e))?;
    }

    let bytes = writer.into_inner().context("Failed to flush enriched rows")?;
    String::from_utf8(bytes).context("Enriched rows are not valid UTF-8")
}

/// Write the enriched file, creating its directory if needed
pub fn save_enriched_data(enriched: &[EnrichedRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = render_enriched(enriched)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write enriched data: {}", path.display()))?;

    log::info!("Enriched data saved to {}", path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogInfo;

    fn create_test_record(id: &str, product_id: &str, product_name: &str) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            date: "2024-12-01".to_string(),
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            quantity: 2,
            unit_price: 45000.0,
            customer_id: "C001".to_string(),
            region: "North".to_string(),
        }
    }

    fn test_catalog() -> CatalogMap {
        let mut map = CatalogMap::new();
        map.insert(
            101,
            CatalogInfo {
                category: Some("laptops".to_string()),
                brand: Some("Apple".to_string()),
                rating: Some(4.7),
            },
        );
        map.insert(
            5,
            CatalogInfo {
                category: Some("smartphones".to_string()),
                brand: None,
                rating: None,
            },
        );
        map
    }

    #[test]
    fn test_extract_catalog_key() {
        assert_eq!(extract_catalog_key("P101"), Some(101));
        assert_eq!(extract_catalog_key("P007"), Some(7));
        assert_eq!(extract_catalog_key("P12-34"), Some(12));
        assert_eq!(extract_catalog_key("SKU-9X"), Some(9));
        assert_eq!(extract_catalog_key("PROMO"), None);
        assert_eq!(extract_catalog_key(""), None);
        assert_eq!(extract_catalog_key("P99999999999999999999999"), None);
    }

    #[test]
    fn test_enrich_matched_and_unmatched() {
        let records = vec![
            create_test_record("T001", "P101", "Laptop"),
            create_test_record("T002", "P999", "Mouse"),
            create_test_record("T003", "PROMO", "Gift Card"),
            create_test_record("T004", "P5", "Phone"),
        ];

        let enriched = enrich_sales_data(&records, &test_catalog());

        assert_eq!(enriched.len(), 4);

        assert!(enriched[0].matched);
        assert_eq!(enriched[0].category.as_deref(), Some("laptops"));
        assert_eq!(enriched[0].brand.as_deref(), Some("Apple"));
        assert_eq!(enriched[0].rating, Some(4.7));
        assert_eq!(enriched[0].record, records[0]);

        assert!(!enriched[1].matched);
        assert_eq!(enriched[1].category, None);
        assert!(!enriched[2].matched);

        // Matched even though the catalog entry has no brand
        assert!(enriched[3].matched);
        assert_eq!(enriched[3].brand, None);
    }

    #[test]
    fn test_enrichment_is_total_with_empty_catalog() {
        let records = vec![
            create_test_record("T001", "P101", "Laptop"),
            create_test_record("T002", "P102", "Mouse"),
        ];

        let enriched = enrich_sales_data(&records, &CatalogMap::new());

        assert_eq!(enriched.len(), records.len());
        assert!(enriched.iter().all(|e| !e.matched));
    }

    #[test]
    fn test_enrichment_summary() {
        let records = vec![
            create_test_record("T001", "P101", "Laptop"),
            create_test_record("T002", "P999", "Mouse"),
            create_test_record("T003", "P998", "Mouse"),
            create_test_record("T004", "PROMO", "Gift Card"),
        ];
        let enriched = enrich_sales_data(&records, &test_catalog());

        let summary = EnrichmentSummary::from_records(&enriched);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.success_rate, 25.0);
        assert_eq!(summary.unmatched_products, vec!["Mouse", "Gift Card"]);
    }

    #[test]
    fn test_unmatched_names_distinct_in_first_seen_order() {
        let records: Vec<TransactionRecord> = (0..2000)
            .map(|i| create_test_record(&format!("T{}", i), "PROMO", &format!("Item {}", i % 500)))
            .collect();
        let enriched = enrich_sales_data(&records, &CatalogMap::new());

        let summary = EnrichmentSummary::from_records(&enriched);

        assert_eq!(summary.unmatched_products.len(), 500);
        assert_eq!(summary.unmatched_products[0], "Item 0");
        assert_eq!(summary.unmatched_products[499], "Item 499");
    }

    #[test]
    fn test_enrichment_summary_empty() {
        let summary = EnrichmentSummary::from_records(&[]);
        assert_eq!(summary.success_rate, 0.0);
    }

    #[test]
    fn test_render_enriched_layout() {
        let records = vec![
            create_test_record("T001", "P101", "Laptop"),
            create_test_record("T002", "P999", "Mouse"),
        ];
        let enriched = enrich_sales_data(&records, &test_catalog());

        let text = render_enriched(&enriched).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], ENRICHED_HEADERS.join("|"));
        assert_eq!(
            lines[1],
            "T001|2024-12-01|P101|Laptop|2|45000.0|C001|North|laptops|Apple|4.7|True"
        );
        assert_eq!(lines[2], "T002|2024-12-01|P999|Mouse|2|45000.0|C001|North||||False");
    }

    #[test]
    fn test_match_flag_is_capitalized() {
        let enriched = enrich_sales_data(
            &[
                create_test_record("T001", "P101", "Laptop"),
                create_test_record("T002", "PROMO", "Gift Card"),
            ],
            &test_catalog(),
        );

        let text = render_enriched(&enriched).unwrap();
        let flags: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|line| line.rsplit('|').next().unwrap())
            .collect();

        assert_eq!(flags, vec!["True", "False"]);
        assert!(!text.contains("|true") && !text.contains("|false"));
    }

    #[test]
    fn test_save_enriched_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("enriched.txt");
        let enriched = enrich_sales_data(&[create_test_record("T001", "P101", "Laptop")], &test_catalog());

        save_enriched_data(&enriched, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
