// 🏗️ Record Parser - pipe-delimited sales lines → TransactionRecord
// Positional parse: fields are never matched by column name

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Minimum number of pipe-separated fields a line needs to become a record
pub const MIN_FIELDS: usize = 8;

/// Field delimiter of the sales log
pub const DELIMITER: u8 = b'|';

/// TransactionRecord - one parsed sales line, not yet validated
///
/// The amount is never stored; it is `quantity * unit_price`, computed on
/// demand so filtered copies can never carry a stale total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,

    /// `YYYY-MM-DD`, kept as text (lexical order == chronological order)
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "ProductID")]
    pub product_id: String,

    /// Display name with commas removed
    #[serde(rename = "ProductName")]
    pub product_name: String,

    #[serde(rename = "Quantity")]
    pub quantity: i64,

    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,

    #[serde(rename = "CustomerID")]
    pub customer_id: String,

    #[serde(rename = "Region")]
    pub region: String,
}

impl TransactionRecord {
    /// Transaction total: quantity × unit price
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

// ============================================================================
// LINE PARSING
// ============================================================================

/// Parse raw lines into records.
///
/// Lines with fewer than 8 fields, or whose quantity/price are not numeric,
/// are dropped without being counted anywhere: they never become records.
/// Fields beyond the eighth are ignored.
pub fn parse_transactions<S: AsRef<str>>(raw_lines: &[S]) -> Vec<TransactionRecord> {
    raw_lines
        .iter()
        .filter_map(|line| parse_line(line.as_ref()))
        .collect()
}

/// Parse a single line, `None` when it is malformed
pub fn parse_line(line: &str) -> Option<TransactionRecord> {
    // Quotes carry no meaning in the sales log, so quoting is disabled and a
    // stray `"` stays part of its field.
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let fields = reader.records().next()?.ok()?;
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let quantity = parse_quantity(&fields[4])?;
    let unit_price = parse_price(&fields[5])?;

    Some(TransactionRecord {
        transaction_id: fields[0].to_string(),
        date: fields[1].to_string(),
        product_id: fields[2].to_string(),
        product_name: fields[3].replace(',', ""),
        quantity,
        unit_price,
        customer_id: fields[6].to_string(),
        region: fields[7].to_string(),
    })
}

/// Integer quantity, commas tolerated as thousands separators ("1,200" → 1200)
fn parse_quantity(raw: &str) -> Option<i64> {
    raw.replace(',', "").parse().ok()
}

/// Unit price, commas tolerated as thousands separators ("45,000" → 45000.0)
fn parse_price(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================
