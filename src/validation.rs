// ✅ Validation & Filtering - business rules, then optional user filters
//
// Two explicit operations:
//   describe(records)        → what the valid data looks like (regions, amount range)
//   apply(records, filters)  → validated + filtered records and a summary
//
// Rejection is boolean; the first failing rule is only kept for the breakdown.

use crate::parser::TransactionRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// VALIDATION RULES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValidationRule {
    QuantityPositive,
    UnitPricePositive,
    RequiredFieldsPresent,
    TransactionIdPrefix,
    ProductIdPrefix,
    CustomerIdPrefix,
}

impl ValidationRule {
    /// Evaluation order (short-circuits on the first failure)
    pub const ALL: [ValidationRule; 6] = [
        ValidationRule::QuantityPositive,
        ValidationRule::UnitPricePositive,
        ValidationRule::RequiredFieldsPresent,
        ValidationRule::TransactionIdPrefix,
        ValidationRule::ProductIdPrefix,
        ValidationRule::CustomerIdPrefix,
    ];

    pub fn name(&self) -> &str {
        match self {
            ValidationRule::QuantityPositive => "quantity_positive",
            ValidationRule::UnitPricePositive => "unit_price_positive",
            ValidationRule::RequiredFieldsPresent => "required_fields_present",
            ValidationRule::TransactionIdPrefix => "transaction_id_prefix",
            ValidationRule::ProductIdPrefix => "product_id_prefix",
            ValidationRule::CustomerIdPrefix => "customer_id_prefix",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ValidationRule::QuantityPositive => "Quantity must be greater than 0",
            ValidationRule::UnitPricePositive => "Unit price must be greater than 0",
            ValidationRule::RequiredFieldsPresent => "Required fields must not be empty",
            ValidationRule::TransactionIdPrefix => "Transaction ID must start with 'T'",
            ValidationRule::ProductIdPrefix => "Product ID must start with 'P'",
            ValidationRule::CustomerIdPrefix => "Customer ID must start with 'C'",
        }
    }

    pub fn check(&self, record: &TransactionRecord) -> bool {
        match self {
            ValidationRule::QuantityPositive => record.quantity > 0,
            // NaN fails this comparison too
            ValidationRule::UnitPricePositive => record.unit_price > 0.0,
            ValidationRule::RequiredFieldsPresent => [
                &record.transaction_id,
                &record.date,
                &record.product_id,
                &record.product_name,
                &record.customer_id,
                &record.region,
            ]
            .iter()
            .all(|field| !field.is_empty()),
            ValidationRule::TransactionIdPrefix => record.transaction_id.starts_with('T'),
            ValidationRule::ProductIdPrefix => record.product_id.starts_with('P'),
            ValidationRule::CustomerIdPrefix => record.customer_id.starts_with('C'),
        }
    }
}

/// First rule a record violates, `None` when it is valid
pub fn first_violation(record: &TransactionRecord) -> Option<ValidationRule> {
    ValidationRule::ALL.into_iter().find(|rule| !rule.check(record))
}

pub fn is_valid(record: &TransactionRecord) -> bool {
    first_violation(record).is_none()
}

// ============================================================================
// DATA STATS (describe)
// ============================================================================

/// Shape of the valid records, independent of any filter choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStats {
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Distinct regions, sorted
    pub regions: Vec<String>,
    /// 0.0 when there are no valid records
    pub min_amount: f64,
    pub max_amount: f64,
}

/// Summarize the valid subset so a caller can offer filter choices
pub fn describe(records: &[TransactionRecord]) -> DataStats {
    let valid: Vec<&TransactionRecord> = records.iter().filter(|r| is_valid(r)).collect();

    let regions: BTreeSet<&str> = valid.iter().map(|r| r.region.as_str()).collect();

    let (min_amount, max_amount) = valid
        .iter()
        .map(|r| r.amount())
        .fold(None, |range: Option<(f64, f64)>, amount| match range {
            None => Some((amount, amount)),
            Some((lo, hi)) => Some((lo.min(amount), hi.max(amount))),
        })
        .unwrap_or((0.0, 0.0));

    DataStats {
        valid_count: valid.len(),
        invalid_count: records.len() - valid.len(),
        regions: regions.into_iter().map(str::to_string).collect(),
        min_amount,
        max_amount,
    }
}

// ============================================================================
// FILTERS (apply)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Exact region match; an empty string means no region filter
    pub region: Option<String>,
    /// Inclusive lower bound on the transaction amount
    pub min_amount: Option<f64>,
    /// Inclusive upper bound on the transaction amount
    pub max_amount: Option<f64>,
}

impl FilterOptions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.region().is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }

    fn rejects_amount(&self, amount: f64) -> bool {
        self.min_amount.is_some_and(|min| amount < min)
            || self.max_amount.is_some_and(|max| amount > max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Records handed to this pass, before validation
    pub total_input: usize,
    pub invalid: usize,
    pub filtered_by_region: usize,
    /// Only counts records that survived the region filter
    pub filtered_by_amount: usize,
    pub final_count: usize,
    /// Invalid records keyed by the first rule they broke
    pub rejected_by_rule: BTreeMap<ValidationRule, usize>,
}

impl ValidationSummary {
    pub fn summary(&self) -> String {
        format!(
            "Input: {}, Invalid: {}, Filtered (region): {}, Filtered (amount): {}, Final: {}",
            self.total_input,
            self.invalid,
            self.filtered_by_region,
            self.filtered_by_amount,
            self.final_count
        )
    }
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub records: Vec<TransactionRecord>,
    pub invalid_count: usize,
    pub summary: ValidationSummary,
}

/// Validate every record, then apply the region filter and the amount filter.
///
/// Input order is preserved. A record dropped by the region filter is not
/// looked at again by the amount filter.
pub fn apply(records: &[TransactionRecord], filters: &FilterOptions) -> FilterOutcome {
    let mut summary = ValidationSummary {
        total_input: records.len(),
        ..ValidationSummary::default()
    };
    let mut kept = Vec::new();

    for record in records {
        if let Some(rule) = first_violation(record) {
            summary.invalid += 1;
            *summary.rejected_by_rule.entry(rule).or_insert(0) += 1;
            continue;
        }

        if let Some(region) = filters.region() {
            if record.region != region {
                summary.filtered_by_region += 1;
                continue;
            }
        }

        if filters.rejects_amount(record.amount()) {
            summary.filtered_by_amount += 1;
            continue;
        }

        kept.push(record.clone());
    }

    summary.final_count = kept.len();

    FilterOutcome {
        records: kept,
        invalid_count: summary.invalid,
        summary,
    }
}

/// Tuple-returning form of [`apply`]
pub fn validate_and_filter(
    records: &[TransactionRecord],
    region: Option<&str>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
) -> (Vec<TransactionRecord>, usize, ValidationSummary) {
    let filters = FilterOptions {
        region: region.map(str::to_string),
        min_amount,
        max_amount,
    };
    let outcome = apply(records, &filters);
    (outcome.records, outcome.invalid_count, outcome.summary)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(id: &str, qty: i64, price: f64, region: &str) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            date: "2024-12-01".to_string(),
            product_id: "P101".to_string(),
            product_name: "Laptop".to_string(),
            quantity: qty,
            unit_price: price,
            customer_id: "C001".to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn test_valid_record_passes_all_rules() {
        let record = create_test_record("T001", 2, 45000.0, "North");
        assert!(is_valid(&record));
        assert_eq!(first_violation(&record), None);
    }

    #[test]
    fn test_each_rule_rejects() {
        let base = create_test_record("T001", 2, 100.0, "North");

        let mut r = base.clone();
        r.quantity = 0;
        assert_eq!(first_violation(&r), Some(ValidationRule::QuantityPositive));

        let mut r = base.clone();
        r.unit_price = -1.0;
        assert_eq!(first_violation(&r), Some(ValidationRule::UnitPricePositive));

        let mut r = base.clone();
        r.unit_price = f64::NAN;
        assert_eq!(first_violation(&r), Some(ValidationRule::UnitPricePositive));

        let mut r = base.clone();
        r.region = String::new();
        assert_eq!(first_violation(&r), Some(ValidationRule::RequiredFieldsPresent));

        let mut r = base.clone();
        r.date = String::new();
        assert_eq!(first_violation(&r), Some(ValidationRule::RequiredFieldsPresent));

        let mut r = base.clone();
        r.transaction_id = "X001".to_string();
        assert_eq!(first_violation(&r), Some(ValidationRule::TransactionIdPrefix));

        let mut r = base.clone();
        r.product_id = "Q101".to_string();
        assert_eq!(first_violation(&r), Some(ValidationRule::ProductIdPrefix));

        let mut r = base;
        r.customer_id = "D001".to_string();
        assert_eq!(first_violation(&r), Some(ValidationRule::CustomerIdPrefix));
    }

    #[test]
    fn test_date_format_not_checked() {
        let mut record = create_test_record("T001", 1, 10.0, "North");
        record.date = "not-a-date".to_string();
        assert!(is_valid(&record));
    }

    #[test]
    fn test_apply_without_filters() {
        let records = vec![
            create_test_record("T001", 2, 45000.0, "North"),
            create_test_record("T002", 0, 500.0, "South"),
        ];

        let outcome = apply(&records, &FilterOptions::none());

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].transaction_id, "T001");
        assert_eq!(outcome.invalid_count, 1);
        assert_eq!(outcome.summary.total_input, 2);
        assert_eq!(outcome.summary.final_count, 1);
        assert_eq!(
            outcome.summary.rejected_by_rule.get(&ValidationRule::QuantityPositive),
            Some(&1)
        );

        println!("✅ {}", outcome.summary.summary());
    }

    #[test]
    fn test_region_then_amount_filter_counts() {
        let records = vec![
            create_test_record("T001", 1, 100.0, "North"),  // kept
            create_test_record("T002", 1, 5000.0, "North"), // amount
            create_test_record("T003", 1, 5.0, "South"),    // region (amount never checked)
            create_test_record("T004", 1, 10.0, "North"),   // amount
            create_test_record("X005", 1, 100.0, "North"),  // invalid
        ];

        let filters = FilterOptions {
            region: Some("North".to_string()),
            min_amount: Some(50.0),
            max_amount: Some(1000.0),
        };
        let outcome = apply(&records, &filters);

        assert_eq!(outcome.summary.total_input, 5);
        assert_eq!(outcome.summary.invalid, 1);
        assert_eq!(outcome.summary.filtered_by_region, 1);
        assert_eq!(outcome.summary.filtered_by_amount, 2);
        assert_eq!(outcome.summary.final_count, 1);
        assert_eq!(outcome.records[0].transaction_id, "T001");
    }

    #[test]
    fn test_amount_bounds_inclusive_and_optional() {
        let records = vec![
            create_test_record("T001", 1, 100.0, "North"),
            create_test_record("T002", 1, 200.0, "North"),
        ];

        let min_only = FilterOptions {
            min_amount: Some(200.0),
            ..FilterOptions::none()
        };
        assert_eq!(apply(&records, &min_only).records.len(), 1);

        let max_only = FilterOptions {
            max_amount: Some(100.0),
            ..FilterOptions::none()
        };
        let outcome = apply(&records, &max_only);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].transaction_id, "T001");
    }

    #[test]
    fn test_empty_region_means_no_filter() {
        let records = vec![create_test_record("T001", 1, 100.0, "North")];
        let filters = FilterOptions {
            region: Some(String::new()),
            ..FilterOptions::none()
        };

        assert!(filters.is_empty());
        assert_eq!(apply(&records, &filters).summary.filtered_by_region, 0);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let records = vec![
            create_test_record("T001", 2, 10.0, "North"),
            create_test_record("T002", -1, 10.0, "North"),
            create_test_record("T003", 3, 7.5, "West"),
        ];

        let first = apply(&records, &FilterOptions::none());
        let second = apply(&first.records, &FilterOptions::none());

        assert_eq!(second.invalid_count, 0);
        assert_eq!(second.records, first.records);
    }

    #[test]
    fn test_describe_ignores_invalid_and_filters() {
        let records = vec![
            create_test_record("T001", 2, 50.0, "West"),
            create_test_record("T002", 1, 10.0, "East"),
            create_test_record("T003", 0, 99999.0, "North"), // invalid
            create_test_record("T004", 3, 100.0, "East"),
        ];

        let stats = describe(&records);

        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.invalid_count, 1);
        assert_eq!(stats.regions, vec!["East", "West"]);
        assert_eq!(stats.min_amount, 10.0);
        assert_eq!(stats.max_amount, 300.0);
    }

    #[test]
    fn test_describe_empty() {
        let stats = describe(&[]);
        assert!(stats.regions.is_empty());
        assert_eq!(stats.min_amount, 0.0);
        assert_eq!(stats.max_amount, 0.0);
    }

    #[test]
    fn test_tuple_form_matches_apply() {
        let records = vec![
            create_test_record("T001", 2, 10.0, "North"),
            create_test_record("T002", 2, 10.0, "South"),
        ];

        let (kept, invalid, summary) = validate_and_filter(&records, Some("South"), None, None);

        assert_eq!(kept.len(), 1);
        assert_eq!(invalid, 0);
        assert_eq!(summary.filtered_by_region, 1);
    }
}
