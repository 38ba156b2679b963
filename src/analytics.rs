// 📊 Sales Analytics - seven aggregate views over a record set
//
// Every view is a pure function of its input. Grouping is explicit:
// records are partitioned by key in first-seen order, then each group is
// reduced. Sorts are stable, so ties keep first-seen order.

use crate::parser::TransactionRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default size of the top-products list
pub const DEFAULT_TOP_N: usize = 5;

/// Low-performer threshold for general analysis
pub const LOW_PERFORMER_THRESHOLD: i64 = 10;

/// Low-performer threshold used inside the sales report
pub const REPORT_LOW_PERFORMER_THRESHOLD: i64 = 5;

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// GROUPING
// ============================================================================

/// Stable partition by key; groups appear in the order their key was first seen
pub fn group_by<'a, K, F>(records: &'a [TransactionRecord], key: F) -> Vec<(K, Vec<&'a TransactionRecord>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&TransactionRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a TransactionRecord>)> = Vec::new();

    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![record]));
            }
        }
    }

    groups
}

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStat {
    pub region: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    /// Share of grand total, 2 decimals; 0 when the grand total is 0
    pub percentage: f64,
}

/// One entry per distinct (comma-stripped) product name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub name: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStat {
    pub customer_id: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub avg_order_value: f64,
    pub products_bought: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: String,
    pub revenue: f64,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

/// Best day by revenue. `date` is `None` when there was no data at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakDay {
    pub date: Option<String>,
    pub revenue: f64,
    pub transaction_count: usize,
}

impl PeakDay {
    pub fn none() -> Self {
        PeakDay {
            date: None,
            revenue: 0.0,
            transaction_count: 0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.date.is_none()
    }
}

// ============================================================================
// AGGREGATE VIEWS
// ============================================================================

/// Sum of quantity × unit price
pub fn total_revenue(records: &[TransactionRecord]) -> f64 {
    records.iter().map(TransactionRecord::amount).sum()
}

/// Per-region totals in first-seen region order
pub fn region_wise_sales(records: &[TransactionRecord]) -> Vec<RegionStat> {
    let grand_total = total_revenue(records);

    group_by(records, |r| r.region.clone())
        .into_iter()
        .map(|(region, group)| {
            let total_sales: f64 = group.iter().map(|r| r.amount()).sum();
            let percentage = if grand_total > 0.0 {
                round2(total_sales / grand_total * 100.0)
            } else {
                0.0
            };

            RegionStat {
                region,
                total_sales,
                transaction_count: group.len(),
                percentage,
            }
        })
        .collect()
}

fn aggregate_products(records: &[TransactionRecord]) -> Vec<ProductAggregate> {
    group_by(records, |r| r.product_name.clone())
        .into_iter()
        .map(|(name, group)| ProductAggregate {
            name,
            // Saturates instead of overflowing on absurd quantities
            total_quantity: group.iter().fold(0i64, |acc, r| acc.saturating_add(r.quantity)),
            total_revenue: group.iter().map(|r| r.amount()).sum(),
        })
        .collect()
}

/// Top `n` products by total quantity; ties keep first-seen order
pub fn top_selling_products(records: &[TransactionRecord], n: usize) -> Vec<ProductAggregate> {
    let mut products = aggregate_products(records);
    products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    products.truncate(n);
    products
}

/// Per-customer stats, highest spender first
pub fn customer_analysis(records: &[TransactionRecord]) -> Vec<CustomerStat> {
    let mut customers: Vec<CustomerStat> = group_by(records, |r| r.customer_id.clone())
        .into_iter()
        .map(|(customer_id, group)| {
            let total_spent: f64 = group.iter().map(|r| r.amount()).sum();
            let purchase_count = group.len();

            CustomerStat {
                customer_id,
                total_spent,
                purchase_count,
                avg_order_value: round2(total_spent / purchase_count as f64),
                products_bought: group.iter().map(|r| r.product_name.clone()).collect(),
            }
        })
        .collect();

    customers.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    customers
}

/// Per-date stats, ascending by date string
pub fn daily_sales_trend(records: &[TransactionRecord]) -> Vec<DailyStat> {
    let mut days: Vec<DailyStat> = group_by(records, |r| r.date.clone())
        .into_iter()
        .map(|(date, group)| {
            let customers: BTreeSet<&str> = group.iter().map(|r| r.customer_id.as_str()).collect();

            DailyStat {
                date,
                revenue: group.iter().map(|r| r.amount()).sum(),
                transaction_count: group.len(),
                unique_customers: customers.len(),
            }
        })
        .collect();

    days.sort_by(|a, b| a.date.cmp(&b.date));
    days
}

/// Date with the highest revenue; the earliest date wins a tie
pub fn find_peak_sales_day(records: &[TransactionRecord]) -> PeakDay {
    let mut peak: Option<DailyStat> = None;

    for day in daily_sales_trend(records) {
        if peak.as_ref().map_or(true, |best| day.revenue > best.revenue) {
            peak = Some(day);
        }
    }

    match peak {
        Some(day) => PeakDay {
            date: Some(day.date),
            revenue: day.revenue,
            transaction_count: day.transaction_count,
        },
        None => PeakDay::none(),
    }
}

/// Products whose total quantity is below `threshold`, lowest first
pub fn low_performing_products(records: &[TransactionRecord], threshold: i64) -> Vec<ProductAggregate> {
    let mut low: Vec<ProductAggregate> = top_selling_products(records, usize::MAX)
        .into_iter()
        .filter(|p| p.total_quantity < threshold)
        .collect();

    low.sort_by_key(|p| p.total_quantity);
    low
}

// ============================================================================
// FULL ANALYSIS
// ============================================================================

/// All seven views computed over one record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesAnalysis {
    pub total_revenue: f64,
    pub regions: Vec<RegionStat>,
    pub top_products: Vec<ProductAggregate>,
    pub customers: Vec<CustomerStat>,
    pub daily_trend: Vec<DailyStat>,
    pub peak_day: PeakDay,
    pub low_performers: Vec<ProductAggregate>,
}

impl SalesAnalysis {
    pub fn summary(&self) -> String {
        format!(
            "Revenue ${:.2} across {} regions, {} customers, {} days",
            self.total_revenue,
            self.regions.len(),
            self.customers.len(),
            self.daily_trend.len()
        )
    }
}

/// Run every view with the general defaults (top 5, low-performer threshold 10)
pub fn analyze(records: &[TransactionRecord]) -> SalesAnalysis {
    SalesAnalysis {
        total_revenue: total_revenue(records),
        regions: region_wise_sales(records),
        top_products: top_selling_products(records, DEFAULT_TOP_N),
        customers: customer_analysis(records),
        daily_trend: daily_sales_trend(records),
        peak_day: find_peak_sales_day(records),
        low_performers: low_performing_products(records, LOW_PERFORMER_THRESHOLD),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(
        id: &str,
        date: &str,
        product: &str,
        qty: i64,
        price: f64,
        customer: &str,
        region: &str,
    ) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            date: date.to_string(),
            product_id: "P101".to_string(),
            product_name: product.to_string(),
            quantity: qty,
            unit_price: price,
            customer_id: customer.to_string(),
            region: region.to_string(),
        }
    }

    fn sample_records() -> Vec<TransactionRecord> {
        vec![
            create_test_record("T001", "2024-12-02", "Laptop", 2, 45000.0, "C001", "North"),
            create_test_record("T002", "2024-12-01", "Mouse", 10, 500.0, "C002", "South"),
            create_test_record("T003", "2024-12-02", "Keyboard", 3, 1500.0, "C001", "North"),
            create_test_record("T004", "2024-12-03", "Mouse", 5, 500.0, "C003", "East"),
            create_test_record("T005", "2024-12-01", "Webcam", 3, 3000.0, "C002", "South"),
        ]
    }

    #[test]
    fn test_total_revenue() {
        // 90000 + 5000 + 4500 + 2500 + 9000
        assert_eq!(total_revenue(&sample_records()), 111000.0);
        assert_eq!(total_revenue(&[]), 0.0);
    }

    #[test]
    fn test_region_totals_sum_to_revenue() {
        let records = sample_records();
        let regions = region_wise_sales(&records);

        let sum_sales: f64 = regions.iter().map(|r| r.total_sales).sum();
        let sum_pct: f64 = regions.iter().map(|r| r.percentage).sum();

        assert!((sum_sales - total_revenue(&records)).abs() < 1e-6);
        assert!((sum_pct - 100.0).abs() < 0.05);

        // First-seen order
        let names: Vec<&str> = regions.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(names, vec!["North", "South", "East"]);
        assert_eq!(regions[0].transaction_count, 2);
        assert_eq!(regions[0].total_sales, 94500.0);
        assert_eq!(regions[0].percentage, 85.14);
    }

    #[test]
    fn test_region_percentage_zero_when_no_revenue() {
        let records = vec![create_test_record("T001", "2024-12-01", "Gift", 1, 0.0, "C001", "North")];
        let regions = region_wise_sales(&records);
        assert_eq!(regions[0].percentage, 0.0);
    }

    #[test]
    fn test_top_products_by_quantity_with_stable_ties() {
        let records = sample_records();
        let top = top_selling_products(&records, 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "Mouse");
        assert_eq!(top[0].total_quantity, 15);
        assert_eq!(top[0].total_revenue, 7500.0);
        // Keyboard and Webcam both sold 3; Keyboard was seen first
        assert_eq!(top[1].name, "Keyboard");
        assert_eq!(top[2].name, "Webcam");
    }

    #[test]
    fn test_top_products_default_n() {
        let top = top_selling_products(&sample_records(), DEFAULT_TOP_N);
        assert_eq!(top.len(), 4);
    }

    #[test]
    fn test_customer_analysis() {
        let customers = customer_analysis(&sample_records());

        assert_eq!(customers[0].customer_id, "C001");
        assert_eq!(customers[0].total_spent, 94500.0);
        assert_eq!(customers[0].purchase_count, 2);
        assert_eq!(customers[0].avg_order_value, 47250.0);
        assert!(customers[0].products_bought.contains("Laptop"));
        assert!(customers[0].products_bought.contains("Keyboard"));

        assert_eq!(customers[1].customer_id, "C002");
        assert_eq!(customers[2].customer_id, "C003");
    }

    #[test]
    fn test_customer_average_is_rounded() {
        let records = vec![
            create_test_record("T001", "2024-12-01", "A", 1, 10.0, "C001", "North"),
            create_test_record("T002", "2024-12-01", "A", 1, 10.0, "C001", "North"),
            create_test_record("T003", "2024-12-01", "B", 1, 0.01, "C001", "North"),
        ];
        let customers = customer_analysis(&records);

        assert_eq!(customers[0].avg_order_value, 6.67);
        assert_eq!(customers[0].products_bought.len(), 2);
    }

    #[test]
    fn test_daily_trend_sorted_by_date() {
        let days = daily_sales_trend(&sample_records());

        let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-12-01", "2024-12-02", "2024-12-03"]);

        assert_eq!(days[0].revenue, 14000.0);
        assert_eq!(days[0].transaction_count, 2);
        assert_eq!(days[0].unique_customers, 1);
        assert_eq!(days[1].unique_customers, 1);
    }

    #[test]
    fn test_peak_sales_day() {
        let records = vec![
            create_test_record("T001", "2024-12-01", "Laptop", 2, 45000.0, "C001", "North"),
            create_test_record("T002", "2024-12-02", "Mouse", 10, 500.0, "C002", "South"),
            create_test_record("T003", "2024-12-02", "Mouse", 10, 500.0, "C003", "South"),
        ];

        let peak = find_peak_sales_day(&records);

        assert_eq!(peak.date.as_deref(), Some("2024-12-01"));
        assert_eq!(peak.revenue, 90000.0);
        assert_eq!(peak.transaction_count, 1);
    }

    #[test]
    fn test_peak_sales_day_empty_sentinel() {
        let peak = find_peak_sales_day(&[]);
        assert!(peak.is_none());
        assert_eq!(peak.revenue, 0.0);
        assert_eq!(peak.transaction_count, 0);
    }

    #[test]
    fn test_low_performers_partition_products() {
        let records = sample_records();
        let all = top_selling_products(&records, usize::MAX);

        for threshold in [0, 3, 4, 10, 15, 16] {
            let low = low_performing_products(&records, threshold);
            let high: Vec<&ProductAggregate> =
                all.iter().filter(|p| p.total_quantity >= threshold).collect();

            assert_eq!(low.len() + high.len(), all.len());
            assert!(low.iter().all(|p| p.total_quantity < threshold));
            assert!(low.iter().all(|p| !high.iter().any(|h| h.name == p.name)));
        }
    }

    #[test]
    fn test_low_performers_ascending() {
        let low = low_performing_products(&sample_records(), LOW_PERFORMER_THRESHOLD);

        let names: Vec<&str> = low.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Laptop", "Keyboard", "Webcam"]);

        let report_low = low_performing_products(&sample_records(), REPORT_LOW_PERFORMER_THRESHOLD);
        assert_eq!(report_low.len(), 3);
        let none = low_performing_products(&sample_records(), 2);
        assert!(none.is_empty());
    }

    #[test]
    fn test_group_by_first_seen_order() {
        let records = sample_records();
        let groups = group_by(&records, |r| r.product_name.clone());

        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Laptop", "Mouse", "Keyboard", "Webcam"]);
        assert_eq!(groups[1].1.len(), 2);
        assert_eq!(groups[1].1[0].transaction_id, "T002");
    }

    #[test]
    fn test_analyze_bundle() {
        let records = sample_records();
        let analysis = analyze(&records);

        assert_eq!(analysis.total_revenue, total_revenue(&records));
        assert_eq!(analysis.regions.len(), 3);
        assert_eq!(analysis.top_products.len(), 4);
        assert_eq!(analysis.peak_day.date.as_deref(), Some("2024-12-02"));
        assert_eq!(analysis.low_performers.len(), 3);

        println!("✅ {}", analysis.summary());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(85.1428), 85.14);
        assert_eq!(round2(2.675_1), 2.68);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_product_quantities_saturate() {
        let records = vec![
            create_test_record("T001", "2024-12-01", "Bulk", 5_000_000_000_000_000_000, 1.0, "C001", "North"),
            create_test_record("T002", "2024-12-01", "Bulk", 5_000_000_000_000_000_000, 1.0, "C002", "North"),
            create_test_record("T003", "2024-12-01", "Pen", 3, 1.0, "C003", "North"),
        ];

        let top = top_selling_products(&records, 5);
        assert_eq!(top[0].name, "Bulk");
        assert_eq!(top[0].total_quantity, i64::MAX);

        let low = low_performing_products(&records, LOW_PERFORMER_THRESHOLD);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Pen");
    }
}
