use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::filter::FilteredView;
use super::model::MonthPeriod;

/// One summarized group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow<K> {
    pub group_key: K,
    pub total_amount: f64,
}

/// Revenue per product, ascending by total.
///
/// Groups appear in first-seen order before the sort, and the sort is
/// stable, so equal totals keep that order.
pub fn by_product(view: &FilteredView<'_>) -> Vec<AggregatedRow<String>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<AggregatedRow<String>> = Vec::new();

    for record in view.records() {
        let name = record.product_name.as_str();
        let slot = *slots.entry(name).or_insert_with(|| {
            rows.push(AggregatedRow {
                group_key: name.to_string(),
                total_amount: 0.0,
            });
            rows.len() - 1
        });
        rows[slot].total_amount += record.amount;
    }

    rows.sort_by(|a, b| a.total_amount.total_cmp(&b.total_amount));
    log::debug!("by_product: {} rows -> {} groups", view.len(), rows.len());
    rows
}

/// Revenue per month, ascending chronologically regardless of amount.
///
/// Records without a month (unparsable timestamp) belong to no group.
pub fn by_month(view: &FilteredView<'_>) -> Vec<AggregatedRow<MonthPeriod>> {
    let mut totals: BTreeMap<MonthPeriod, f64> = BTreeMap::new();
    for record in view.records() {
        if let Some(period) = record.month_period {
            *totals.entry(period).or_default() += record.amount;
        }
    }

    log::debug!("by_month: {} rows -> {} groups", view.len(), totals.len());
    totals
        .into_iter()
        .map(|(group_key, total_amount)| AggregatedRow {
            group_key,
            total_amount,
        })
        .collect()
}

/// Sum of every group's total.
pub fn grand_total<K>(rows: &[AggregatedRow<K>]) -> f64 {
    rows.iter().map(|r| r.total_amount).sum()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::DateRange;
    use crate::data::model::{SaleRecord, SalesTable};

    fn sale(y: i32, m: u32, d: u32, product: &str, amount: f64) -> SaleRecord {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        SaleRecord::new(date.and_hms_opt(12, 0, 0), Some(date), product, amount)
    }

    fn month(y: i32, m: u32) -> MonthPeriod {
        MonthPeriod::new(y, m).unwrap()
    }

    #[test]
    fn product_totals_sort_by_amount() {
        let table = SalesTable::from_records(vec![
            sale(2024, 1, 1, "Latte", 50.0),
            sale(2024, 2, 15, "Latte", 30.0),
            sale(2024, 2, 20, "Mocha", 20.0),
        ]);
        let rows = by_product(&FilteredView::all(&table));
        assert_eq!(
            rows,
            vec![
                AggregatedRow {
                    group_key: "Mocha".to_string(),
                    total_amount: 20.0,
                },
                AggregatedRow {
                    group_key: "Latte".to_string(),
                    total_amount: 80.0,
                },
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let table = SalesTable::from_records(vec![
            sale(2024, 1, 1, "Tea", 5.0),
            sale(2024, 1, 1, "Espresso", 5.0),
            sale(2024, 1, 1, "Americano", 5.0),
            sale(2024, 1, 1, "Cocoa", 1.0),
        ]);
        let keys: Vec<String> = by_product(&FilteredView::all(&table))
            .into_iter()
            .map(|r| r.group_key)
            .collect();
        assert_eq!(keys, ["Cocoa", "Tea", "Espresso", "Americano"]);
    }

    #[test]
    fn month_totals_sort_by_period_not_amount() {
        let table = SalesTable::from_records(vec![
            sale(2024, 3, 1, "Latte", 1.0),
            sale(2023, 12, 31, "Latte", 500.0),
            sale(2024, 1, 10, "Mocha", 7.0),
            sale(2024, 3, 20, "Mocha", 2.0),
        ]);
        let rows = by_month(&FilteredView::all(&table));
        let got: Vec<(MonthPeriod, f64)> =
            rows.iter().map(|r| (r.group_key, r.total_amount)).collect();
        assert_eq!(
            got,
            [(month(2023, 12), 500.0), (month(2024, 1), 7.0), (month(2024, 3), 3.0)]
        );
    }

    #[test]
    fn null_month_is_ungrouped() {
        let table = SalesTable::from_records(vec![
            sale(2024, 1, 1, "Latte", 4.0),
            SaleRecord::new(None, None, "Latte", 6.0),
        ]);
        let view = FilteredView::all(&table);
        assert_eq!(grand_total(&by_product(&view)), 10.0);
        assert_eq!(grand_total(&by_month(&view)), 4.0);
    }

    #[test]
    fn empty_view_gives_empty_rows() {
        let table = SalesTable::from_records(vec![sale(2024, 1, 1, "Latte", 4.0)]);
        let range = DateRange::from_days(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        );
        let view = FilteredView::all(&table).date_range(&range);
        assert!(by_product(&view).is_empty());
        assert!(by_month(&view).is_empty());
    }
}
