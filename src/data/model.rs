use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

// ---------------------------------------------------------------------------
// MonthPeriod – year-month grouping key
// ---------------------------------------------------------------------------

/// A calendar month, ordered chronologically and displayed as `YYYY-MM`.
///
/// Field order matters: the derived `Ord` compares `year` before `month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthPeriod {
    pub year: i32,
    /// 1-based month of the year.
    pub month: u32,
}

impl MonthPeriod {
    /// Truncate an instant to its month.
    pub fn of(ts: &NaiveDateTime) -> Self {
        MonthPeriod {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Build a period, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12)
            .contains(&month)
            .then_some(MonthPeriod { year, month })
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthPeriod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// SaleRecord – one row of a source table
// ---------------------------------------------------------------------------

/// A single transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    /// Transaction instant; `None` when the source value could not be parsed.
    pub timestamp: Option<NaiveDateTime>,
    /// Calendar date column as given by the source.
    pub calendar_date: Option<NaiveDate>,
    pub product_name: String,
    pub amount: f64,
    /// Derived from `timestamp`; `None` exactly when `timestamp` is `None`.
    pub month_period: Option<MonthPeriod>,
}

impl SaleRecord {
    /// Build a record, deriving `month_period` from the timestamp.
    pub fn new(
        timestamp: Option<NaiveDateTime>,
        calendar_date: Option<NaiveDate>,
        product_name: impl Into<String>,
        amount: f64,
    ) -> Self {
        SaleRecord {
            timestamp,
            calendar_date,
            product_name: product_name.into(),
            amount,
            month_period: timestamp.as_ref().map(MonthPeriod::of),
        }
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the canonical, immutable table
// ---------------------------------------------------------------------------

/// All loaded records in source order, plus a few pre-computed indices.
///
/// Fields are private so the table cannot change once built.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    records: Vec<SaleRecord>,
    products: BTreeSet<String>,
    unparsed_timestamps: usize,
}

impl SalesTable {
    /// Build the table and its product index from loaded records.
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        let products = records.iter().map(|r| r.product_name.clone()).collect();
        let unparsed_timestamps = records.iter().filter(|r| r.timestamp.is_none()).count();
        SalesTable {
            records,
            products,
            unparsed_timestamps,
        }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    /// Sorted distinct product names.
    pub fn products(&self) -> &BTreeSet<String> {
        &self.products
    }

    /// Number of records retained without a valid timestamp.
    pub fn unparsed_timestamps(&self) -> usize {
        self.unparsed_timestamps
    }

    /// Earliest and latest valid timestamps, if any record has one.
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut stamps = self.records.iter().filter_map(|r| r.timestamp);
        let first = stamps.next()?;
        Some(stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn month_period_orders_chronologically() {
        let dec = MonthPeriod::new(2023, 12).unwrap();
        let jan = MonthPeriod::new(2024, 1).unwrap();
        let feb = MonthPeriod::new(2024, 2).unwrap();
        assert!(dec < jan && jan < feb);
        assert_eq!(jan.to_string(), "2024-01");
        assert!(MonthPeriod::new(2024, 13).is_none());
    }

    #[test]
    fn record_derives_month_from_timestamp() {
        let r = SaleRecord::new(Some(at(2024, 3, 7)), None, "Latte", 38.7);
        assert_eq!(r.month_period, MonthPeriod::new(2024, 3));

        let r = SaleRecord::new(None, None, "Latte", 38.7);
        assert_eq!(r.month_period, None);
    }

    #[test]
    fn table_indexes_products_and_bounds() {
        let table = SalesTable::from_records(vec![
            SaleRecord::new(Some(at(2024, 2, 1)), None, "Mocha", 1.0),
            SaleRecord::new(None, None, "Americano", 2.0),
            SaleRecord::new(Some(at(2024, 1, 5)), None, "Mocha", 3.0),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.unparsed_timestamps(), 1);
        let products: Vec<&str> = table.products().iter().map(String::as_str).collect();
        assert_eq!(products, ["Americano", "Mocha"]);
        assert_eq!(table.time_bounds(), Some((at(2024, 1, 5), at(2024, 2, 1))));
    }

    #[test]
    fn month_serializes_as_label() {
        let json = serde_json::to_string(&MonthPeriod::new(2024, 5).unwrap()).unwrap();
        assert_eq!(json, "\"2024-05\"");
    }
}
