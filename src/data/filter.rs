use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::model::{SaleRecord, SalesTable};

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Inclusive instant range. `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange { start, end }
    }

    /// Whole calendar days: from midnight of `start` to the last instant of `end`.
    pub fn from_days(start: NaiveDate, end: NaiveDate) -> Self {
        let last = end
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN) - TimeDelta::nanoseconds(1))
            .unwrap_or(NaiveDateTime::MAX);
        DateRange {
            start: start.and_time(NaiveTime::MIN),
            end: last,
        }
    }

    /// A missing timestamp is never inside any range.
    pub fn contains(&self, ts: Option<NaiveDateTime>) -> bool {
        ts.is_some_and(|t| self.start <= t && t <= self.end)
    }
}

/// Which products a query covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductSelection {
    /// Passthrough: no product filtering.
    #[default]
    All,
    /// Only these names. An empty set matches nothing.
    Only(BTreeSet<String>),
}

impl ProductSelection {
    /// Build a selection from UI values. Any occurrence of `all_sentinel`
    /// turns the whole selection into [`ProductSelection::All`].
    pub fn from_values<I, S>(values: I, all_sentinel: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = BTreeSet::new();
        for value in values {
            let value = value.into();
            if value == all_sentinel {
                return ProductSelection::All;
            }
            names.insert(value);
        }
        ProductSelection::Only(names)
    }

    pub fn matches(&self, product: &str) -> bool {
        match self {
            ProductSelection::All => true,
            ProductSelection::Only(names) => names.contains(product),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – a borrowed subset of the table
// ---------------------------------------------------------------------------

/// Indices into a [`SalesTable`] that passed every applied predicate,
/// kept in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a SalesTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// The unfiltered view over every record.
    pub fn all(table: &'a SalesTable) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Keep only records inside `range`.
    pub fn date_range(self, range: &DateRange) -> Self {
        self.retain(|r| range.contains(r.timestamp))
    }

    /// Keep only records whose product is selected.
    pub fn products(self, selection: &ProductSelection) -> Self {
        if matches!(selection, ProductSelection::All) {
            return self;
        }
        self.retain(|r| selection.matches(&r.product_name))
    }

    fn retain(mut self, keep: impl Fn(&SaleRecord) -> bool) -> Self {
        let records = self.table.records();
        self.indices.retain(|&i| keep(&records[i]));
        self
    }

    /// Records of the view, in table order.
    pub fn records(&self) -> impl Iterator<Item = &'a SaleRecord> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn table(&self) -> &'a SalesTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Records with `start <= timestamp <= end`.
pub fn by_date_range(
    table: &SalesTable,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> FilteredView<'_> {
    FilteredView::all(table).date_range(&DateRange::new(start, end))
}

/// Records whose product is in `selection`.
pub fn by_products<'a>(table: &'a SalesTable, selection: &ProductSelection) -> FilteredView<'a> {
    FilteredView::all(table).products(selection)
}
