use std::collections::BTreeSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::data::aggregate::{by_month, by_product};
use crate::data::filter::{DateRange, FilteredView, ProductSelection};
use crate::data::loader::load_with;
use crate::data::model::SalesTable;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Output shapes handed to the chart layer
// ---------------------------------------------------------------------------

/// One bar of the per-product chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub category: String,
    pub total: f64,
}

/// One point of the monthly line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    /// `YYYY-MM`
    pub period_label: String,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// SalesDashboard – owns the table, answers queries
// ---------------------------------------------------------------------------

/// Query entry points over a loaded [`SalesTable`].
///
/// Every query borrows the table immutably, so a dashboard can be shared
/// between threads (e.g. behind an `Arc`) without locking.
#[derive(Debug, Clone)]
pub struct SalesDashboard {
    table: SalesTable,
    all_products: String,
}

impl SalesDashboard {
    pub fn new(table: SalesTable) -> Self {
        Self::with_sentinel(table, crate::config::DEFAULT_ALL_PRODUCTS)
    }

    pub fn with_sentinel(table: SalesTable, all_products: impl Into<String>) -> Self {
        SalesDashboard {
            table,
            all_products: all_products.into(),
        }
    }

    /// Load the configured sources and build a dashboard.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, LoadError> {
        Self::load(&config.sources, config)
    }

    /// Load `sources` with the column names and sentinel of `config`.
    pub fn load<P: AsRef<Path>>(
        sources: &[P],
        config: &DashboardConfig,
    ) -> Result<Self, LoadError> {
        let table = load_with(sources, &config.columns)?;
        Ok(Self::with_sentinel(table, config.all_products.clone()))
    }

    pub fn table(&self) -> &SalesTable {
        &self.table
    }

    /// Distinct product names, for a product selector.
    pub fn products(&self) -> &BTreeSet<String> {
        self.table.products()
    }

    /// Earliest and latest valid transaction instants.
    pub fn date_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.table.time_bounds()
    }

    /// Turn raw selector values into a selection, honouring the sentinel.
    pub fn selection<I, S>(&self, values: I) -> ProductSelection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProductSelection::from_values(values, &self.all_products)
    }

    /// Revenue per product between two calendar days (both inclusive).
    pub fn query_product_totals(&self, start: NaiveDate, end: NaiveDate) -> Vec<ProductTotal> {
        let view = FilteredView::all(&self.table).date_range(&DateRange::from_days(start, end));
        log::debug!("product totals {start}..={end}: {} records", view.len());
        product_totals(&view)
    }

    /// Revenue per month for the selected products, over the whole table.
    pub fn query_month_totals(&self, selection: &ProductSelection) -> Vec<MonthTotal> {
        let view = FilteredView::all(&self.table).products(selection);
        log::debug!("month totals {selection:?}: {} records", view.len());
        month_totals(&view)
    }

    /// Revenue per month for the selected products between two calendar days.
    pub fn query_month_totals_in_range(
        &self,
        selection: &ProductSelection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<MonthTotal> {
        let view = FilteredView::all(&self.table)
            .date_range(&DateRange::from_days(start, end))
            .products(selection);
        log::debug!(
            "month totals {selection:?} {start}..={end}: {} records",
            view.len()
        );
        month_totals(&view)
    }
}

fn product_totals(view: &FilteredView<'_>) -> Vec<ProductTotal> {
    by_product(view)
        .into_iter()
        .map(|row| ProductTotal {
            category: row.group_key,
            total: row.total_amount,
        })
        .collect()
}

fn month_totals(view: &FilteredView<'_>) -> Vec<MonthTotal> {
    by_month(view)
        .into_iter()
        .map(|row| MonthTotal {
            period_label: row.group_key.to_string(),
            total: row.total_amount,
        })
        .collect()
}
