//! Sales ingestion and revenue aggregation.
//!
//! Load one or more sales sources into a [`SalesTable`], then ask a
//! [`SalesDashboard`] for revenue per product or per month.

pub mod config;
pub mod data;
pub mod error;
pub mod query;

pub use config::{ColumnMapping, DashboardConfig};
pub use data::filter::{DateRange, FilteredView, ProductSelection};
pub use data::loader::{load, load_with};
pub use data::model::{MonthPeriod, SaleRecord, SalesTable};
pub use error::{ConfigError, LoadError};
pub use query::{MonthTotal, ProductTotal, SalesDashboard};
