//! Data layer: core types, loading, filtering, and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet  (one or more sources)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + concatenate → SalesTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ SalesTable  │  Vec<SaleRecord>, product index (immutable)
//!   └────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date range / product predicates → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  group-by-sum per product / per month
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod parse;
