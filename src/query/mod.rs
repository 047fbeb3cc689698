//! Query layer: per-year breakdowns over a filtered dataset.
//!
//! ```text
//!   FilterRequest ──► filter ──► per year ──► college | department | university
//!                                                  │
//!                                                  ▼
//!                                             aggregate ──► Populated | Empty(reason)
//! ```

pub mod aggregate;
pub mod breakdown;
pub mod summary;

pub use aggregate::{Aggregate, EmptyReason, Metric, MetricSummary, Statistics, SummaryTable, Unit};
pub use breakdown::{run_query, BreakdownLevel, BreakdownTable, QueryResponse};
pub use summary::{FilterSummary, QueryWarning};
