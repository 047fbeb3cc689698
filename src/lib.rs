//! Faculty salary dashboard core.
//!
//! Loads one `FY<yy>-Salaries` extract per fiscal year from a directory,
//! normalizes the rows into [`SalaryRecord`]s, merges them into a single
//! immutable [`SalaryDataset`], and answers [`FilterRequest`]s with per-year
//! salary and tenure aggregates broken out by college, department or the
//! whole university.
//!
//! ```no_run
//! use salary_dashboard::{Dashboard, DashboardConfig, FilterRequest, YearLabel};
//!
//! # fn main() -> Result<(), salary_dashboard::DashboardError> {
//! let mut dashboard = Dashboard::new(DashboardConfig::from_env()?);
//! let request = FilterRequest {
//!     years: vec![YearLabel::new("2024")],
//!     departments: vec!["History".into()],
//!     ..Default::default()
//! };
//! for table in dashboard.query(&request)?.tables {
//!     println!("{}", table.title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod query;
pub mod state;

pub use config::{DashboardConfig, MergerTable};
pub use data::filter::FilterRequest;
pub use data::model::{
    AppointmentStatus, FilterOptions, LoadWarning, SalaryDataset, SalaryRecord, UnionStatus,
    YearLabel,
};
pub use error::DashboardError;
pub use query::{
    Aggregate, BreakdownLevel, BreakdownTable, EmptyReason, QueryResponse, QueryWarning,
};
pub use state::{Dashboard, DatasetCache};
