/// Data layer: core types, loading, merging and filtering.
///
/// Architecture:
/// ```text
///  FY22-Salaries.xlsx  FY23-Salaries.csv  FY24-Salaries.parquet ...
///        │
///        ▼
///   ┌───────────┐
///   │  loader    │  discover files, read rows, normalize → YearBatch per file
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  merge     │  concatenate batches → SalaryDataset (or "no data")
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  filter    │  apply FilterRequest → borrowed subset
///   └───────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod merge;
pub mod model;
pub mod normalize;
