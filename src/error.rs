use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the presentation layer.
///
/// Expected conditions (missing cells, empty filter results, skipped files)
/// never show up here; they travel as absent values, [`crate::query::Aggregate`]
/// variants or warnings instead.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No yearly extract was found. This is a configuration problem, not an
    /// empty filter result.
    #[error("no files matching '{pattern}' found in {}", dir.display())]
    NoDataFiles { dir: PathBuf, pattern: &'static str },

    #[error("cannot read data directory {}: {source}", dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A discovered file could not be read or is missing required columns.
    #[error("failed to load {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
