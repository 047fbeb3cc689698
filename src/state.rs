use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::config::DashboardConfig;
use crate::data::filter::FilterRequest;
use crate::data::loader::load_directory;
use crate::data::merge::merge;
use crate::data::model::{FilterOptions, SalaryDataset};
use crate::error::Result;
use crate::query::{run_query, QueryResponse};

// ---------------------------------------------------------------------------
// Load-once dataset cache
// ---------------------------------------------------------------------------

/// Loads and merges the data directory on first access and hands out the
/// same immutable dataset until [`DatasetCache::invalidate`].
///
/// Failed loads, including "no data files", are not cached.
#[derive(Debug)]
pub struct DatasetCache {
    data_dir: PathBuf,
    /// Fixed "current date"; today at load time when `None`.
    as_of: Option<NaiveDate>,
    dataset: Option<Arc<SalaryDataset>>,
}

impl DatasetCache {
    pub fn new(data_dir: impl Into<PathBuf>, as_of: Option<NaiveDate>) -> Self {
        Self {
            data_dir: data_dir.into(),
            as_of,
            dataset: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Whether a dataset is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Return the cached dataset, loading it first if needed.
    pub fn get_or_load(&mut self) -> Result<Arc<SalaryDataset>> {
        if let Some(ds) = &self.dataset {
            return Ok(Arc::clone(ds));
        }

        let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        log::info!("loading salary data from {} as of {as_of}", self.data_dir.display());
        let report = load_directory(&self.data_dir, as_of)?;
        let dataset = Arc::new(merge(report)?);

        self.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the cached dataset; the next access reloads from disk.
    pub fn invalidate(&mut self) {
        if self.dataset.take().is_some() {
            log::info!("salary data cache invalidated");
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard facade
// ---------------------------------------------------------------------------

/// What the presentation layer talks to: configuration plus the cached
/// dataset, re-evaluating each request against it.
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    cache: DatasetCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DatasetCache::new(config.data_dir.clone(), config.as_of);
        Self { config, cache }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The merged dataset, loading it on first use.
    pub fn dataset(&mut self) -> Result<Arc<SalaryDataset>> {
        self.cache.get_or_load()
    }

    /// Values available in each filter dimension.
    pub fn options(&mut self) -> Result<FilterOptions> {
        Ok(self.dataset()?.options().clone())
    }

    /// One filter → aggregate pass.
    pub fn query(&mut self, request: &FilterRequest) -> Result<QueryResponse> {
        let dataset = self.dataset()?;
        Ok(run_query(&dataset, request, &self.config))
    }

    /// Force the next access to reload the data directory.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}
