use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Env var naming an optional JSON config file.
pub const CONFIG_ENV: &str = "SALARY_DASHBOARD_CONFIG";
/// Env var overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "SALARY_DATA_DIR";

const DEFAULT_MAX_YEARS: usize = 3;
const DEFAULT_MAX_DEPARTMENTS: usize = 5;

/// First academic year for which a department no longer reports on its own.
const DEFAULT_MERGER_YEARS: [(&str, i32); 2] = [("CIS", 2023), ("DET", 2023)];

// ---------------------------------------------------------------------------
// Department merger table
// ---------------------------------------------------------------------------

/// Department name → first fiscal year it is absent because of a merger or
/// reorganization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergerTable(BTreeMap<String, i32>);

impl Default for MergerTable {
    fn default() -> Self {
        DEFAULT_MERGER_YEARS
            .iter()
            .map(|(dept, year)| (dept.to_string(), *year))
            .collect()
    }
}

impl FromIterator<(String, i32)> for MergerTable {
    fn from_iter<I: IntoIterator<Item = (String, i32)>>(iter: I) -> Self {
        MergerTable(iter.into_iter().collect())
    }
}

impl MergerTable {
    pub fn merger_year(&self, department: &str) -> Option<i32> {
        self.0.get(department).copied()
    }

    /// Returns the merger year when `year` falls at or after it.
    pub fn merged_as_of(&self, department: &str, year: i32) -> Option<i32> {
        self.merger_year(department).filter(|merged| year >= *merged)
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory scanned for `FY<yy>-Salaries.<ext>` files.
    pub data_dir: PathBuf,
    /// Fixed "current date" for duration derivation. Today when unset.
    pub as_of: Option<NaiveDate>,
    pub department_merger_years: MergerTable,
    pub max_years: usize,
    pub max_departments: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            as_of: None,
            department_merger_years: MergerTable::default(),
            max_years: DEFAULT_MAX_YEARS,
            max_departments: DEFAULT_MAX_DEPARTMENTS,
        }
    }
}

impl DashboardConfig {
    /// Defaults, overlaid by the file in [`CONFIG_ENV`] and then [`DATA_DIR_ENV`].
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config.validate()?;
        log::debug!("using config {config:?}");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("reading {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            DashboardError::Config(format!("parsing {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_years == 0 {
            return Err(DashboardError::Config("max_years must be at least 1".into()));
        }
        if self.max_departments == 0 {
            return Err(DashboardError::Config(
                "max_departments must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
