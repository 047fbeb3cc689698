use std::collections::BTreeMap;

use super::loader::{LoadReport, FILE_PATTERN};
use super::model::{LoadWarning, SalaryDataset};
use crate::error::DashboardError;

/// Concatenate the per-file batches of `report` into one dataset.
///
/// Fails only when the load found no file at all. Discovery already skips
/// repeated fiscal years; a report built elsewhere that still repeats one
/// keeps its earlier batch and warns about the rest.
pub fn merge(report: LoadReport) -> Result<SalaryDataset, DashboardError> {
    let LoadReport {
        dir,
        batches,
        mut warnings,
    } = report;

    if batches.is_empty() {
        log::error!("No files found matching the pattern '{FILE_PATTERN}' in {}", dir.display());
        return Err(DashboardError::NoDataFiles {
            dir,
            pattern: FILE_PATTERN,
        });
    }

    let total: usize = batches.iter().map(|b| b.records.len()).sum();
    let mut records = Vec::with_capacity(total);
    let mut merged_years: BTreeMap<i32, usize> = BTreeMap::new();

    for batch in batches {
        let file = batch
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| batch.source.display().to_string());

        if merged_years.contains_key(&batch.fiscal_year) {
            log::warn!(
                "'{file}' repeats fiscal year {} already loaded; skipping",
                batch.fiscal_year
            );
            warnings.push(LoadWarning::DuplicateYear {
                file,
                fiscal_year: batch.fiscal_year,
            });
            continue;
        }

        debug_assert!(batch.records.iter().all(|r| r.fiscal_year == batch.fiscal_year));
        merged_years.insert(batch.fiscal_year, batch.records.len());
        records.extend(batch.records);
    }

    log::info!(
        "merged {} record(s) across fiscal years {:?}",
        records.len(),
        merged_years.keys().collect::<Vec<_>>()
    );
    Ok(SalaryDataset::from_records(records, warnings))
}
