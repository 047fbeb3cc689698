use serde::{Deserialize, Serialize};

use super::model::{AppointmentStatus, SalaryDataset, SalaryRecord, UnionStatus, YearLabel};
use super::normalize::canonical_college;

// ---------------------------------------------------------------------------
// Filter request: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selections, in the order the user entered them.
///
/// An empty dimension means "no filter" (show all). Within a dimension the
/// selected values are OR-ed; dimensions are AND-ed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    pub years: Vec<YearLabel>,
    pub departments: Vec<String>,
    pub colleges: Vec<String>,
    pub ranks: Vec<String>,
    pub appointment_statuses: Vec<AppointmentStatus>,
    pub union_statuses: Vec<UnionStatus>,
}

impl FilterRequest {
    /// Whether no dimension carries a selection.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
            && self.departments.is_empty()
            && self.colleges.is_empty()
            && self.ranks.is_empty()
            && self.appointment_statuses.is_empty()
            && self.union_statuses.is_empty()
    }

    /// Whether `record` passes every active dimension.
    ///
    /// A record lacking the attribute of an active dimension fails it.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        allows(&self.years, record.academic_year_label.as_ref())
            && allows(&self.departments, record.department.as_ref())
            && allows(&self.colleges, record.college.as_ref())
            && allows(&self.ranks, record.rank.as_ref())
            && allows(&self.appointment_statuses, record.appointment_status.as_ref())
            && allows(&self.union_statuses, record.union_status.as_ref())
    }

    /// The request actually applied: at most `max_departments` departments
    /// (first ones, as entered) and canonical college names. Returns the
    /// departments that were dropped.
    pub fn effective(&self, max_departments: usize) -> (FilterRequest, Vec<String>) {
        let mut effective = self.clone();
        let dropped = if effective.departments.len() > max_departments {
            effective.departments.split_off(max_departments)
        } else {
            Vec::new()
        };
        effective.colleges = effective
            .colleges
            .into_iter()
            .map(canonical_college)
            .collect();
        (effective, dropped)
    }
}

fn allows<T: PartialEq>(selected: &[T], value: Option<&T>) -> bool {
    selected.is_empty() || value.is_some_and(|v| selected.contains(v))
}

// ---------------------------------------------------------------------------
// Applying a request
// ---------------------------------------------------------------------------

/// Borrowed view of the records that pass all active filters, in dataset
/// order. Records themselves are never altered.
pub fn filter<'a>(dataset: &'a SalaryDataset, request: &FilterRequest) -> Vec<&'a SalaryRecord> {
    if request.is_empty() {
        return dataset.records().iter().collect();
    }
    dataset
        .records()
        .iter()
        .filter(|rec| request.matches(rec))
        .collect()
}
