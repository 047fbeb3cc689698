use std::fmt;

use serde::Serialize;

use crate::data::filter::FilterRequest;
use crate::data::model::LoadWarning;

pub const NO_FILTER_MESSAGE: &str = "No filter has been applied to the table.";
pub const FILTER_HEADING: &str = "The table(s) reflect the following selected filters:";

// ---------------------------------------------------------------------------
// Filter summary
// ---------------------------------------------------------------------------

/// Human-readable account of the filters behind a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub heading: String,
    /// Numbered lines, one per active dimension. Empty when nothing is
    /// filtered.
    pub lines: Vec<String>,
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.heading)?;
        for line in &self.lines {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

fn joined<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Describe `request`. Years are listed as entered; the caller passes the
/// department list it actually applied.
pub fn describe(request: &FilterRequest) -> FilterSummary {
    if request.is_empty() {
        return FilterSummary {
            heading: NO_FILTER_MESSAGE.to_string(),
            lines: Vec::new(),
        };
    }

    let dimensions = [
        ("Years", joined(&request.years)),
        ("Departments", joined(&request.departments)),
        ("Colleges", joined(&request.colleges)),
        ("Ranks", joined(&request.ranks)),
        ("Appointment Status", joined(&request.appointment_statuses)),
        ("Union Membership Status", joined(&request.union_statuses)),
    ];
    let lines = dimensions
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .enumerate()
        .map(|(i, (name, values))| format!("{}. {name}: {values}", i + 1))
        .collect();

    FilterSummary {
        heading: FILTER_HEADING.to_string(),
        lines,
    }
}

// ---------------------------------------------------------------------------
// Query warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum QueryWarning {
    /// A file skipped while loading the dataset.
    Load(LoadWarning),
    DepartmentsCapped { limit: usize, dropped: Vec<String> },
    YearsCapped { limit: usize, dropped: Vec<String> },
    NoYearsSelected,
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWarning::Load(w) => write!(f, "{w}"),
            QueryWarning::DepartmentsCapped { limit, .. } => write!(
                f,
                "Only the first {limit} tables of the selected departments will be displayed."
            ),
            QueryWarning::YearsCapped { limit, .. } => write!(
                f,
                "Only the first {limit} selected academic years are displayed."
            ),
            QueryWarning::NoYearsSelected => write!(
                f,
                "Please select at least one academic year and any additional filters."
            ),
        }
    }
}
