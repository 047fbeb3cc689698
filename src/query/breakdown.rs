use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::aggregate::{aggregate, Aggregate, EmptyReason, EmptyScope};
use super::summary::{describe, FilterSummary, QueryWarning};
use crate::config::DashboardConfig;
use crate::data::filter::{filter, FilterRequest};
use crate::data::model::{SalaryDataset, SalaryRecord, YearLabel};

/// Empty college or department table with no matching rows.
pub const NO_ROWS_MESSAGE: &str = "Data is not yet available for the selected years.";

/// Granularity of one summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownLevel {
    College,
    Department,
    University,
}

impl fmt::Display for BreakdownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BreakdownLevel::College => "college-level",
            BreakdownLevel::Department => "department-level",
            BreakdownLevel::University => "university-level",
        })
    }
}

/// One (year, breakdown) result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownTable {
    pub year: YearLabel,
    pub level: BreakdownLevel,
    /// College or department name; `None` at university level.
    pub unit: Option<String>,
    /// Records selected for this table, before any metric is checked.
    pub records: usize,
    pub outcome: Aggregate,
}

impl BreakdownTable {
    pub fn title(&self) -> String {
        format!(
            "{} Salary Table - {}",
            self.year,
            self.unit.as_deref().unwrap_or("University")
        )
    }

    pub fn caption(&self) -> String {
        format!(
            "This table displays the {} data at the {} for the selected filters.",
            self.year, self.level
        )
    }

    /// User-facing explanation when the outcome is empty.
    pub fn empty_message(&self) -> Option<String> {
        match &self.outcome {
            Aggregate::Populated(_) => None,
            Aggregate::Empty(EmptyReason::Merged {
                department,
                merger_year,
            }) => Some(format!(
                "{department} was merged or reorganized beginning AY {merger_year}."
            )),
            Aggregate::Empty(EmptyReason::NotYetAvailable)
                if self.records == 0 && self.level != BreakdownLevel::University =>
            {
                Some(NO_ROWS_MESSAGE.to_string())
            }
            Aggregate::Empty(EmptyReason::NotYetAvailable) => {
                Some(format!("Data is not yet available for {}.", self.year))
            }
        }
    }
}

/// Everything the presentation layer renders for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// Ascending by year; within a year, by unit name.
    pub tables: Vec<BreakdownTable>,
    pub filter_summary: FilterSummary,
    pub warnings: Vec<QueryWarning>,
}

/// First `max_years` years as entered, then sorted ascending. Returns the
/// years shown and the ones dropped.
pub fn select_years(years: &[YearLabel], max_years: usize) -> (Vec<YearLabel>, Vec<YearLabel>) {
    let cut = years.len().min(max_years);
    let mut shown = years[..cut].to_vec();
    shown.sort();
    shown.dedup();
    (shown, years[cut..].to_vec())
}

fn sorted_unique(values: &[String]) -> BTreeSet<&str> {
    values.iter().map(String::as_str).collect()
}

fn breakdown_table(
    year: &YearLabel,
    level: BreakdownLevel,
    unit: Option<&str>,
    subset: &[&SalaryRecord],
    scope: &EmptyScope<'_>,
) -> BreakdownTable {
    BreakdownTable {
        year: year.clone(),
        level,
        unit: unit.map(str::to_string),
        records: subset.len(),
        outcome: aggregate(subset, scope),
    }
}

/// Tables for one year of already-filtered data. Colleges take precedence
/// over departments, which take precedence over the university default.
fn year_tables(
    year: &YearLabel,
    year_data: &[&SalaryRecord],
    request: &FilterRequest,
    config: &DashboardConfig,
) -> Vec<BreakdownTable> {
    let scope = EmptyScope {
        department: None,
        fiscal_year: year.fiscal_year(),
        mergers: &config.department_merger_years,
    };

    if !request.colleges.is_empty() {
        sorted_unique(&request.colleges)
            .into_iter()
            .map(|college| {
                let subset: Vec<&SalaryRecord> = year_data
                    .iter()
                    .copied()
                    .filter(|r| r.college.as_deref() == Some(college))
                    .collect();
                breakdown_table(year, BreakdownLevel::College, Some(college), &subset, &scope)
            })
            .collect()
    } else if !request.departments.is_empty() {
        sorted_unique(&request.departments)
            .into_iter()
            .map(|department| {
                let subset: Vec<&SalaryRecord> = year_data
                    .iter()
                    .copied()
                    .filter(|r| r.department.as_deref() == Some(department))
                    .collect();
                let scope = EmptyScope {
                    department: Some(department),
                    ..scope
                };
                breakdown_table(
                    year,
                    BreakdownLevel::Department,
                    Some(department),
                    &subset,
                    &scope,
                )
            })
            .collect()
    } else {
        vec![breakdown_table(year, BreakdownLevel::University, None, year_data, &scope)]
    }
}

/// Run one filter → aggregate pass over the loaded dataset.
pub fn run_query(
    dataset: &SalaryDataset,
    request: &FilterRequest,
    config: &DashboardConfig,
) -> QueryResponse {
    let mut warnings: Vec<QueryWarning> = dataset
        .warnings()
        .iter()
        .cloned()
        .map(QueryWarning::Load)
        .collect();

    let (effective, dropped_departments) = request.effective(config.max_departments);
    if !dropped_departments.is_empty() {
        log::warn!(
            "{} department(s) beyond the first {} ignored: {:?}",
            dropped_departments.len(),
            config.max_departments,
            dropped_departments
        );
        warnings.push(QueryWarning::DepartmentsCapped {
            limit: config.max_departments,
            dropped: dropped_departments,
        });
    }

    let filtered = filter(dataset, &effective);
    log::debug!("{} of {} record(s) pass the filters", filtered.len(), dataset.len());

    let (years, dropped_years) = select_years(&effective.years, config.max_years);
    let mut tables = Vec::new();
    for year in &years {
        let fiscal_year = year.fiscal_year();
        let year_data: Vec<&SalaryRecord> = filtered
            .iter()
            .copied()
            .filter(|r| Some(r.fiscal_year) == fiscal_year)
            .collect();
        tables.extend(year_tables(year, &year_data, &effective, config));
    }

    if years.is_empty() {
        warnings.push(QueryWarning::NoYearsSelected);
    }
    if !dropped_years.is_empty() {
        warnings.push(QueryWarning::YearsCapped {
            limit: config.max_years,
            dropped: dropped_years.iter().map(ToString::to_string).collect(),
        });
    }

    QueryResponse {
        tables,
        filter_summary: describe(&effective),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::query::summary::NO_FILTER_MESSAGE;

    fn labels(years: &[&str]) -> Vec<YearLabel> {
        years.iter().map(|y| YearLabel::new(*y)).collect()
    }

    fn staff(year: i32, dept: &str, college: &str, salary: f64) -> SalaryRecord {
        let mut r = record(year);
        r.department = Some(dept.into());
        r.college = Some(college.into());
        r.salary = Some(salary);
        r
    }

    fn dataset() -> SalaryDataset {
        SalaryDataset::from_records(
            vec![
                staff(2022, "CIS", "GACET", 70000.0),
                staff(2022, "History", "CAS", 55000.0),
                staff(2023, "History", "CAS", 56000.0),
                staff(2023, "Nursing", "CHHS", 65000.0),
                staff(2024, "History", "CAS", 58000.0),
                staff(2024, "Nursing", "CHHS", 67000.0),
            ],
            Vec::new(),
        )
    }

    fn years_of(response: &QueryResponse) -> Vec<&str> {
        response.tables.iter().map(|t| t.year.as_str()).collect()
    }

    #[test]
    fn cap_then_sort_keeps_first_entries() {
        let (shown, dropped) = select_years(&labels(&["2024", "2021", "2023", "2022"]), 3);
        assert_eq!(shown, labels(&["2021", "2023", "2024"]));
        assert_eq!(dropped, labels(&["2022"]));
    }

    #[test]
    fn three_years_are_sorted_without_cap_warning() {
        let request = FilterRequest {
            years: labels(&["2024", "2022", "2023"]),
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());
        assert_eq!(years_of(&response), ["2022", "2023", "2024"]);
        assert!(response.tables.iter().all(|t| t.level == BreakdownLevel::University));
        assert!(!response
            .warnings
            .iter()
            .any(|w| matches!(w, QueryWarning::YearsCapped { .. })));
    }

    #[test]
    fn fourth_year_is_dropped_with_warning() {
        let request = FilterRequest {
            years: labels(&["2024", "2022", "2023", "2021"]),
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());
        assert_eq!(years_of(&response), ["2022", "2023", "2024"]);
        assert!(response.warnings.contains(&QueryWarning::YearsCapped {
            limit: 3,
            dropped: vec!["2021".into()],
        }));
    }

    #[test]
    fn colleges_take_precedence_over_departments() {
        let request = FilterRequest {
            years: labels(&["2023"]),
            colleges: vec!["CHHS".into(), "CAS".into()],
            departments: vec!["History".into(), "Nursing".into()],
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());
        assert_eq!(response.tables.len(), 2);
        assert!(response.tables.iter().all(|t| t.level == BreakdownLevel::College));
        let units: Vec<_> = response.tables.iter().map(|t| t.unit.as_deref()).collect();
        assert_eq!(units, [Some("CAS"), Some("CHHS")]);
        assert!(response.tables.iter().all(|t| t.outcome.is_populated()));
    }

    #[test]
    fn department_breakdown_explains_merged_department() {
        let request = FilterRequest {
            years: labels(&["2022", "2023"]),
            departments: vec!["History".into(), "CIS".into()],
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());

        let cells: Vec<(&str, Option<&str>, bool)> = response
            .tables
            .iter()
            .map(|t| (t.year.as_str(), t.unit.as_deref(), t.outcome.is_populated()))
            .collect();
        assert_eq!(
            cells,
            [
                ("2022", Some("CIS"), true),
                ("2022", Some("History"), true),
                ("2023", Some("CIS"), false),
                ("2023", Some("History"), true),
            ]
        );

        let cis_2023 = &response.tables[2];
        assert_eq!(
            cis_2023.outcome,
            Aggregate::Empty(EmptyReason::Merged {
                department: "CIS".into(),
                merger_year: 2023,
            })
        );
        assert_eq!(
            cis_2023.empty_message().as_deref(),
            Some("CIS was merged or reorganized beginning AY 2023.")
        );
    }

    #[test]
    fn unknown_department_without_rows_is_generic() {
        let request = FilterRequest {
            years: labels(&["2024"]),
            departments: vec!["Music".into()],
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());
        let table = &response.tables[0];
        assert_eq!(table.outcome, Aggregate::Empty(EmptyReason::NotYetAvailable));
        assert_eq!(table.records, 0);
        assert_eq!(table.empty_message().as_deref(), Some(NO_ROWS_MESSAGE));
    }

    #[test]
    fn department_rows_without_metrics_name_the_year() {
        let mut blank = record(2024);
        blank.department = Some("Music".into());
        let ds = SalaryDataset::from_records(vec![blank], Vec::new());
        let request = FilterRequest {
            years: labels(&["2024"]),
            departments: vec!["Music".into()],
            ..Default::default()
        };
        let response = run_query(&ds, &request, &DashboardConfig::default());
        let table = &response.tables[0];
        assert_eq!(table.records, 1);
        assert_eq!(
            table.empty_message().as_deref(),
            Some("Data is not yet available for 2024.")
        );
    }

    #[test]
    fn future_year_is_not_yet_available() {
        let request = FilterRequest {
            years: labels(&["2026"]),
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());
        let table = &response.tables[0];
        assert_eq!(table.title(), "2026 Salary Table - University");
        assert_eq!(
            table.empty_message().as_deref(),
            Some("Data is not yet available for 2026.")
        );
    }

    #[test]
    fn seven_departments_keep_first_five_and_warn() {
        let departments: Vec<String> =
            ["Nursing", "History", "Art", "Music", "Math", "CIS", "Biology"]
                .map(String::from)
                .to_vec();
        let request = FilterRequest {
            years: labels(&["2022"]),
            departments,
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());

        let units: Vec<&str> = response.tables.iter().filter_map(|t| t.unit.as_deref()).collect();
        assert_eq!(units, ["Art", "History", "Math", "Music", "Nursing"]);
        assert!(response.warnings.contains(&QueryWarning::DepartmentsCapped {
            limit: 5,
            dropped: vec!["CIS".into(), "Biology".into()],
        }));
        assert_eq!(
            response.filter_summary.lines[1],
            "2. Departments: Nursing, History, Art, Music, Math"
        );
    }

    #[test]
    fn no_years_yields_no_tables() {
        let response =
            run_query(&dataset(), &FilterRequest::default(), &DashboardConfig::default());
        assert!(response.tables.is_empty());
        assert_eq!(response.warnings, [QueryWarning::NoYearsSelected]);
        assert_eq!(response.filter_summary.heading, NO_FILTER_MESSAGE);
    }

    #[test]
    fn university_table_aggregates_the_year() {
        let request = FilterRequest {
            years: labels(&["2024"]),
            ..Default::default()
        };
        let response = run_query(&dataset(), &request, &DashboardConfig::default());
        let Aggregate::Populated(table) = &response.tables[0].outcome else {
            panic!("expected a populated table");
        };
        assert_eq!(table.records, 2);
        let salary = table.metrics[0].stats.unwrap();
        assert_eq!(salary.mean, 62500.0);
        assert_eq!(
            response.tables[0].caption(),
            "This table displays the 2024 data at the university-level for the selected filters."
        );
    }
}
