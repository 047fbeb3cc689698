use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use super::model::{AppointmentStatus, CellValue, SalaryRecord, UnionStatus, YearLabel};

/// One parsed row: upper-cased column name → cell.
pub type RawRow = BTreeMap<String, CellValue>;

/// Columns every yearly extract must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "YEAR",
    "DEPARTMENT",
    "COLLEGE",
    "RANK",
    "APPT",
    "MEM1",
    "SALARY",
    "HIRE_DATE",
    "RANK_DATE",
];

/// Columns holding calendar dates.
pub const DATE_COLUMNS: [&str; 2] = ["HIRE_DATE", "RANK_DATE"];

const DAYS_PER_YEAR: f64 = 365.25;

/// Retired college name → the name every record must use.
const COLLEGE_RENAMES: [(&str, &str); 1] = [("COET", "GACET")];

static NULL_CELL: CellValue = CellValue::Null;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

// ---------------------------------------------------------------------------
// Per-file context
// ---------------------------------------------------------------------------

/// Everything a row needs from its source file: the fiscal year and the date
/// durations are measured up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearContext {
    pub fiscal_year: i32,
    pub reference_date: NaiveDate,
}

impl YearContext {
    /// Durations run to June 30 of the fiscal year once it has passed, and to
    /// `as_of` while the year is still in progress.
    pub fn new(fiscal_year: i32, as_of: NaiveDate) -> Self {
        let reference_date = academic_year_cutoff(fiscal_year)
            .filter(|cutoff| *cutoff < as_of)
            .unwrap_or(as_of);
        YearContext {
            fiscal_year,
            reference_date,
        }
    }
}

/// June 30 of `fiscal_year`.
pub fn academic_year_cutoff(fiscal_year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(fiscal_year, 6, 30)
}

/// Fractional years from `start` to `end` (negative if `start` is later).
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    end.signed_duration_since(start).num_days() as f64 / DAYS_PER_YEAR
}

// ---------------------------------------------------------------------------
// Field normalization
// ---------------------------------------------------------------------------

pub fn canonical_college(name: String) -> String {
    COLLEGE_RENAMES
        .iter()
        .find(|(old, _)| *old == name)
        .map(|(_, new)| new.to_string())
        .unwrap_or(name)
}

/// Parse a date cell. Unparseable or blank cells are absent, not errors.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|dt| dt.date())
                })
        }
        _ => None,
    }
}

/// Salary amounts: numbers, or text with `$` and thousands separators.
/// Negative and non-finite amounts are treated as absent.
pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::String(s) => {
            let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',')).collect();
            cleaned.trim().parse::<f64>().ok()
        }
        other => other.as_f64(),
    }?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Turn one raw row into a normalized record tagged with the file's year.
pub fn normalize_row(row: &RawRow, ctx: &YearContext) -> SalaryRecord {
    let cell = |col: &str| row.get(col).unwrap_or(&NULL_CELL);

    let hire_date = parse_date(cell("HIRE_DATE"));
    let rank_date = parse_date(cell("RANK_DATE"));
    let appointment_code = cell("APPT").as_i64();
    let union_membership_raw = cell("MEM1").as_text();

    let salary = parse_amount(cell("SALARY"));
    if salary.is_none() && !matches!(cell("SALARY"), CellValue::Null) {
        log::debug!(
            "FY{}: unusable SALARY value {}",
            ctx.fiscal_year,
            cell("SALARY")
        );
    }

    SalaryRecord {
        fiscal_year: ctx.fiscal_year,
        academic_year_label: cell("YEAR").as_text().map(YearLabel::new),
        department: cell("DEPARTMENT").as_text(),
        college: cell("COLLEGE").as_text().map(canonical_college),
        rank: cell("RANK").as_text(),
        appointment_code,
        appointment_status: appointment_code.and_then(AppointmentStatus::from_code),
        union_status: union_membership_raw.as_deref().and_then(UnionStatus::from_raw),
        union_membership_raw,
        salary,
        hire_date,
        rank_date,
        time_employed_years: hire_date.map(|d| years_between(d, ctx.reference_date)),
        time_in_rank_years: rank_date.map(|d| years_between(d, ctx.reference_date)),
    }
}
