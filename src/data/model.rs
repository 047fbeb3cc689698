use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell from an input sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as read from any of the supported file formats
/// before normalization into a [`SalaryRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Trimmed text of the cell; `None` for nulls and blank strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            other => Some(other.to_string()),
        }
    }

    /// Numeric view of the cell. Strings are parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Integer view; floats and numeric strings must be integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            other => other
                .as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64),
        }
    }
}

// ---------------------------------------------------------------------------
// YearLabel – the display year as written in the YEAR column
// ---------------------------------------------------------------------------

/// Display year as present in the source (`2024`, `"2023-24"`, ...).
///
/// Ordered by the fiscal year its trailing two digits encode, then by text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct YearLabel(String);

impl YearLabel {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        YearLabel(label.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Four-digit fiscal year (`2000 + yy`) from the label's last two digits.
    pub fn fiscal_year(&self) -> Option<i32> {
        let tail = self.0.get(self.0.len().checked_sub(2)?..)?;
        if !tail.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        tail.parse::<i32>().ok().map(|yy| 2000 + yy)
    }
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for YearLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fiscal_year()
            .cmp(&other.fiscal_year())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for YearLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Requests may carry years as JSON numbers or strings.
impl<'de> Deserialize<'de> for YearLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => YearLabel::new(n.to_string()),
            Raw::Text(s) => YearLabel::new(s),
        })
    }
}

// ---------------------------------------------------------------------------
// Looked-up statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "Full Time")]
    FullTime,
    #[serde(rename = "VPR")]
    Vpr,
}

impl AppointmentStatus {
    /// Fixed APPT lookup: 100 → Full Time, 50 → VPR, anything else absent.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            100 => Some(AppointmentStatus::FullTime),
            50 => Some(AppointmentStatus::Vpr),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::FullTime => "Full Time",
            AppointmentStatus::Vpr => "VPR",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnionStatus {
    Member,
    #[serde(rename = "Non-Member")]
    NonMember,
}

impl UnionStatus {
    /// Identity lookup over the recognized MEM1 values.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Member" => Some(UnionStatus::Member),
            "Non-Member" => Some(UnionStatus::NonMember),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnionStatus::Member => "Member",
            UnionStatus::NonMember => "Non-Member",
        }
    }
}

impl fmt::Display for UnionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SalaryRecord – one person-year observation
// ---------------------------------------------------------------------------

/// One normalized row. Every looked-up or derived field is optional; absent
/// values are excluded from statistics, never coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryRecord {
    /// `2000 + yy` from the source file name.
    pub fiscal_year: i32,
    pub academic_year_label: Option<YearLabel>,
    pub department: Option<String>,
    /// Canonical college name (`COET` is reported as `GACET`).
    pub college: Option<String>,
    pub rank: Option<String>,
    pub appointment_code: Option<i64>,
    pub appointment_status: Option<AppointmentStatus>,
    pub union_membership_raw: Option<String>,
    pub union_status: Option<UnionStatus>,
    pub salary: Option<f64>,
    pub hire_date: Option<NaiveDate>,
    pub rank_date: Option<NaiveDate>,
    pub time_employed_years: Option<f64>,
    pub time_in_rank_years: Option<f64>,
}

/// All records parsed from one source file.
#[derive(Debug, Clone)]
pub struct YearBatch {
    pub fiscal_year: i32,
    pub source: PathBuf,
    pub records: Vec<SalaryRecord>,
}

/// A recoverable problem found while loading; the offending file is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    UnparseableYear { file: String },
    DuplicateYear { file: String, fiscal_year: i32 },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::UnparseableYear { file } => {
                write!(f, "Could not parse year from filename '{file}'. Skipping.")
            }
            LoadWarning::DuplicateYear { file, fiscal_year } => write!(
                f,
                "File '{file}' repeats fiscal year {fiscal_year} already loaded. Skipping."
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// SalaryDataset – the merged, immutable collection
// ---------------------------------------------------------------------------

/// Unique non-absent values per filter dimension, for the presentation
/// layer's pickers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<YearLabel>,
    pub departments: Vec<String>,
    pub colleges: Vec<String>,
    pub ranks: Vec<String>,
    pub appointment_statuses: Vec<AppointmentStatus>,
    pub union_statuses: Vec<UnionStatus>,
}

/// The merged dataset. Records are never mutated after construction.
#[derive(Debug, Clone)]
pub struct SalaryDataset {
    records: Vec<SalaryRecord>,
    options: FilterOptions,
    warnings: Vec<LoadWarning>,
}

impl SalaryDataset {
    /// Build the dimension indices from the merged records.
    pub fn from_records(records: Vec<SalaryRecord>, warnings: Vec<LoadWarning>) -> Self {
        let mut years = BTreeSet::new();
        let mut departments = BTreeSet::new();
        let mut colleges = BTreeSet::new();
        let mut ranks = BTreeSet::new();
        let mut appointment_statuses = BTreeSet::new();
        let mut union_statuses = BTreeSet::new();

        for rec in &records {
            years.extend(rec.academic_year_label.clone());
            departments.extend(rec.department.clone());
            colleges.extend(rec.college.clone());
            ranks.extend(rec.rank.clone());
            appointment_statuses.extend(rec.appointment_status);
            union_statuses.extend(rec.union_status);
        }

        let options = FilterOptions {
            years: years.into_iter().collect(),
            departments: departments.into_iter().collect(),
            colleges: colleges.into_iter().collect(),
            ranks: ranks.into_iter().collect(),
            appointment_statuses: appointment_statuses.into_iter().collect(),
            union_statuses: union_statuses.into_iter().collect(),
        };

        SalaryDataset {
            records,
            options,
            warnings,
        }
    }

    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Files skipped during the load that produced this dataset.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Distinct fiscal years present, ascending.
    pub fn fiscal_years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.fiscal_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Bare record for tests; fill in what the test needs.
    pub(crate) fn record(fiscal_year: i32) -> SalaryRecord {
        SalaryRecord {
            fiscal_year,
            academic_year_label: Some(YearLabel::new(fiscal_year.to_string())),
            department: None,
            college: None,
            rank: None,
            appointment_code: None,
            appointment_status: None,
            union_membership_raw: None,
            union_status: None,
            salary: None,
            hire_date: None,
            rank_date: None,
            time_employed_years: None,
            time_in_rank_years: None,
        }
    }

    #[test]
    fn year_label_fiscal_year_uses_trailing_digits() {
        assert_eq!(YearLabel::new("2024").fiscal_year(), Some(2024));
        assert_eq!(YearLabel::new("2023-24").fiscal_year(), Some(2024));
        assert_eq!(YearLabel::new(" 2022 ").fiscal_year(), Some(2022));
        assert_eq!(YearLabel::new("AY").fiscal_year(), None);
        assert_eq!(YearLabel::new("7").fiscal_year(), None);
    }

    #[test]
    fn year_labels_sort_by_fiscal_year() {
        let mut labels = vec![
            YearLabel::new("2024"),
            YearLabel::new("2021-22"),
            YearLabel::new("2023"),
        ];
        labels.sort();
        let sorted: Vec<&str> = labels.iter().map(YearLabel::as_str).collect();
        assert_eq!(sorted, ["2021-22", "2023", "2024"]);
    }

    #[test]
    fn year_label_deserializes_from_number_or_string() {
        let labels: Vec<YearLabel> = serde_json::from_str(r#"[2024, "2023"]"#).unwrap();
        assert_eq!(labels, [YearLabel::new("2024"), YearLabel::new("2023")]);
    }

    #[test]
    fn appointment_lookup_is_fixed() {
        assert_eq!(AppointmentStatus::from_code(100), Some(AppointmentStatus::FullTime));
        assert_eq!(AppointmentStatus::from_code(50), Some(AppointmentStatus::Vpr));
        assert_eq!(AppointmentStatus::from_code(75), None);
    }

    #[test]
    fn union_lookup_only_recognizes_known_values() {
        assert_eq!(UnionStatus::from_raw("Member"), Some(UnionStatus::Member));
        assert_eq!(UnionStatus::from_raw("Non-Member"), Some(UnionStatus::NonMember));
        assert_eq!(UnionStatus::from_raw("member"), None);
        assert_eq!(UnionStatus::from_raw("Agency Fee"), None);
    }

    #[test]
    fn statuses_serialize_with_display_labels() {
        let json = serde_json::to_string(&[AppointmentStatus::FullTime, AppointmentStatus::Vpr])
            .unwrap();
        assert_eq!(json, r#"["Full Time","VPR"]"#);
        let parsed: UnionStatus = serde_json::from_str(r#""Non-Member""#).unwrap();
        assert_eq!(parsed, UnionStatus::NonMember);
    }

    #[test]
    fn cell_text_renders_integral_floats_without_fraction() {
        assert_eq!(CellValue::Float(2024.0).as_text().as_deref(), Some("2024"));
        assert_eq!(CellValue::String("  ".into()).as_text(), None);
        assert_eq!(CellValue::Null.as_text(), None);
        assert_eq!(CellValue::String("100".into()).as_i64(), Some(100));
        assert_eq!(CellValue::Float(50.5).as_i64(), None);
    }

    #[test]
    fn options_skip_absent_values() {
        let mut a = record(2023);
        a.department = Some("History".into());
        a.appointment_status = Some(AppointmentStatus::Vpr);
        let mut b = record(2024);
        b.department = Some("Biology".into());
        let c = record(2024);

        let ds = SalaryDataset::from_records(vec![a, b, c], Vec::new());
        let opts = ds.options();
        assert_eq!(opts.departments, ["Biology", "History"]);
        assert_eq!(opts.appointment_statuses, [AppointmentStatus::Vpr]);
        assert!(opts.union_statuses.is_empty());
        assert_eq!(ds.fiscal_years(), [2023, 2024]);
        assert_eq!(ds.len(), 3);
    }
}
