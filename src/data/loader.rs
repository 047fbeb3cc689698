use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Days, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, LoadWarning, YearBatch};
use super::normalize::{normalize_row, RawRow, YearContext, DATE_COLUMNS, REQUIRED_COLUMNS};
use crate::error::DashboardError;

/// Human-readable form of the file name pattern, for messages.
pub const FILE_PATTERN: &str = "FY<yy>-Salaries.xlsx";

const FILE_PREFIX: &str = "FY";
const FILE_SUFFIX: &str = "-Salaries";
const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];
const OTHER_EXTENSIONS: [&str; 3] = ["csv", "json", "parquet"];

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// One yearly extract found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub fiscal_year: i32,
}

/// Everything a directory scan turned up, before merging.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub dir: PathBuf,
    pub batches: Vec<YearBatch>,
    pub warnings: Vec<LoadWarning>,
}

#[derive(Debug, PartialEq, Eq)]
enum NameMatch {
    NotASource,
    BadYear,
    Year(i32),
}

/// Classify a file name against `FY<yy>-Salaries.<ext>`.
fn match_source_name(file_name: &str) -> NameMatch {
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return NameMatch::NotASource;
    };
    let ext = ext.to_ascii_lowercase();
    if !SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) && !OTHER_EXTENSIONS.contains(&ext.as_str())
    {
        return NameMatch::NotASource;
    }
    let Some(token) = stem
        .strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
    else {
        return NameMatch::NotASource;
    };

    if token.len() == 2 && token.bytes().all(|b| b.is_ascii_digit()) {
        match token.parse::<i32>() {
            Ok(yy) => NameMatch::Year(2000 + yy),
            Err(_) => NameMatch::BadYear,
        }
    } else {
        NameMatch::BadYear
    }
}

/// List the yearly extracts in `dir`, sorted by file name. Names with an
/// unparseable year token are skipped with a warning, and so is every file
/// after the first for a given fiscal year. Skipped files are never read.
pub fn discover_files(dir: &Path) -> Result<(Vec<SourceFile>, Vec<LoadWarning>), DashboardError> {
    let read_dir_err = |source: std::io::Error| DashboardError::ReadDir {
        dir: dir.to_path_buf(),
        source,
    };

    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        if entry.file_type().map_err(read_dir_err)?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }

    let mut files = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_years = BTreeSet::new();
    for file_name in names {
        match match_source_name(&file_name) {
            NameMatch::NotASource => {}
            NameMatch::BadYear => {
                log::warn!("Could not parse year from filename '{file_name}'. Skipping.");
                warnings.push(LoadWarning::UnparseableYear { file: file_name });
            }
            NameMatch::Year(fiscal_year) if !seen_years.insert(fiscal_year) => {
                log::warn!("'{file_name}' repeats fiscal year {fiscal_year}; skipping");
                warnings.push(LoadWarning::DuplicateYear {
                    file: file_name,
                    fiscal_year,
                });
            }
            NameMatch::Year(fiscal_year) => files.push(SourceFile {
                path: dir.join(&file_name),
                file_name,
                fiscal_year,
            }),
        }
    }
    Ok((files, warnings))
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every yearly extract in `dir`, measuring durations against `as_of`.
///
/// A directory with no matching files still returns a report with no
/// batches; [`super::merge::merge`] turns that into the "no data" signal.
pub fn load_directory(dir: &Path, as_of: NaiveDate) -> Result<LoadReport, DashboardError> {
    let (files, warnings) = discover_files(dir)?;
    log::info!("found {} salary file(s) in {}", files.len(), dir.display());

    let mut batches = Vec::with_capacity(files.len());
    for file in &files {
        let batch = load_year(file, as_of).map_err(|e| DashboardError::File {
            path: file.path.clone(),
            reason: format!("{e:#}"),
        })?;
        log::info!(
            "loaded {} record(s) for FY{} from {}",
            batch.records.len(),
            batch.fiscal_year,
            file.file_name
        );
        batches.push(batch);
    }

    Ok(LoadReport {
        dir: dir.to_path_buf(),
        batches,
        warnings,
    })
}

/// Read one file and normalize its rows, tagging each with the file's year.
pub fn load_year(file: &SourceFile, as_of: NaiveDate) -> Result<YearBatch> {
    let table = read_table(&file.path)?;
    if table.headers.is_empty() && table.rows.is_empty() {
        log::warn!("{} holds no rows", file.file_name);
    } else {
        check_required_columns(&table.headers)?;
    }

    let ctx = YearContext::new(file.fiscal_year, as_of);
    let records = table.rows.iter().map(|row| normalize_row(row, &ctx)).collect();

    Ok(YearBatch {
        fiscal_year: file.fiscal_year,
        source: file.path.clone(),
        records,
    })
}

/// Raw rows of one file plus its normalized header names.
#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Read a tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row first
/// * `.json`    – `[{ "YEAR": 2024, "SALARY": 61000, ... }, ...]`
/// * `.parquet` – one column per field
pub fn read_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path),
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn normalize_header(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

fn check_required_columns(headers: &[String]) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.as_str() == *col))
        .collect();
    if !missing.is_empty() {
        bail!("missing required column(s): {}", missing.join(", "));
    }
    Ok(())
}

fn is_blank_row(row: &RawRow) -> bool {
    row.values().all(|v| v.as_text().is_none())
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Excel's day zero for the 1900 date system.
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Spreadsheet serial day number → calendar date; the time part is dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    excel_epoch()?.checked_add_days(Days::new(serial.floor() as u64))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        _ => CellValue::Null,
    }
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| normalize_header(&c.to_string()))
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table {
        headers,
        rows: Vec::new(),
    };
    for cells in rows {
        let row: RawRow = table
            .headers
            .iter()
            .zip(cells)
            .map(|(h, c)| (h.clone(), spreadsheet_cell(c)))
            .collect();
        if !is_blank_row(&row) {
            table.rows.push(row);
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one person-year per line.
fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, value)| (h.clone(), guess_cell_type(value)))
            .collect();
        if !is_blank_row(&row) {
            rows.push(row);
        }
    }

    Ok(Table { headers, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as `df.to_json(orient='records')` writes it.
/// Keys missing from an object read as null.
fn read_json(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers = BTreeSet::new();
    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let row: RawRow = obj
            .iter()
            .map(|(key, val)| {
                let header = normalize_header(key);
                let cell = json_to_cell(&header, val);
                (header, cell)
            })
            .collect();
        headers.extend(row.keys().cloned());
        rows.push(row);
    }

    Ok(Table {
        headers: headers.into_iter().collect(),
        rows,
    })
}

/// Pandas writes datetimes into records JSON as epoch milliseconds.
fn epoch_millis_to_date(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

fn json_to_cell(header: &str, val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Number(n) if DATE_COLUMNS.contains(&header) => n
            .as_i64()
            .and_then(epoch_millis_to_date)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet extract written by Pandas (`df.to_parquet()`) or Polars.
/// Timestamp and Date64 columns are read as calendar dates.
fn read_parquet(path: &Path) -> Result<Table> {
    let file = fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| normalize_header(f.name()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .map(dates_as_date32)
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            let raw: RawRow = headers
                .iter()
                .zip(&columns)
                .map(|(h, col)| (h.clone(), extract_cell(col, row)))
                .collect();
            if !is_blank_row(&raw) {
                rows.push(raw);
            }
        }
    }

    Ok(Table { headers, rows })
}

// -- Parquet / Arrow helpers --

fn dates_as_date32(col: &ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Timestamp(_, _) | DataType::Date64 => {
            cast(col, &DataType::Date32).context("converting date column")
        }
        _ => Ok(col.clone()),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        other => {
            log::debug!("unsupported parquet column type {other:?}; reading as null");
            CellValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{AppointmentStatus, UnionStatus};

    #[test]
    fn source_names_parse_two_digit_year() {
        assert_eq!(match_source_name("FY24-Salaries.xlsx"), NameMatch::Year(2024));
        assert_eq!(match_source_name("FY09-Salaries.CSV"), NameMatch::Year(2009));
        assert_eq!(match_source_name("FY2x-Salaries.xlsx"), NameMatch::BadYear);
        assert_eq!(match_source_name("FY-Salaries.xlsx"), NameMatch::BadYear);
        assert_eq!(match_source_name("FY2024-Salaries.xlsx"), NameMatch::BadYear);
    }

    #[test]
    fn unrelated_names_are_ignored() {
        assert_eq!(match_source_name("README.md"), NameMatch::NotASource);
        assert_eq!(match_source_name("FY24-Salaries.txt"), NameMatch::NotASource);
        assert_eq!(match_source_name("FY24-Budget.xlsx"), NameMatch::NotASource);
        assert_eq!(match_source_name("FY24-Salaries"), NameMatch::NotASource);
    }

    #[test]
    fn discovery_sorts_and_reports_bad_years() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["FY24-Salaries.csv", "FY22-Salaries.csv", "FYab-Salaries.csv", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let (files, warnings) = discover_files(dir.path()).unwrap();
        let years: Vec<i32> = files.iter().map(|f| f.fiscal_year).collect();
        assert_eq!(years, [2022, 2024]);
        assert_eq!(
            warnings,
            [LoadWarning::UnparseableYear {
                file: "FYab-Salaries.csv".into()
            }]
        );
    }

    #[test]
    fn missing_directory_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_files(&missing),
            Err(DashboardError::ReadDir { .. })
        ));
    }

    #[test]
    fn excel_serials_become_dates() {
        assert_eq!(excel_serial_to_date(45000.0), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(excel_serial_to_date(45000.75), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(excel_serial_to_date(-3.0), None);
    }

    #[test]
    fn csv_missing_required_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FY23-Salaries.csv");
        fs::write(&path, "YEAR,DEPARTMENT,SALARY\n2023,History,50000\n").unwrap();
        let file = SourceFile {
            path,
            file_name: "FY23-Salaries.csv".into(),
            fiscal_year: 2023,
        };

        let err = load_year(&file, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("COLLEGE"), "{msg}");
        assert!(msg.contains("HIRE_DATE"), "{msg}");
    }

    #[test]
    fn csv_rows_are_normalized_and_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FY23-Salaries.csv");
        fs::write(
            &path,
            "year,department,college,rank,appt,mem1,salary,hire_date,rank_date\n\
             2023,CIS,COET,Professor,100,Member,\"$80,000\",2020-06-30,\n\
             ,,,,,,,,\n\
             2023,History,CAS,Lecturer,50,,52000,,2021-08-01\n",
        )
        .unwrap();
        let file = SourceFile {
            path,
            file_name: "FY23-Salaries.csv".into(),
            fiscal_year: 2023,
        };

        let batch = load_year(&file, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert!(batch.records.iter().all(|r| r.fiscal_year == 2023));

        let first = &batch.records[0];
        assert_eq!(first.college.as_deref(), Some("GACET"));
        assert_eq!(first.salary, Some(80000.0));
        assert!((first.time_employed_years.unwrap() - 3.0).abs() < 0.01);
        assert_eq!(first.rank_date, None);

        let second = &batch.records[1];
        assert_eq!(second.union_status, None);
        assert_eq!(second.hire_date, None);
        assert!(second.time_in_rank_years.is_some());
    }

    const CSV_HEADER: &str = "YEAR,DEPARTMENT,COLLEGE,RANK,APPT,MEM1,SALARY,HIRE_DATE,RANK_DATE\n";

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn source(dir: &Path, name: &str, fiscal_year: i32) -> SourceFile {
        SourceFile {
            path: dir.join(name),
            file_name: name.into(),
            fiscal_year,
        }
    }

    #[test]
    fn repeated_year_is_skipped_before_it_is_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FY23-Salaries.csv"),
            format!("{CSV_HEADER}2023,History,CAS,Professor,100,Member,60000,2010-08-15,\n"),
        )
        .unwrap();
        fs::write(dir.path().join("FY23-Salaries.json"), "{ not json").unwrap();

        let report = load_directory(dir.path(), as_of()).unwrap();
        assert_eq!(report.batches.len(), 1);
        assert_eq!(report.batches[0].records.len(), 1);
        assert_eq!(
            report.warnings,
            [LoadWarning::DuplicateYear {
                file: "FY23-Salaries.json".into(),
                fiscal_year: 2023,
            }]
        );
    }

    #[test]
    fn empty_json_extract_is_a_year_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FY25-Salaries.json"), "[]").unwrap();

        let batch = load_year(&source(dir.path(), "FY25-Salaries.json", 2025), as_of()).unwrap();
        assert_eq!(batch.fiscal_year, 2025);
        assert!(batch.records.is_empty());
    }

    #[test]
    fn header_only_csv_still_checks_columns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FY25-Salaries.csv"), "YEAR,SALARY\n").unwrap();

        assert!(load_year(&source(dir.path(), "FY25-Salaries.csv", 2025), as_of()).is_err());
    }

    #[test]
    fn json_epoch_millis_dates_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FY23-Salaries.json"),
            r#"[{"YEAR": 2023, "DEPARTMENT": "CIS", "COLLEGE": "COET", "RANK": "Professor",
                "APPT": 100, "MEM1": "Member", "SALARY": 80000,
                "HIRE_DATE": 1593475200000, "RANK_DATE": null}]"#,
        )
        .unwrap();

        let batch = load_year(&source(dir.path(), "FY23-Salaries.json", 2023), as_of()).unwrap();
        let rec = &batch.records[0];
        assert_eq!(rec.hire_date, NaiveDate::from_ymd_opt(2020, 6, 30));
        assert!((rec.time_employed_years.unwrap() - 3.0).abs() < 0.01);
        assert_eq!(rec.rank_date, None);
        // Only date columns are read as timestamps.
        assert_eq!(rec.salary, Some(80000.0));
        assert_eq!(rec.academic_year_label.as_ref().map(|y| y.as_str()), Some("2023"));
    }

    #[test]
    fn xlsx_rows_are_normalized_and_tagged() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FY23-Salaries.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let hired = ExcelDateTime::from_ymd(2020, 6, 30).unwrap();
        sheet.write_number(1, 0, 2023).unwrap();
        sheet.write_string(1, 1, "CIS").unwrap();
        sheet.write_string(1, 2, "COET").unwrap();
        sheet.write_string(1, 3, "Professor").unwrap();
        sheet.write_number(1, 4, 100).unwrap();
        sheet.write_string(1, 5, "Member").unwrap();
        sheet.write_number(1, 6, 81500.5).unwrap();
        sheet.write_datetime_with_format(1, 7, &hired, &date_format).unwrap();
        // Short row: everything after COLLEGE left empty.
        sheet.write_number(2, 0, 2023).unwrap();
        sheet.write_string(2, 1, "History").unwrap();
        sheet.write_string(2, 2, "CAS").unwrap();
        workbook.save(&path).unwrap();

        let batch = load_year(&source(dir.path(), "FY23-Salaries.xlsx", 2023), as_of()).unwrap();
        assert_eq!(batch.records.len(), 2);

        let first = &batch.records[0];
        assert_eq!(first.fiscal_year, 2023);
        assert_eq!(first.academic_year_label.as_ref().map(|y| y.as_str()), Some("2023"));
        assert_eq!(first.college.as_deref(), Some("GACET"));
        assert_eq!(first.appointment_status, Some(AppointmentStatus::FullTime));
        assert_eq!(first.union_status, Some(UnionStatus::Member));
        assert_eq!(first.salary, Some(81500.5));
        assert_eq!(first.hire_date, NaiveDate::from_ymd_opt(2020, 6, 30));
        assert!((first.time_employed_years.unwrap() - 3.0).abs() < 0.01);
        assert_eq!(first.rank_date, None);

        let second = &batch.records[1];
        assert_eq!(second.department.as_deref(), Some("History"));
        assert_eq!(second.appointment_code, None);
        assert_eq!(second.salary, None);
        assert_eq!(second.hire_date, None);
    }
}
