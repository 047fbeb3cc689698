use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

const HEADER: [&str; 9] = [
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

/// (department, college before the rename, last fiscal year reported)
const DEPARTMENTS: [(&str, &str, i32); 7] = [
    ("CIS", "COET", 2022),
    ("DET", "COET", 2022),
    ("Engineering Technology", "COET", 2025),
    ("History", "CAS", 2025),
    ("Biology", "CAS", 2025),
    ("Nursing", "CHHS", 2025),
    ("Accounting", "COB", 2025),
];

/// (rank, base salary)
const RANKS: [(&str, f64); 4] = [
    ("Professor", 98000.0),
    ("Associate Professor", 79000.0),
    ("Assistant Professor", 66000.0),
    ("Lecturer", 51000.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

struct SampleRow {
    year: i64,
    department: &'static str,
    college: &'static str,
    rank: &'static str,
    appt: i64,
    mem1: Option<&'static str>,
    salary: f64,
    hire_date: Option<NaiveDate>,
    rank_date: Option<NaiveDate>,
}

fn random_date(rng: &mut SimpleRng, first_year: i32, last_year: i32) -> Option<NaiveDate> {
    let span = (last_year - first_year).max(0) as u64 + 1;
    let year = first_year + rng.below(span) as i32;
    NaiveDate::from_ymd_opt(year, 1 + rng.below(12) as u32, 1 + rng.below(28) as u32)
}

fn generate_year(rng: &mut SimpleRng, fiscal_year: i32) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    for &(department, college, last_year) in &DEPARTMENTS {
        if fiscal_year > last_year {
            continue;
        }
        let college = if college == "COET" && fiscal_year > 2022 {
            "GACET"
        } else {
            college
        };
        for _ in 0..(4 + rng.below(5)) {
            let (rank, base) = RANKS[rng.below(RANKS.len() as u64) as usize];
            let growth = 1.0 + 0.025 * (fiscal_year - 2022) as f64;
            let salary = ((base * growth + rng.next_f64() * 12000.0) * 100.0).round() / 100.0;

            let hire_date = random_date(rng, 1992, fiscal_year - 1);
            let rank_date =
                hire_date.and_then(|h| random_date(rng, h.year(), fiscal_year - 1));

            rows.push(SampleRow {
                year: fiscal_year as i64,
                department,
                college,
                rank,
                appt: if rng.chance(0.8) { 100 } else if rng.chance(0.9) { 50 } else { 75 },
                mem1: match rng.below(10) {
                    0 => None,
                    1..=2 => Some("Non-Member"),
                    _ => Some("Member"),
                },
                salary,
                hire_date: hire_date.filter(|_| !rng.chance(0.05)),
                rank_date: rank_date.filter(|_| !rng.chance(0.05)),
            });
        }
    }
    rows
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record([
            row.year.to_string(),
            row.department.to_string(),
            row.college.to_string(),
            row.rank.to_string(),
            row.appt.to_string(),
            row.mem1.unwrap_or_default().to_string(),
            format!("{:.2}", row.salary),
            format_date(row.hire_date),
            format_date(row.rank_date),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn days_since_epoch(date: Option<NaiveDate>) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    date.map(|d| d.signed_duration_since(epoch).num_days() as i32)
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("YEAR", DataType::Int64, false),
        Field::new("DEPARTMENT", DataType::Utf8, false),
        Field::new("COLLEGE", DataType::Utf8, false),
        Field::new("RANK", DataType::Utf8, false),
        Field::new("APPT", DataType::Int64, false),
        Field::new("MEM1", DataType::Utf8, true),
        Field::new("SALARY", DataType::Float64, false),
        Field::new("HIRE_DATE", DataType::Date32, true),
        Field::new("RANK_DATE", DataType::Date32, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.department))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.college))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.rank))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.appt))),
        Arc::new(rows.iter().map(|r| r.mem1).collect::<StringArray>()),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.salary))),
        Arc::new(Date32Array::from(
            rows.iter().map(|r| days_since_epoch(r.hire_date)).collect::<Vec<_>>(),
        )),
        Arc::new(Date32Array::from(
            rows.iter().map(|r| days_since_epoch(r.rank_date)).collect::<Vec<_>>(),
        )),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

/// Writes `FY22`..`FY24` as CSV and `FY25` as Parquet into the directory
/// given as the first argument (default `sample_data`).
fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).context("creating output directory")?;

    let mut rng = SimpleRng::new(42);
    for fiscal_year in 2022..=2025 {
        let rows = generate_year(&mut rng, fiscal_year);
        let yy = fiscal_year % 100;
        let path = if fiscal_year == 2025 {
            let path = out_dir.join(format!("FY{yy:02}-Salaries.parquet"));
            write_parquet(&path, &rows)?;
            path
        } else {
            let path = out_dir.join(format!("FY{yy:02}-Salaries.csv"));
            write_csv(&path, &rows)?;
            path
        };
        println!("Wrote {} salary rows to {}", rows.len(), path.display());
    }
    Ok(())
}
