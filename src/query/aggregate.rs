use serde::Serialize;

use crate::config::MergerTable;
use crate::data::model::SalaryRecord;

// ---------------------------------------------------------------------------
// Statistics over one field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Statistics {
    /// Mean, median, min and max of the finite values; `None` when there are
    /// none. An even count takes the midpoint of the two middle values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };

        Some(Statistics {
            mean,
            median,
            min: values[0],
            max: values[n - 1],
        })
    }
}

/// How a metric should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Currency,
    Years,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Salary,
    TimeEmployed,
    TimeInRank,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Salary, Metric::TimeEmployed, Metric::TimeInRank];

    /// Row heading in the summary table.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Salary => "Base Salary",
            Metric::TimeEmployed => "Time Employed",
            Metric::TimeInRank => "Time in Rank",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Metric::Salary => Unit::Currency,
            Metric::TimeEmployed | Metric::TimeInRank => Unit::Years,
        }
    }

    fn value(self, record: &SalaryRecord) -> Option<f64> {
        match self {
            Metric::Salary => record.salary,
            Metric::TimeEmployed => record.time_employed_years,
            Metric::TimeInRank => record.time_in_rank_years,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary tables and empty-result classification
// ---------------------------------------------------------------------------

/// One row of a summary table. `stats` is `None` when no record in the
/// subset has the field, which reads as "not yet available".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub label: &'static str,
    pub unit: Unit,
    /// Records contributing a value.
    pub count: usize,
    pub stats: Option<Statistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    /// Records in the subset, including those with absent values.
    pub records: usize,
    pub metrics: Vec<MetricSummary>,
}

impl SummaryTable {
    pub fn metric(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EmptyReason {
    /// The department was merged or reorganized as of `merger_year`.
    Merged { department: String, merger_year: i32 },
    /// Nothing to show for this selection (yet).
    NotYetAvailable,
}

/// Outcome of aggregating one breakdown. Empty outcomes are expected
/// results, not errors; callers pick the user-facing message from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Aggregate {
    Populated(SummaryTable),
    Empty(EmptyReason),
}

impl Aggregate {
    pub fn is_populated(&self) -> bool {
        matches!(self, Aggregate::Populated(_))
    }
}

/// What an empty subset was selected by, for classifying why it is empty.
#[derive(Debug, Clone, Copy)]
pub struct EmptyScope<'a> {
    pub department: Option<&'a str>,
    pub fiscal_year: Option<i32>,
    pub mergers: &'a MergerTable,
}

/// Per-metric statistics; `None` when every metric is absent across the
/// subset (including an empty subset).
pub fn summary_table(subset: &[&SalaryRecord]) -> Option<SummaryTable> {
    let metrics: Vec<MetricSummary> = Metric::ALL
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = subset.iter().filter_map(|r| metric.value(r)).collect();
            MetricSummary {
                metric,
                label: metric.label(),
                unit: metric.unit(),
                count: values.len(),
                stats: Statistics::from_values(values),
            }
        })
        .collect();

    if metrics.iter().all(|m| m.stats.is_none()) {
        return None;
    }
    Some(SummaryTable {
        records: subset.len(),
        metrics,
    })
}

/// Explain an empty subset: a merger when a department selection falls at
/// or after that department's merger year, otherwise generic.
pub fn classify_empty(scope: &EmptyScope<'_>) -> EmptyReason {
    let merged = scope.department.zip(scope.fiscal_year).and_then(|(dept, year)| {
        scope
            .mergers
            .merged_as_of(dept, year)
            .map(|merger_year| (dept, merger_year))
    });

    match merged {
        Some((department, merger_year)) => EmptyReason::Merged {
            department: department.to_string(),
            merger_year,
        },
        None => EmptyReason::NotYetAvailable,
    }
}

/// Aggregate a filtered subset, classifying empty results.
pub fn aggregate(subset: &[&SalaryRecord], scope: &EmptyScope<'_>) -> Aggregate {
    if subset.is_empty() {
        let reason = classify_empty(scope);
        log::debug!("empty subset for {scope:?}: {reason:?}");
        return Aggregate::Empty(reason);
    }
    match summary_table(subset) {
        Some(table) => Aggregate::Populated(table),
        None => Aggregate::Empty(EmptyReason::NotYetAvailable),
    }
}
