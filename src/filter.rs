// Table Filter - threshold predicates and filtered view summaries
//
// A filtered view is recomputed from scratch on every interaction; nothing
// is cached between calls.

use crate::aggregate::{column_max, column_mean, column_min};
use crate::dataset::{Column, Record};
use crate::error::Statistic;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The three minimum thresholds of the Filters page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_experience: u32,
    pub min_salary: f64,
    pub min_demand: f64,
}

impl Thresholds {
    pub fn new(min_experience: u32, min_salary: f64, min_demand: f64) -> Self {
        Self {
            min_experience,
            min_salary,
            min_demand,
        }
    }

    /// (column, inclusive lower bound) pairs
    pub fn predicates(&self) -> [(Column, f64); 3] {
        [
            (Column::ExperienceYears, self.min_experience as f64),
            (Column::SalaryMedian, self.min_salary),
            (Column::DemandIndex, self.min_demand),
        ]
    }

    pub fn matches(&self, record: &Record) -> bool {
        matches_minimums(record, &self.predicates())
    }
}

impl Default for Thresholds {
    /// All-zero thresholds; no column of the table goes below zero
    fn default() -> Self {
        Self::new(0, 0.0, 0.0)
    }
}

/// Whether a record meets every (column >= bound) test
pub fn matches_minimums(record: &Record, minimums: &[(Column, f64)]) -> bool {
    minimums
        .iter()
        .all(|(column, bound)| column.value(record) >= *bound)
}

/// Rows meeting every minimum, in source order
pub fn filter_by_minimums(records: &[Record], minimums: &[(Column, f64)]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| matches_minimums(r, minimums))
        .cloned()
        .collect()
}

// ============================================================================
// FILTERED VIEW
// ============================================================================

/// Count and means over a filtered subset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub count: usize,
    pub mean_salary: Statistic,
    pub mean_demand: Statistic,
}

impl FilterSummary {
    pub fn of(records: &[Record]) -> Self {
        Self {
            count: records.len(),
            mean_salary: column_mean(records, Column::SalaryMedian).into(),
            mean_demand: column_mean(records, Column::DemandIndex).into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Rows passing all thresholds plus their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredView {
    pub thresholds: Thresholds,
    pub records: Vec<Record>,
    pub summary: FilterSummary,
}

/// Apply the three thresholds and summarize the result
pub fn apply_filter(records: &[Record], thresholds: &Thresholds) -> FilteredView {
    let filtered = filter_by_minimums(records, &thresholds.predicates());
    let summary = FilterSummary::of(&filtered);

    debug!(
        min_experience = thresholds.min_experience,
        min_salary = thresholds.min_salary,
        min_demand = thresholds.min_demand,
        matched = summary.count,
        "filter applied"
    );

    FilteredView {
        thresholds: *thresholds,
        records: filtered,
        summary,
    }
}

// ============================================================================
// SLIDER BOUNDS
// ============================================================================

/// Integer range of one threshold slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl SliderRange {
    fn for_column(records: &[Record], column: Column) -> Self {
        let min = column_min(records, column).map(|v| v as i64).unwrap_or(0);
        let max = column_max(records, column).map(|v| v as i64).unwrap_or(min);
        Self {
            min,
            max,
            default: min,
        }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max.max(self.min))
    }
}

/// Ranges of the three Filters page sliders, derived from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderBounds {
    pub experience: SliderRange,
    pub salary: SliderRange,
    pub demand: SliderRange,
}

impl SliderBounds {
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            experience: SliderRange::for_column(records, Column::ExperienceYears),
            salary: SliderRange::for_column(records, Column::SalaryMedian),
            demand: SliderRange::for_column(records, Column::DemandIndex),
        }
    }

    /// Slider start positions: every threshold at its column minimum
    pub fn defaults(&self) -> Thresholds {
        Thresholds::new(
            self.experience.default.max(0) as u32,
            self.salary.default as f64,
            self.demand.default as f64,
        )
    }

    /// Pull thresholds into the slider ranges
    ///
    /// Fractional minimums round up to the next slider step, so the rows a
    /// clamped threshold admits are the ones the raw threshold admits.
    pub fn clamp(&self, thresholds: &Thresholds) -> Thresholds {
        Thresholds::new(
            self.experience.clamp(thresholds.min_experience as i64).max(0) as u32,
            self.salary.clamp(thresholds.min_salary.ceil() as i64) as f64,
            self.demand.clamp(thresholds.min_demand.ceil() as i64) as f64,
        )
    }
}
