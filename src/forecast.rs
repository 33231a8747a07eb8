// Forecast figures for the Advanced Insights page
//
// These are fixed growth multipliers applied to historical aggregates, not a
// fitted model.

use crate::aggregate::{column_mean, column_sum, group_by, group_by_pair, Agg, GroupCell};
use crate::dataset::{Column, Record};
use crate::error::Statistic;
use serde::{Deserialize, Serialize};

/// Next-year multiplier for median salary
pub const SALARY_GROWTH: f64 = 1.05;

/// Next-year multiplier for job openings
pub const OPENINGS_GROWTH: f64 = 1.08;

/// Historical value next to its projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub key: f64,
    pub historical: f64,
    pub forecast: f64,
}

/// Mean median salary times the salary multiplier, truncated
pub fn projected_salary(records: &[Record]) -> Statistic {
    Statistic::from(column_mean(records, Column::SalaryMedian)).map(|v| (v * SALARY_GROWTH).trunc())
}

/// Total openings times the openings multiplier, truncated
pub fn projected_openings(records: &[Record]) -> f64 {
    (column_sum(records, Column::JobOpenings) * OPENINGS_GROWTH).trunc()
}

fn project(grouped: Vec<(f64, f64)>, growth: f64) -> Vec<ForecastPoint> {
    grouped
        .into_iter()
        .map(|(key, historical)| ForecastPoint {
            key,
            historical,
            forecast: historical * growth,
        })
        .collect()
}

/// Mean median salary per year with its projection
pub fn salary_forecast_by_year(records: &[Record]) -> Vec<ForecastPoint> {
    project(
        group_by(records, Column::Year, Column::SalaryMedian, Agg::Mean),
        SALARY_GROWTH,
    )
}

/// Total openings per year with its projection
pub fn openings_forecast_by_year(records: &[Record]) -> Vec<ForecastPoint> {
    project(
        group_by(records, Column::Year, Column::JobOpenings, Agg::Sum),
        OPENINGS_GROWTH,
    )
}

/// Projected mean salary per (year, experience) cell
pub fn salary_forecast_by_year_and_experience(records: &[Record]) -> Vec<GroupCell> {
    group_by_pair(
        records,
        Column::Year,
        Column::ExperienceYears,
        Column::SalaryMedian,
        Agg::Mean,
    )
    .into_iter()
    .map(|cell| GroupCell {
        value: cell.value * SALARY_GROWTH,
        ..cell
    })
    .collect()
}
