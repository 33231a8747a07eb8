// Aggregation helpers - group-by, column statistics and distribution summaries
//
// Plain relational aggregation over the in-memory table. Every page reuses
// these with different column parameters.

use crate::dataset::{Column, Record};
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Aggregate function applied to each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agg {
    Mean,
    Sum,
}

impl Agg {
    fn apply(&self, values: &[f64]) -> Result<f64> {
        match self {
            Agg::Mean => mean(values),
            Agg::Sum => Ok(values.iter().sum()),
        }
    }
}

// ============================================================================
// SCALAR STATISTICS
// ============================================================================

/// Arithmetic mean; EmptyResult when there is nothing to average
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(DashboardError::EmptyResult);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn column_mean(records: &[Record], column: Column) -> Result<f64> {
    mean(&column.values(records))
}

pub fn column_sum(records: &[Record], column: Column) -> f64 {
    records.iter().map(|r| column.value(r)).sum()
}

pub fn column_max(records: &[Record], column: Column) -> Result<f64> {
    records
        .iter()
        .map(|r| column.value(r))
        .max_by(f64::total_cmp)
        .ok_or(DashboardError::EmptyResult)
}

pub fn column_min(records: &[Record], column: Column) -> Result<f64> {
    records
        .iter()
        .map(|r| column.value(r))
        .min_by(f64::total_cmp)
        .ok_or(DashboardError::EmptyResult)
}

/// Quantile with linear interpolation between the two closest ranks
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(DashboardError::EmptyResult);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Min, lower quartile, median, upper quartile, max
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn five_number_summary(values: &[f64]) -> Result<FiveNumberSummary> {
    Ok(FiveNumberSummary {
        min: quantile(values, 0.0)?,
        q1: quantile(values, 0.25)?,
        median: quantile(values, 0.5)?,
        q3: quantile(values, 0.75)?,
        max: quantile(values, 1.0)?,
    })
}

// ============================================================================
// GROUP BY
// ============================================================================

/// Group rows by `key` and aggregate `value` per group, ascending by key
pub fn group_by(records: &[Record], key: Column, value: Column, agg: Agg) -> Vec<(f64, f64)> {
    let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();

    for record in records {
        let k = key.value(record);
        let v = value.value(record);
        match groups.iter_mut().find(|(gk, _)| *gk == k) {
            Some((_, values)) => values.push(v),
            None => groups.push((k, vec![v])),
        }
    }

    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    groups
        .into_iter()
        .filter_map(|(k, values)| agg.apply(&values).ok().map(|v| (k, v)))
        .collect()
}

/// One cell of a two-key grouping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupCell {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Group rows by the (`x`, `y`) key pair, ascending by x then y
pub fn group_by_pair(
    records: &[Record],
    x: Column,
    y: Column,
    value: Column,
    agg: Agg,
) -> Vec<GroupCell> {
    let mut groups: Vec<((f64, f64), Vec<f64>)> = Vec::new();

    for record in records {
        let k = (x.value(record), y.value(record));
        let v = value.value(record);
        match groups.iter_mut().find(|(gk, _)| *gk == k) {
            Some((_, values)) => values.push(v),
            None => groups.push((k, vec![v])),
        }
    }

    groups.sort_by(|a, b| match a.0 .0.total_cmp(&b.0 .0) {
        Ordering::Equal => a.0 .1.total_cmp(&b.0 .1),
        other => other,
    });

    groups
        .into_iter()
        .filter_map(|((gx, gy), values)| {
            agg.apply(&values).ok().map(|value| GroupCell { x: gx, y: gy, value })
        })
        .collect()
}

// ============================================================================
// DISTRIBUTIONS
// ============================================================================

/// One equal-width histogram bin, [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram; the last bin is closed so the maximum is counted
pub fn histogram(values: &[f64], nbins: usize) -> Vec<Bin> {
    if values.is_empty() || nbins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // All values equal: one bin holds everything
    if max == min {
        return vec![Bin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / nbins as f64;
    let mut bins: Vec<Bin> = (0..nbins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(nbins - 1);
        bins[idx].count += 1;
    }

    bins
}

/// Ordinary least squares fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least squares line through (xs, ys); None when x has no spread
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_records;

    #[test]
    fn test_mean_of_empty_is_empty_result() {
        assert!(matches!(mean(&[]), Err(DashboardError::EmptyResult)));
        assert!(matches!(column_max(&[], Column::DemandIndex), Err(DashboardError::EmptyResult)));
    }

    #[test]
    fn test_column_statistics() {
        let records = sample_records();
        assert_eq!(column_mean(&records, Column::SalaryMedian).unwrap(), 10300.0);
        assert_eq!(column_sum(&records, Column::JobOpenings), 9100.0);
        assert_eq!(column_max(&records, Column::DemandIndex).unwrap(), 80.0);
        assert_eq!(column_min(&records, Column::ExperienceYears).unwrap(), 0.0);
        assert_eq!(column_mean(&records, Column::ExperienceYears).unwrap(), 2.2);
    }

    #[test]
    fn test_group_by_year() {
        let records = sample_records();

        let salary = group_by(&records, Column::Year, Column::SalaryMedian, Agg::Mean);
        assert_eq!(
            salary,
            vec![
                (2019.0, 9000.0),
                (2020.0, 9500.0),
                (2021.0, 10000.0),
                (2022.0, 11000.0),
                (2023.0, 12000.0),
            ]
        );

        let openings = group_by(&records, Column::Year, Column::JobOpenings, Agg::Sum);
        assert_eq!(openings[0], (2019.0, 1200.0));
        assert_eq!(openings[4], (2023.0, 2500.0));
    }

    #[test]
    fn test_group_by_sorts_keys() {
        let mut records = sample_records();
        records.reverse();
        let grouped = group_by(&records, Column::DemandIndex, Column::JobOpenings, Agg::Sum);
        let keys: Vec<f64> = grouped.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![60.0, 65.0, 70.0, 75.0, 80.0]);
    }

    #[test]
    fn test_group_by_pair() {
        let records = sample_records();
        let cells = group_by_pair(
            &records,
            Column::Year,
            Column::ExperienceYears,
            Column::SalaryMedian,
            Agg::Mean,
        );
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[2], GroupCell { x: 2021.0, y: 2.0, value: 10000.0 });
    }

    #[test]
    fn test_quantile_interpolates() {
        let demand = Column::DemandIndex.values(&sample_records());
        assert_eq!(quantile(&demand, 0.75).unwrap(), 75.0);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5).unwrap(), 2.5);
        assert_eq!(quantile(&[10.0], 0.9).unwrap(), 10.0);
    }

    #[test]
    fn test_five_number_summary() {
        let summary = five_number_summary(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let salaries = Column::SalaryMedian.values(&sample_records());
        let bins = histogram(&salaries, 40);

        assert_eq!(bins.len(), 40);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 50);
        assert_eq!(bins[0].count, 10);
        assert_eq!(bins[39].count, 10);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[3.0, 3.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_linear_fit() {
        let fit = linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.predict(3.0) - 7.0).abs() < 1e-9);

        assert!(linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(linear_fit(&[1.0], &[2.0]).is_none());
    }
}
