// Error types for the dashboard core
//
// Only EmptyResult is a real domain condition: a filter or aggregate that
// matches zero rows leaves its mean undefined. Display layers turn it into
// an explicit "no data" marker through `Statistic`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by the dashboard library
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Aggregation over an empty row set
    #[error("no data: the selection matched zero records")]
    EmptyResult,

    /// Page slug that does not name any dashboard page
    #[error("unknown page: {0}")]
    UnknownPage(String),

    /// CSV serialization or parsing failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system failure (export, config)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Query string that does not decode into slider positions
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration could not be read or written
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// A scalar metric as shown on a KPI tile: either a number or "no data"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Statistic {
    Value(f64),
    NoData,
}

impl Statistic {
    pub fn value(&self) -> Option<f64> {
        match self {
            Statistic::Value(v) => Some(*v),
            Statistic::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Statistic::NoData)
    }

    /// Apply a numeric transformation, keeping NoData as is
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Statistic {
        match self {
            Statistic::Value(v) => Statistic::Value(f(v)),
            Statistic::NoData => Statistic::NoData,
        }
    }
}

impl From<Result<f64>> for Statistic {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(v) => Statistic::Value(v),
            Err(_) => Statistic::NoData,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Value(v) => write!(f, "{}", v),
            Statistic::NoData => write!(f, "no data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_becomes_no_data() {
        let stat: Statistic = Err(DashboardError::EmptyResult).into();
        assert!(stat.is_no_data());
        assert_eq!(stat.to_string(), "no data");
        assert_eq!(stat.value(), None);
    }

    #[test]
    fn test_value_passes_through() {
        let stat: Statistic = Ok(42.5).into();
        assert_eq!(stat, Statistic::Value(42.5));
        assert_eq!(stat.map(|v| v * 2.0), Statistic::Value(85.0));
        assert_eq!(Statistic::NoData.map(|v| v * 2.0), Statistic::NoData);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DashboardError::UnknownPage("nope".to_string()).to_string(),
            "unknown page: nope"
        );
        assert!(DashboardError::EmptyResult.to_string().starts_with("no data"));
    }
}
