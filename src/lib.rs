// Job Market Dashboard - Core Library
// Exposes all modules for use in the terminal UI, API server, and tests

pub mod error;
pub mod dataset;    // Records, columns, sample table, CSV export
pub mod aggregate;  // Group-by and column statistics
pub mod filter;     // Threshold filter + summary
pub mod forecast;   // Fixed-multiplier projections
pub mod charts;     // Declarative chart specifications
pub mod pages;      // Page variants and page rendering
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{DashboardError, Result, Statistic};
pub use dataset::{
    Record, Column,
    sample_records, to_csv, write_csv, export_csv, parse_csv,
    EXPORT_FILE_NAME, EXPORT_MIME,
};
pub use aggregate::{
    Agg, Bin, FiveNumberSummary, GroupCell, LinearFit,
    mean, column_mean, column_sum, column_max, column_min,
    group_by, group_by_pair, quantile, histogram, linear_fit, five_number_summary,
};
pub use filter::{
    Thresholds, FilteredView, FilterSummary, SliderBounds, SliderRange,
    apply_filter, filter_by_minimums, matches_minimums,
};
pub use forecast::{
    ForecastPoint, SALARY_GROWTH, OPENINGS_GROWTH,
    projected_salary, projected_openings,
    salary_forecast_by_year, openings_forecast_by_year, salary_forecast_by_year_and_experience,
};
pub use charts::{Axis, ChartKind, ChartOptions, ChartSpec, Point, Series};
pub use pages::{
    Page, PageContext, PageView, ControlOverrides, Metric, MetricFormat, Section, Slider, TableView, Download,
    render_page, recommended_jobs, SIDEBAR_TITLE,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
