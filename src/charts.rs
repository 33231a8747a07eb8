// Declarative chart specifications
//
// Pages describe charts as data: kind, axis bindings, display options and the
// points to draw. Renderers (terminal or browser) decide how to draw them.

use crate::aggregate::GroupCell;
use crate::dataset::{Column, Record};
use serde::{Deserialize, Serialize};

/// Default visual template, matching the browser renderer
pub const TEMPLATE: &str = "plotly_white";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Scatter,
    Histogram,
    Box,
    Violin,
    Heatmap,
    DensityContour,
    Polar,
}

/// Axis binding: the column a chart axis shows and its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub field: String,
    pub label: String,
}

impl Axis {
    pub fn column(column: Column) -> Self {
        Self {
            field: column.name().to_string(),
            label: column.label().to_string(),
        }
    }

    pub fn named(field: &str, label: &str) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
        }
    }
}

/// One plotted point; optional channels are omitted when unused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Point {
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            size: None,
            color: None,
            text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: &str, points: Vec<Point>) -> Self {
        Self {
            name: name.to_string(),
            points,
        }
    }

    /// Series from (x, y) pairs
    pub fn from_pairs(name: &str, pairs: &[(f64, f64)]) -> Self {
        Self::new(name, pairs.iter().map(|(x, y)| Point::xy(*x, *y)).collect())
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub template: String,
    #[serde(default)]
    pub markers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbins: Option<usize>,
    /// Name of the fitted trend line, e.g. "ols"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trendline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_field: Option<String>,
    #[serde(default)]
    pub line_close: bool,
    #[serde(default)]
    pub box_overlay: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            template: TEMPLATE.to_string(),
            markers: false,
            opacity: None,
            nbins: None,
            trendline: None,
            size_field: None,
            color_field: None,
            text_field: None,
            line_close: false,
            box_overlay: false,
        }
    }
}

/// Everything a renderer needs to draw one chart panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: Option<Axis>,
    pub y: Option<Axis>,
    pub series: Vec<Series>,
    pub options: ChartOptions,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x: None,
            y: None,
            series: Vec::new(),
            options: ChartOptions::default(),
        }
    }

    pub fn x(mut self, axis: Axis) -> Self {
        self.x = Some(axis);
        self
    }

    pub fn y(mut self, axis: Axis) -> Self {
        self.y = Some(axis);
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn markers(mut self) -> Self {
        self.options.markers = true;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.options.opacity = Some(opacity);
        self
    }

    pub fn nbins(mut self, nbins: usize) -> Self {
        self.options.nbins = Some(nbins);
        self
    }

    pub fn trendline(mut self, method: &str) -> Self {
        self.options.trendline = Some(method.to_string());
        self
    }

    pub fn size_by(mut self, column: Column) -> Self {
        self.options.size_field = Some(column.name().to_string());
        self
    }

    pub fn color_by(mut self, column: Column) -> Self {
        self.options.color_field = Some(column.name().to_string());
        self
    }

    pub fn text_by(mut self, field: &str) -> Self {
        self.options.text_field = Some(field.to_string());
        self
    }

    pub fn line_close(mut self) -> Self {
        self.options.line_close = true;
        self
    }

    pub fn box_overlay(mut self) -> Self {
        self.options.box_overlay = true;
        self
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

// ============================================================================
// SERIES BUILDERS
// ============================================================================

/// One point per record from two columns, with optional size/color channels
pub fn record_points(
    records: &[Record],
    x: Column,
    y: Column,
    size: Option<Column>,
    color: Option<Column>,
) -> Vec<Point> {
    records
        .iter()
        .map(|r| Point {
            size: size.map(|c| c.value(r)),
            color: color.map(|c| c.value(r)),
            ..Point::xy(x.value(r), y.value(r))
        })
        .collect()
}

/// Single-column values as y points (x is the row index); used by box and histogram panels
pub fn column_points(records: &[Record], column: Column) -> Vec<Point> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Point::xy(i as f64, column.value(r)))
        .collect()
}

/// Heatmap cells as points carrying z
pub fn cell_points(cells: &[GroupCell]) -> Vec<Point> {
    cells
        .iter()
        .map(|c| Point {
            z: Some(c.value),
            ..Point::xy(c.x, c.y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_records;

    #[test]
    fn test_builder_sets_options() {
        let chart = ChartSpec::new(ChartKind::Scatter, "Demand vs Openings")
            .x(Axis::column(Column::DemandIndex))
            .y(Axis::column(Column::JobOpenings))
            .size_by(Column::SalaryMedian)
            .opacity(0.7);

        assert_eq!(chart.options.template, TEMPLATE);
        assert_eq!(chart.options.opacity, Some(0.7));
        assert_eq!(chart.options.size_field.as_deref(), Some("salary_median_cny"));
        assert_eq!(chart.x.unwrap().label, "Demand Index");
    }

    #[test]
    fn test_record_points_channels() {
        let records = sample_records();
        let points = record_points(
            &records[..2],
            Column::DemandIndex,
            Column::JobOpenings,
            Some(Column::SalaryMedian),
            None,
        );
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].x, 65.0);
        assert_eq!(points[1].y, 150.0);
        assert_eq!(points[1].size, Some(9500.0));
        assert_eq!(points[1].color, None);
    }

    #[test]
    fn test_unused_channels_are_not_serialized() {
        let json = serde_json::to_value(Point::xy(1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0}));

        let chart = ChartSpec::new(ChartKind::DensityContour, "Density");
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "density_contour");
        assert_eq!(json["options"]["template"], "plotly_white");
    }
}
