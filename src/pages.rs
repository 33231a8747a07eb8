// Dashboard pages
//
// Each page is a pure function of (records, context) producing a PageView:
// text sections, KPI metrics, charts, an optional table and an optional
// download. The selected page and every slider value travel in explicit
// arguments; there is no ambient session state.

use crate::aggregate::{
    column_max, column_mean, column_sum, group_by, group_by_pair, linear_fit, quantile, Agg,
};
use crate::charts::{cell_points, column_points, record_points, Axis, ChartKind, ChartSpec, Point, Series};
use crate::dataset::{Column, Record, EXPORT_FILE_NAME, EXPORT_MIME};
use crate::error::{DashboardError, Result, Statistic};
use crate::filter::{apply_filter, filter_by_minimums, SliderBounds, Thresholds};
use crate::forecast::{
    openings_forecast_by_year, projected_openings, projected_salary,
    salary_forecast_by_year, salary_forecast_by_year_and_experience,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Sidebar heading
pub const SIDEBAR_TITLE: &str = "China Jobs Market";

/// Data View row slider: minimum, default and step
pub const ROWS_MIN: usize = 5;
pub const ROWS_DEFAULT: usize = 20;
pub const ROWS_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Overview,
    MarketOverview,
    SalaryExperience,
    DemandKpis,
    Forecasting,
    SkillsRecommendations,
    Filters,
    DataView,
    Conclusion,
}

impl Page {
    /// Sidebar order
    pub const ALL: [Page; 9] = [
        Page::Overview,
        Page::MarketOverview,
        Page::SalaryExperience,
        Page::DemandKpis,
        Page::Forecasting,
        Page::SkillsRecommendations,
        Page::Filters,
        Page::DataView,
        Page::Conclusion,
    ];

    fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::MarketOverview => "Market Overview",
            Page::SalaryExperience => "Salary & Experience Analysis",
            Page::DemandKpis => "Job Demand & Market KPIs",
            Page::Forecasting => "Advanced Insights & Forecasting",
            Page::SkillsRecommendations => "Skills & Job Recommendations",
            Page::Filters => "Filters",
            Page::DataView => "Data View",
            Page::Conclusion => "Conclusion & Insights",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::MarketOverview => "market-overview",
            Page::SalaryExperience => "salary-experience",
            Page::DemandKpis => "demand-kpis",
            Page::Forecasting => "forecasting",
            Page::SkillsRecommendations => "skills-recommendations",
            Page::Filters => "filters",
            Page::DataView => "data-view",
            Page::Conclusion => "conclusion",
        }
    }

    /// Look a page up by slug or by its sidebar title (case-insensitive)
    pub fn from_slug(name: &str) -> Result<Self> {
        let wanted = name.trim();
        Page::ALL
            .iter()
            .copied()
            .find(|p| p.slug() == wanted || p.title().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DashboardError::UnknownPage(name.to_string()))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ============================================================================
// CONTEXT & VIEW
// ============================================================================

/// Interactive state passed into every render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub thresholds: Thresholds,
    pub rows_to_show: usize,
    pub export_file_name: String,
}

impl PageContext {
    /// Start-of-session state: sliders at their defaults
    pub fn for_records(records: &[Record]) -> Self {
        Self {
            thresholds: SliderBounds::from_records(records).defaults(),
            rows_to_show: ROWS_DEFAULT,
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

/// Slider positions requested from outside (query string, CLI flags)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlOverrides {
    pub min_experience: Option<u32>,
    pub min_salary: Option<f64>,
    pub min_demand: Option<f64>,
    pub rows: Option<usize>,
}

impl ControlOverrides {
    /// Requested thresholds, missing values taken from `defaults`
    pub fn thresholds(&self, defaults: Thresholds) -> Thresholds {
        Thresholds::new(
            self.min_experience.unwrap_or(defaults.min_experience),
            self.min_salary.unwrap_or(defaults.min_salary),
            self.min_demand.unwrap_or(defaults.min_demand),
        )
    }

    /// Apply onto `ctx`, pulling thresholds into the slider ranges of `records`
    pub fn apply(&self, ctx: &mut PageContext, records: &[Record]) {
        let bounds = SliderBounds::from_records(records);
        ctx.thresholds = bounds.clamp(&self.thresholds(ctx.thresholds));
        if let Some(rows) = self.rows {
            ctx.rows_to_show = rows;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    Integer,
    Decimal(u8),
}

/// One KPI tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: Statistic,
    pub format: MetricFormat,
}

impl Metric {
    /// Truncated toward zero, like an integer cast
    pub fn integer(label: &str, value: Statistic) -> Self {
        Self {
            label: label.to_string(),
            value: value.map(f64::trunc),
            format: MetricFormat::Integer,
        }
    }

    pub fn decimal(label: &str, value: Statistic, places: u8) -> Self {
        let factor = 10f64.powi(places as i32);
        Self {
            label: label.to_string(),
            value: value.map(|v| (v * factor).round() / factor),
            format: MetricFormat::Decimal(places),
        }
    }

    pub fn display(&self) -> String {
        match (self.value, self.format) {
            (Statistic::NoData, _) => "no data".to_string(),
            (Statistic::Value(v), MetricFormat::Integer) => format!("{}", v as i64),
            (Statistic::Value(v), MetricFormat::Decimal(places)) => {
                format!("{:.*}", places as usize, v)
            }
        }
    }
}

/// Heading plus paragraphs or bullet lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(heading: &str, lines: &[&str]) -> Self {
        Self {
            heading: heading.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Integer slider as offered to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    pub id: String,
    pub label: String,
    pub min: i64,
    pub max: i64,
    pub value: i64,
    pub step: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    pub label: String,
    pub file_name: String,
    pub mime: String,
}

/// Declarative content of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub page: Page,
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<Section>,
    pub controls: Vec<Slider>,
    pub metrics: Vec<Metric>,
    pub charts: Vec<ChartSpec>,
    pub table: Option<TableView>,
    pub download: Option<Download>,
    /// Closing note shown under the charts
    pub note: Option<String>,
}

impl PageView {
    fn new(page: Page, subtitle: &str) -> Self {
        Self {
            page,
            title: page.title().to_string(),
            subtitle: subtitle.to_string(),
            sections: Vec::new(),
            controls: Vec::new(),
            metrics: Vec::new(),
            charts: Vec::new(),
            table: None,
            download: None,
            note: None,
        }
    }

    pub fn metric(&self, label: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.label == label)
    }

    pub fn chart(&self, title: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.title == title)
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if !self.subtitle.is_empty() {
            writeln!(f, "{}", self.subtitle)?;
        }
        for section in &self.sections {
            writeln!(f, "\n## {}", section.heading)?;
            for line in &section.lines {
                writeln!(f, "  {}", line)?;
            }
        }
        for slider in &self.controls {
            writeln!(f, "\n[{}] {} ({}..={})", slider.label, slider.value, slider.min, slider.max)?;
        }
        if !self.metrics.is_empty() {
            writeln!(f)?;
            for metric in &self.metrics {
                writeln!(f, "  {:<36} {}", metric.label, metric.display())?;
            }
        }
        if !self.charts.is_empty() {
            writeln!(f)?;
            for chart in &self.charts {
                writeln!(f, "  [chart] {} ({} points)", chart.title, chart.point_count())?;
            }
        }
        if let Some(table) = &self.table {
            writeln!(f, "\n  [table] {} ({} rows)", table.title, table.records.len())?;
        }
        if let Some(download) = &self.download {
            writeln!(f, "\n  [download] {} -> {} ({})", download.label, download.file_name, download.mime)?;
        }
        if let Some(note) = &self.note {
            writeln!(f, "\n{}", note)?;
        }
        Ok(())
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Build the view of `page` from the table and the current context
pub fn render_page(page: Page, records: &[Record], ctx: &PageContext) -> PageView {
    debug!(page = page.slug(), rows = records.len(), "rendering page");
    match page {
        Page::Overview => overview(records),
        Page::MarketOverview => market_overview(records),
        Page::SalaryExperience => salary_experience(records),
        Page::DemandKpis => demand_kpis(records),
        Page::Forecasting => forecasting(records),
        Page::SkillsRecommendations => skills_recommendations(records),
        Page::Filters => filters(records, ctx),
        Page::DataView => data_view(records, ctx),
        Page::Conclusion => conclusion(),
    }
}

fn yearly_mean_salary(records: &[Record], title: &str) -> ChartSpec {
    let trend = group_by(records, Column::Year, Column::SalaryMedian, Agg::Mean);
    ChartSpec::new(ChartKind::Line, title)
        .x(Axis::column(Column::Year))
        .y(Axis::named(Column::SalaryMedian.name(), "Average Median Salary (CNY)"))
        .series(Series::from_pairs(Column::SalaryMedian.name(), &trend))
        .markers()
}

fn overview(records: &[Record]) -> PageView {
    let mut view = PageView::new(Page::Overview, "Professional Data Analytics Application");
    view.title = "Job Market Analytics Dashboard".to_string();

    view.sections.push(Section::new(
        "Project Introduction",
        &[
            "The Job Market Analytics Dashboard analyzes job market trends, salary patterns and demand indicators for the Chinese job market.",
            "It applies data visualization and exploratory data analysis to support data-driven decisions.",
        ],
    ));
    view.sections.push(Section::new(
        "Objectives",
        &[
            "Analyze salary trends across years and experience levels",
            "Study the relationship between demand index and job openings",
            "Visualize hiring patterns with interactive charts",
            "Apply data analytics concepts to a real-world scenario",
        ],
    ));
    view.sections.push(Section::new(
        "Dataset Overview",
        &[
            "Job salaries (minimum, median, maximum)",
            "Demand index of skills",
            "Number of job openings",
            "Experience levels",
            "Yearly trends",
        ],
    ));

    view.charts.push(yearly_mean_salary(records, "Average Median Salary Trend Over Time"));
    view.note = Some(
        "This dashboard provides detailed insights in the following sections using interactive analytics."
            .to_string(),
    );
    view
}

fn market_overview(records: &[Record]) -> PageView {
    let mut view = PageView::new(Page::MarketOverview, "High-level insights into the job market dynamics");

    view.charts.push(
        ChartSpec::new(ChartKind::Box, "Salary Distribution (Median Salary)")
            .y(Axis::column(Column::SalaryMedian))
            .series(Series::new(
                Column::SalaryMedian.name(),
                column_points(records, Column::SalaryMedian),
            )),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::Scatter, "Demand Index vs Job Openings")
            .x(Axis::column(Column::DemandIndex))
            .y(Axis::column(Column::JobOpenings))
            .series(Series::new(
                "records",
                record_points(records, Column::DemandIndex, Column::JobOpenings, Some(Column::SalaryMedian), None),
            ))
            .size_by(Column::SalaryMedian)
            .opacity(0.7),
    );

    view.charts.push(yearly_mean_salary(records, "Average Salary Trend Over Years"));

    let openings = group_by(records, Column::Year, Column::JobOpenings, Agg::Sum);
    view.charts.push(
        ChartSpec::new(ChartKind::Area, "Total Job Openings Over Time")
            .x(Axis::column(Column::Year))
            .y(Axis::column(Column::JobOpenings))
            .series(Series::from_pairs(Column::JobOpenings.name(), &openings)),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::Histogram, "Salary Density Distribution")
            .x(Axis::column(Column::SalaryMedian))
            .series(Series::new(
                Column::SalaryMedian.name(),
                column_points(records, Column::SalaryMedian),
            ))
            .nbins(40),
    );

    view
}

fn salary_experience(records: &[Record]) -> PageView {
    let mut view = PageView::new(
        Page::SalaryExperience,
        "Understanding salary behavior across experience, demand, and time",
    );
    view.sections.push(Section::new(
        "Analytical Overview",
        &["This section explores the relationship between salary levels, experience and market demand, and how compensation evolves with professional growth."],
    ));

    let mut impact = ChartSpec::new(ChartKind::Scatter, "Impact of Experience on Median Salary")
        .x(Axis::column(Column::ExperienceYears))
        .y(Axis::column(Column::SalaryMedian))
        .series(Series::new(
            "records",
            record_points(records, Column::ExperienceYears, Column::SalaryMedian, None, None),
        ))
        .trendline("ols");
    let xs = Column::ExperienceYears.values(records);
    let ys = Column::SalaryMedian.values(records);
    if let Some(fit) = linear_fit(&xs, &ys) {
        let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        impact = impact.series(Series::new(
            "ols",
            vec![Point::xy(lo, fit.predict(lo)), Point::xy(hi, fit.predict(hi))],
        ));
    }
    view.charts.push(impact);

    view.charts.push(
        ChartSpec::new(ChartKind::Scatter, "Salary Variation by Market Demand & Job Openings")
            .x(Axis::column(Column::DemandIndex))
            .y(Axis::column(Column::SalaryMedian))
            .series(Series::new(
                "records",
                record_points(
                    records,
                    Column::DemandIndex,
                    Column::SalaryMedian,
                    Some(Column::JobOpenings),
                    Some(Column::ExperienceYears),
                ),
            ))
            .size_by(Column::JobOpenings)
            .color_by(Column::ExperienceYears)
            .opacity(0.7),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::Violin, "Salary Distribution Across Experience Levels")
            .x(Axis::column(Column::ExperienceYears))
            .y(Axis::column(Column::SalaryMedian))
            .series(Series::new(
                "records",
                record_points(records, Column::ExperienceYears, Column::SalaryMedian, None, None),
            ))
            .box_overlay(),
    );

    let cells = group_by_pair(records, Column::Year, Column::ExperienceYears, Column::SalaryMedian, Agg::Mean);
    view.charts.push(
        ChartSpec::new(ChartKind::Heatmap, "Salary Growth Pattern Over Time & Experience")
            .x(Axis::column(Column::Year))
            .y(Axis::column(Column::ExperienceYears))
            .series(Series::new(Column::SalaryMedian.name(), cell_points(&cells))),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::DensityContour, "Density Distribution of Salary & Experience")
            .x(Axis::column(Column::SalaryMedian))
            .y(Axis::column(Column::ExperienceYears))
            .series(Series::new(
                "records",
                record_points(records, Column::SalaryMedian, Column::ExperienceYears, None, None),
            )),
    );

    let min_salary = group_by(records, Column::Year, Column::SalaryMin, Agg::Mean);
    let max_salary = group_by(records, Column::Year, Column::SalaryMax, Agg::Mean);
    view.charts.push(
        ChartSpec::new(ChartKind::Line, "Salary Range Volatility Over Time")
            .x(Axis::column(Column::Year))
            .y(Axis::named("value", "Salary (CNY)"))
            .series(Series::from_pairs("min_salary", &min_salary))
            .series(Series::from_pairs("max_salary", &max_salary)),
    );

    view
}

fn demand_kpis(records: &[Record]) -> PageView {
    let mut view = PageView::new(
        Page::DemandKpis,
        "Key performance indicators and demand-driven market insights",
    );
    view.sections.push(Section::new(
        "Page Overview",
        &["This section focuses on job demand indicators and summarizes the market with key performance indicators covering market intensity, hiring trends and salary behavior."],
    ));

    view.metrics = vec![
        Metric::decimal("Avg Demand Index", column_mean(records, Column::DemandIndex).into(), 2),
        Metric::integer(
            "Total Job Openings",
            Statistic::Value(column_sum(records, Column::JobOpenings)),
        ),
        Metric::integer("Avg Median Salary (CNY)", column_mean(records, Column::SalaryMedian).into()),
        Metric::decimal("Avg Experience (Years)", column_mean(records, Column::ExperienceYears).into(), 1),
    ];

    view.charts.push(
        ChartSpec::new(ChartKind::Histogram, "Distribution of Market Demand Index")
            .x(Axis::column(Column::DemandIndex))
            .series(Series::new(
                Column::DemandIndex.name(),
                column_points(records, Column::DemandIndex),
            ))
            .nbins(35),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::Scatter, "Relationship Between Demand Index and Salary Levels")
            .x(Axis::column(Column::DemandIndex))
            .y(Axis::column(Column::SalaryMedian))
            .series(Series::new(
                "records",
                record_points(records, Column::DemandIndex, Column::SalaryMedian, None, Some(Column::ExperienceYears)),
            ))
            .color_by(Column::ExperienceYears)
            .opacity(0.7),
    );

    let demand_jobs = group_by(records, Column::DemandIndex, Column::JobOpenings, Agg::Sum);
    view.charts.push(
        ChartSpec::new(ChartKind::Area, "Job Openings Across Demand Levels")
            .x(Axis::column(Column::DemandIndex))
            .y(Axis::column(Column::JobOpenings))
            .series(Series::from_pairs(Column::JobOpenings.name(), &demand_jobs)),
    );

    let demand_trend = group_by(records, Column::Year, Column::DemandIndex, Agg::Mean);
    view.charts.push(
        ChartSpec::new(ChartKind::Line, "Average Demand Index Trend Over Time")
            .x(Axis::column(Column::Year))
            .y(Axis::column(Column::DemandIndex))
            .series(Series::from_pairs(Column::DemandIndex.name(), &demand_trend))
            .markers(),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::Heatmap, "Density Pattern of Demand Index vs Experience")
            .x(Axis::column(Column::ExperienceYears))
            .y(Axis::column(Column::DemandIndex))
            .series(Series::new(
                "records",
                record_points(records, Column::ExperienceYears, Column::DemandIndex, None, None),
            )),
    );

    view
}

/// Insight lines closing the forecasting page
const INSIGHTS: [&str; 5] = [
    "Median salaries are expected to increase by ~5% next year based on historical trends.",
    "Total job openings are projected to grow by 8%, indicating a robust hiring market.",
    "Skills with the highest demand index should be prioritized for career growth.",
    "Experience continues to play a major role in salary progression across years.",
    "Predictive insights can guide both job seekers and employers in strategic planning.",
];

fn forecasting(records: &[Record]) -> PageView {
    let mut view = PageView::new(
        Page::Forecasting,
        "Future trends, predictive analysis, and actionable insights",
    );
    view.sections.push(Section::new(
        "Page Overview",
        &["This section projects next-year salaries and job openings from historical aggregates using fixed growth rates."],
    ));

    view.metrics = vec![
        Metric::integer("Projected Avg Salary (Next Year)", projected_salary(records)),
        Metric::integer("Projected Job Openings", Statistic::Value(projected_openings(records))),
        Metric::decimal("High-Demand Skill Index", column_max(records, Column::DemandIndex).into(), 2),
        Metric::integer("Insights Count", Statistic::Value(INSIGHTS.len() as f64)),
    ];

    let salary = salary_forecast_by_year(records);
    view.charts.push(
        ChartSpec::new(ChartKind::Line, "Historical vs Forecasted Median Salary")
            .x(Axis::column(Column::Year))
            .y(Axis::named("value", "Median Salary (CNY)"))
            .series(Series::new(
                Column::SalaryMedian.name(),
                salary.iter().map(|p| Point::xy(p.key, p.historical)).collect(),
            ))
            .series(Series::new(
                "forecast",
                salary.iter().map(|p| Point::xy(p.key, p.forecast)).collect(),
            ))
            .markers(),
    );

    let openings = openings_forecast_by_year(records);
    view.charts.push(
        ChartSpec::new(ChartKind::Bar, "Historical Job Openings with Forecast")
            .x(Axis::column(Column::Year))
            .y(Axis::column(Column::JobOpenings))
            .series(Series::new(
                Column::JobOpenings.name(),
                openings
                    .iter()
                    .map(|p| Point {
                        text: Some(format!("{}", p.forecast)),
                        ..Point::xy(p.key, p.historical)
                    })
                    .collect(),
            ))
            .text_by("forecast"),
    );

    let radar = group_by(records, Column::DemandIndex, Column::JobOpenings, Agg::Sum);
    view.charts.push(
        ChartSpec::new(ChartKind::Polar, "Skill Demand Radar")
            .x(Axis::column(Column::DemandIndex))
            .y(Axis::column(Column::JobOpenings))
            .series(Series::from_pairs(Column::JobOpenings.name(), &radar))
            .line_close()
            .markers(),
    );

    let cells = salary_forecast_by_year_and_experience(records);
    view.charts.push(
        ChartSpec::new(ChartKind::Heatmap, "Forecasted Salary by Experience & Year")
            .x(Axis::column(Column::Year))
            .y(Axis::column(Column::ExperienceYears))
            .series(Series::new("forecast", cell_points(&cells))),
    );

    view.sections.push(Section::new("Key Insights", &INSIGHTS));
    view
}

fn skills_recommendations(records: &[Record]) -> PageView {
    let mut view = PageView::new(
        Page::SkillsRecommendations,
        "Identify high-demand skills and suitable job roles",
    );
    view.sections.push(Section::new(
        "Page Overview",
        &["This page highlights the most in-demand skills, their associated salaries, and suitable roles based on market demand and experience."],
    ));

    let top = column_max(records, Column::DemandIndex);
    let top_rows: Vec<Record> = match top {
        Ok(max) => records.iter().filter(|r| r.demand_index == max).cloned().collect(),
        Err(_) => Vec::new(),
    };

    view.metrics = vec![
        Metric::decimal("Top Skill Demand Index", top.into(), 2),
        Metric::integer(
            "Jobs Requiring Top Skill",
            Statistic::Value(column_sum(&top_rows, Column::JobOpenings)),
        ),
        Metric::integer(
            "Avg Salary for Top Skill (CNY)",
            column_mean(&top_rows, Column::SalaryMedian).into(),
        ),
        Metric::decimal(
            "Avg Experience Required",
            column_mean(&top_rows, Column::ExperienceYears).into(),
            1,
        ),
    ];

    let mut by_demand = group_by(records, Column::DemandIndex, Column::SalaryMedian, Agg::Mean);
    by_demand.reverse();
    view.charts.push(
        ChartSpec::new(ChartKind::Bar, "Top Skill Demand vs Avg Salary")
            .x(Axis::named(Column::DemandIndex.name(), "Demand Index"))
            .y(Axis::named(Column::SalaryMedian.name(), "Avg Salary (CNY)"))
            .series(Series::new(
                Column::SalaryMedian.name(),
                by_demand
                    .iter()
                    .map(|(x, y)| Point {
                        text: Some(format!("{}", y)),
                        ..Point::xy(*x, *y)
                    })
                    .collect(),
            ))
            .text_by(Column::SalaryMedian.name()),
    );

    view.charts.push(
        ChartSpec::new(ChartKind::Scatter, "Experience vs Skill Demand & Salary")
            .x(Axis::column(Column::ExperienceYears))
            .y(Axis::column(Column::DemandIndex))
            .series(Series::new(
                "records",
                record_points(
                    records,
                    Column::ExperienceYears,
                    Column::DemandIndex,
                    Some(Column::JobOpenings),
                    Some(Column::SalaryMedian),
                ),
            ))
            .size_by(Column::JobOpenings)
            .color_by(Column::SalaryMedian)
            .opacity(0.7),
    );

    view.table = Some(TableView {
        title: "Recommended Jobs Based on High Demand Skills".to_string(),
        columns: vec![
            Column::ExperienceYears,
            Column::SalaryMedian,
            Column::DemandIndex,
            Column::JobOpenings,
        ],
        records: recommended_jobs(records),
    });

    view.sections.push(Section::new(
        "Key Takeaways",
        &[
            "Focus on the highest demand skills to maximize job opportunities.",
            "Salaries increase significantly with experience in high-demand roles.",
            "Prioritize skill development in areas with high demand index.",
            "Job openings are concentrated among the top 25% high-demand skills.",
            "Use these insights for career planning and upskilling strategy.",
        ],
    ));
    view
}

/// Rows at or above the 75th percentile of demand, highest demand first
pub fn recommended_jobs(records: &[Record]) -> Vec<Record> {
    let cutoff = match quantile(&Column::DemandIndex.values(records), 0.75) {
        Ok(q) => q,
        Err(_) => return Vec::new(),
    };
    let mut rows = filter_by_minimums(records, &[(Column::DemandIndex, cutoff)]);
    rows.sort_by(|a, b| b.demand_index.total_cmp(&a.demand_index));
    rows
}

fn filters(records: &[Record], ctx: &PageContext) -> PageView {
    let mut view = PageView::new(Page::Filters, "Interactive Filters");

    let bounds = SliderBounds::from_records(records);
    let t = ctx.thresholds;
    view.controls = vec![
        Slider {
            id: "min_experience".to_string(),
            label: "Minimum Experience (Years)".to_string(),
            min: bounds.experience.min,
            max: bounds.experience.max,
            value: t.min_experience as i64,
            step: 1,
        },
        Slider {
            id: "min_salary".to_string(),
            label: "Minimum Median Salary (CNY)".to_string(),
            min: bounds.salary.min,
            max: bounds.salary.max,
            value: t.min_salary as i64,
            step: 1,
        },
        Slider {
            id: "min_demand".to_string(),
            label: "Minimum Demand Index".to_string(),
            min: bounds.demand.min,
            max: bounds.demand.max,
            value: t.min_demand as i64,
            step: 1,
        },
    ];

    let filtered = apply_filter(records, &t);

    view.metrics = vec![
        Metric::integer("Total Jobs", Statistic::Value(filtered.summary.count as f64)),
        Metric::integer("Avg Salary (CNY)", filtered.summary.mean_salary),
        Metric::decimal("Avg Demand Index", filtered.summary.mean_demand, 2),
    ];

    view.charts.push(
        ChartSpec::new(ChartKind::Scatter, "Filtered Jobs: Salary vs Experience")
            .x(Axis::column(Column::ExperienceYears))
            .y(Axis::column(Column::SalaryMedian))
            .series(Series::new(
                "records",
                record_points(
                    &filtered.records,
                    Column::ExperienceYears,
                    Column::SalaryMedian,
                    Some(Column::JobOpenings),
                    Some(Column::DemandIndex),
                ),
            ))
            .size_by(Column::JobOpenings)
            .color_by(Column::DemandIndex),
    );

    view.table = Some(TableView {
        title: "Filtered Data".to_string(),
        columns: Column::ALL.to_vec(),
        records: filtered.records,
    });

    if filtered.summary.is_empty() {
        view.note = Some("No records match the current filters.".to_string());
    }
    view
}

/// Nearest slider step, kept inside `[min, max]`
fn snap_rows(rows: usize, min: usize, max: usize) -> usize {
    let snapped = (rows + ROWS_STEP / 2) / ROWS_STEP * ROWS_STEP;
    snapped.clamp(min, max)
}

fn data_view(records: &[Record], ctx: &PageContext) -> PageView {
    let mut view = PageView::new(Page::DataView, "Interactive view of the raw job market dataset");
    view.sections.push(Section::new(
        "Page Overview",
        &["This page provides an interactive table of the job market dataset."],
    ));

    let max = records.len();
    let min = ROWS_MIN.min(max);
    let rows = snap_rows(ctx.rows_to_show, min, max);
    view.controls.push(Slider {
        id: "rows".to_string(),
        label: "Select number of rows to display".to_string(),
        min: min as i64,
        max: max as i64,
        value: rows as i64,
        step: ROWS_STEP as i64,
    });

    view.table = Some(TableView {
        title: "Job Market Data".to_string(),
        columns: Column::ALL.to_vec(),
        records: records.iter().take(rows).cloned().collect(),
    });

    view.download = Some(Download {
        label: "Download Dataset as CSV".to_string(),
        file_name: ctx.export_file_name.clone(),
        mime: EXPORT_MIME.to_string(),
    });
    view
}

fn conclusion() -> PageView {
    let mut view = PageView::new(
        Page::Conclusion,
        "Key takeaways and recommendations from the job market analysis",
    );
    view.sections.push(Section::new(
        "Summary of Findings",
        &[
            "Salary Trends: median salaries show a steady increase over the years; experience strongly impacts compensation.",
            "Job Demand: high-demand skills correspond to higher salaries and more job openings.",
            "KPIs: average demand index, job openings and experience provide actionable insights for career planning.",
            "Forecasting: projected salary growth and job openings indicate a positive trend in the job market.",
            "Skill Focus: prioritizing high-demand skills enhances career opportunities and market competitiveness.",
        ],
    ));
    view.sections.push(Section::new(
        "Recommendations",
        &[
            "Focus on acquiring high-demand skills identified in the market.",
            "Target roles with growing job openings for better career prospects.",
            "Use projections to plan career path and salary growth.",
            "Monitor market trends continuously with dashboards.",
            "Upskill in areas with high demand index and low experience threshold.",
        ],
    ));
    view.sections.push(Section::new(
        "Final Note",
        &["Combining historical analysis, KPIs, forecasting and skill recommendations, the dashboard supports job seekers, HR professionals and decision-makers."],
    ));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_records;

    fn default_ctx(records: &[Record]) -> PageContext {
        PageContext::for_records(records)
    }

    #[test]
    fn test_overrides_fill_and_clamp() {
        let records = sample_records();
        let mut ctx = default_ctx(&records);
        let overrides = ControlOverrides {
            min_experience: Some(2),
            min_demand: Some(500.0),
            rows: Some(10),
            ..Default::default()
        };
        overrides.apply(&mut ctx, &records);

        assert_eq!(ctx.thresholds.min_experience, 2);
        assert_eq!(ctx.thresholds.min_salary, 9000.0);
        assert_eq!(ctx.thresholds.min_demand, 80.0);
        assert_eq!(ctx.rows_to_show, 10);

        // Unclamped form keeps the raw request
        let raw = overrides.thresholds(Thresholds::default());
        assert_eq!(raw.min_demand, 500.0);
        assert_eq!(raw.min_salary, 0.0);
    }

    #[test]
    fn test_fractional_salary_override_keeps_filter_result() {
        let records = sample_records();
        let mut ctx = default_ctx(&records);
        let overrides = ControlOverrides {
            min_salary: Some(9000.5),
            ..Default::default()
        };
        overrides.apply(&mut ctx, &records);
        assert_eq!(ctx.thresholds.min_salary, 9001.0);

        let raw = overrides.thresholds(default_ctx(&records).thresholds);
        let expected = apply_filter(&records, &raw).records.len();
        assert_eq!(expected, 40);

        let view = render_page(Page::Filters, &records, &ctx);
        assert_eq!(view.metric("Total Jobs").unwrap().display(), "40");
        assert_eq!(view.table.unwrap().records.len(), expected);
    }

    #[test]
    fn test_page_navigation_wraps() {
        assert_eq!(Page::Overview.next(), Page::MarketOverview);
        assert_eq!(Page::Conclusion.next(), Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Conclusion);

        let mut page = Page::Filters;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Filters);
    }

    #[test]
    fn test_page_lookup() {
        for page in Page::ALL {
            assert_eq!(Page::from_slug(page.slug()).unwrap(), page);
            assert_eq!(Page::from_slug(page.title()).unwrap(), page);
        }
        assert_eq!(Page::from_slug("data view").unwrap(), Page::DataView);
        assert!(matches!(
            Page::from_slug("nowhere"),
            Err(DashboardError::UnknownPage(_))
        ));
    }

    #[test]
    fn test_every_page_renders() {
        let records = sample_records();
        let ctx = default_ctx(&records);
        for page in Page::ALL {
            let view = render_page(page, &records, &ctx);
            assert_eq!(view.page, page);
            assert!(!view.title.is_empty());
            assert!(!view.to_string().is_empty());
        }
    }

    #[test]
    fn test_overview_trend() {
        let records = sample_records();
        let view = render_page(Page::Overview, &records, &default_ctx(&records));
        let chart = view.chart("Average Median Salary Trend Over Time").unwrap();
        assert_eq!(chart.kind, ChartKind::Line);
        assert!(chart.options.markers);
        assert_eq!(chart.series[0].ys(), vec![9000.0, 9500.0, 10000.0, 11000.0, 12000.0]);
    }

    #[test]
    fn test_demand_kpis() {
        let records = sample_records();
        let view = render_page(Page::DemandKpis, &records, &default_ctx(&records));

        assert_eq!(view.metric("Avg Demand Index").unwrap().display(), "70.00");
        assert_eq!(view.metric("Total Job Openings").unwrap().display(), "9100");
        assert_eq!(view.metric("Avg Median Salary (CNY)").unwrap().display(), "10300");
        assert_eq!(view.metric("Avg Experience (Years)").unwrap().display(), "2.2");
        assert_eq!(
            view.chart("Distribution of Market Demand Index").unwrap().options.nbins,
            Some(35)
        );
    }

    #[test]
    fn test_forecasting_kpis() {
        let records = sample_records();
        let view = render_page(Page::Forecasting, &records, &default_ctx(&records));

        assert_eq!(view.metric("Projected Avg Salary (Next Year)").unwrap().display(), "10815");
        assert_eq!(view.metric("Projected Job Openings").unwrap().display(), "9828");
        assert_eq!(view.metric("High-Demand Skill Index").unwrap().display(), "80.00");
        assert_eq!(view.metric("Insights Count").unwrap().display(), "5");

        let chart = view.chart("Historical vs Forecasted Median Salary").unwrap();
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[1].name, "forecast");
    }

    #[test]
    fn test_salary_experience_trendline() {
        let records = sample_records();
        let view = render_page(Page::SalaryExperience, &records, &default_ctx(&records));
        let chart = view.chart("Impact of Experience on Median Salary").unwrap();

        assert_eq!(chart.options.trendline.as_deref(), Some("ols"));
        assert_eq!(chart.series.len(), 2);
        let line = &chart.series[1];
        assert_eq!(line.xs(), vec![0.0, 5.0]);
        assert!(line.points[1].y > line.points[0].y);
    }

    #[test]
    fn test_skills_recommendations() {
        let records = sample_records();
        let view = render_page(Page::SkillsRecommendations, &records, &default_ctx(&records));

        assert_eq!(view.metric("Top Skill Demand Index").unwrap().display(), "80.00");
        assert_eq!(view.metric("Jobs Requiring Top Skill").unwrap().display(), "2500");
        assert_eq!(view.metric("Avg Salary for Top Skill (CNY)").unwrap().display(), "12000");
        assert_eq!(view.metric("Avg Experience Required").unwrap().display(), "5.0");

        let table = view.table.unwrap();
        assert_eq!(table.records.len(), 20);
        assert!(table.records[..10].iter().all(|r| r.demand_index == 80.0));
        assert!(table.records[10..].iter().all(|r| r.demand_index == 75.0));
    }

    #[test]
    fn test_filters_page_scenario() {
        let records = sample_records();
        let mut ctx = default_ctx(&records);
        ctx.thresholds = Thresholds::new(2, 9000.0, 70.0);

        let view = render_page(Page::Filters, &records, &ctx);

        assert_eq!(view.metric("Total Jobs").unwrap().display(), "30");
        assert_eq!(view.metric("Avg Salary (CNY)").unwrap().display(), "11000");
        assert_eq!(view.metric("Avg Demand Index").unwrap().display(), "75.00");
        assert_eq!(view.table.as_ref().unwrap().records.len(), 30);
        assert_eq!(view.controls.len(), 3);
        assert!(view.note.is_none());
    }

    #[test]
    fn test_filters_page_no_data() {
        let records = sample_records();
        let mut ctx = default_ctx(&records);
        ctx.thresholds = Thresholds::new(5, 12000.0, 81.0);

        let view = render_page(Page::Filters, &records, &ctx);

        assert_eq!(view.metric("Total Jobs").unwrap().display(), "0");
        assert_eq!(view.metric("Avg Salary (CNY)").unwrap().display(), "no data");
        assert_eq!(view.metric("Avg Demand Index").unwrap().display(), "no data");
        assert_eq!(view.charts[0].point_count(), 0);
        assert!(view.note.is_some());
    }

    #[test]
    fn test_data_view_rows_and_download() {
        let records = sample_records();
        let mut ctx = default_ctx(&records);

        let view = render_page(Page::DataView, &records, &ctx);
        assert_eq!(view.table.as_ref().unwrap().records.len(), 20);
        let download = view.download.unwrap();
        assert_eq!(download.file_name, "job_market_data.csv");
        assert_eq!(download.mime, "text/csv");

        ctx.rows_to_show = 500;
        let view = render_page(Page::DataView, &records, &ctx);
        assert_eq!(view.table.unwrap().records.len(), 50);

        ctx.rows_to_show = 1;
        let view = render_page(Page::DataView, &records, &ctx);
        assert_eq!(view.table.unwrap().records.len(), 5);
    }

    #[test]
    fn test_data_view_rows_snap_to_step() {
        let records = sample_records();
        let mut ctx = default_ctx(&records);

        for (requested, shown) in [(7, 5), (8, 10), (12, 10), (13, 15), (48, 50)] {
            ctx.rows_to_show = requested;
            let view = render_page(Page::DataView, &records, &ctx);
            assert_eq!(view.table.unwrap().records.len(), shown, "rows={}", requested);
            assert_eq!(view.controls[0].value, shown as i64);
        }

        // Tables shorter than one step show everything
        let short = &records[..3];
        let ctx = PageContext::for_records(short);
        let view = render_page(Page::DataView, short, &ctx);
        assert_eq!(view.table.unwrap().records.len(), 3);
    }

    #[test]
    fn test_pages_render_on_empty_table() {
        let ctx = PageContext::for_records(&[]);
        for page in Page::ALL {
            let view = render_page(page, &[], &ctx);
            assert_eq!(view.page, page);
        }
        let view = render_page(Page::DemandKpis, &[], &ctx);
        assert_eq!(view.metric("Avg Demand Index").unwrap().display(), "no data");
    }

    #[test]
    fn test_page_view_serializes() {
        let records = sample_records();
        let view = render_page(Page::MarketOverview, &records, &default_ctx(&records));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["page"], "market-overview");
        assert_eq!(json["charts"].as_array().unwrap().len(), 5);
    }
}
