use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use job_market_dashboard::{
    export_csv, five_number_summary, histogram, render_page, ChartKind, ChartSpec, Column, Config,
    Metric, Page, PageContext, PageView, Point, Record, SliderBounds, TableView,
};
use job_market_dashboard::pages::{ROWS_MIN, ROWS_STEP};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis as ChartAxis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, List,
        ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::path::{Path, PathBuf};

/// Salary slider moves this many CNY per key press
const SALARY_KEY_STEP: i64 = 250;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

pub struct App {
    pub records: Vec<Record>,
    pub ctx: PageContext,
    /// Slider positions at session start
    pub initial_ctx: PageContext,
    pub bounds: SliderBounds,
    pub current_page: Page,
    pub view: PageView,
    pub sidebar_title: String,
    pub sidebar_state: ListState,
    pub table_state: TableState,
    pub selected_control: usize,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(records: Vec<Record>, config: &Config) -> Self {
        let ctx = config.page_context(&records);
        let bounds = SliderBounds::from_records(&records);
        let current_page = Page::Overview;
        let view = render_page(current_page, &records, &ctx);

        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));

        let mut app = Self {
            records,
            initial_ctx: ctx.clone(),
            ctx,
            bounds,
            current_page,
            view,
            sidebar_title: config.general.title.clone(),
            sidebar_state,
            table_state: TableState::default(),
            selected_control: 0,
            status_message: None,
        };
        app.reset_table_selection();
        app
    }

    /// Recompute the current page from the table and the slider state
    pub fn refresh(&mut self) {
        self.view = render_page(self.current_page, &self.records, &self.ctx);
        let len = self.table_len();
        match self.table_state.selected() {
            Some(i) if i < len => {}
            _ => self.reset_table_selection(),
        }
    }

    pub fn select_page(&mut self, page: Page) {
        self.current_page = page;
        self.sidebar_state
            .select(Page::ALL.iter().position(|p| *p == page));
        self.selected_control = 0;
        self.status_message = None;
        self.table_state.select(None);
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.select_page(self.current_page.next());
    }

    pub fn previous_page(&mut self) {
        self.select_page(self.current_page.previous());
    }

    pub fn next_control(&mut self) {
        let len = self.view.controls.len();
        if len > 0 {
            self.selected_control = (self.selected_control + 1) % len;
        }
    }

    pub fn previous_control(&mut self) {
        let len = self.view.controls.len();
        if len > 0 {
            self.selected_control = (self.selected_control + len - 1) % len;
        }
    }

    /// Move the focused slider by `steps` key presses
    pub fn adjust(&mut self, steps: i64) {
        match self.current_page {
            Page::Filters => {
                let t = &mut self.ctx.thresholds;
                match self.selected_control {
                    0 => {
                        let value = t.min_experience as i64 + steps;
                        t.min_experience = self.bounds.experience.clamp(value).max(0) as u32;
                    }
                    1 => {
                        let value = t.min_salary as i64 + steps * SALARY_KEY_STEP;
                        t.min_salary = self.bounds.salary.clamp(value) as f64;
                    }
                    _ => {
                        let value = t.min_demand as i64 + steps;
                        t.min_demand = self.bounds.demand.clamp(value) as f64;
                    }
                }
            }
            Page::DataView => {
                let max = self.records.len() as i64;
                let min = (ROWS_MIN as i64).min(max);
                let rows = self.ctx.rows_to_show as i64 + steps * ROWS_STEP as i64;
                self.ctx.rows_to_show = rows.clamp(min, max) as usize;
            }
            _ => return,
        }
        self.refresh();
    }

    /// Put every slider back at its start position
    pub fn reset_controls(&mut self) {
        self.ctx = self.initial_ctx.clone();
        self.refresh();
    }

    /// Write the full table to `dir`, named like the web download
    pub fn export_to(&mut self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.ctx.export_file_name);
        let rows = export_csv(&path, &self.records)?;
        self.status_message = Some(format!("Exported {} rows to {}", rows, path.display()));
        Ok(path)
    }

    fn table_len(&self) -> usize {
        self.view.table.as_ref().map(|t| t.records.len()).unwrap_or(0)
    }

    fn reset_table_selection(&mut self) {
        if self.table_len() > 0 {
            self.table_state.select(Some(0));
        } else {
            self.table_state.select(None);
        }
    }

    pub fn next(&mut self) {
        let len = self.table_len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.table_len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.table_len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 10).min(len - 1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.table_state.selected() {
            Some(i) => i.saturating_sub(10),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn has_controls(&self) -> bool {
        !self.view.controls.is_empty()
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    if let Some(page) = Page::ALL.get(index) {
                        app.select_page(*page);
                    }
                }
                KeyCode::Left | KeyCode::Char('h') => app.adjust(-1),
                KeyCode::Right | KeyCode::Char('l') => app.adjust(1),
                KeyCode::Char('[') => app.previous_control(),
                KeyCode::Char(']') => app.next_control(),
                KeyCode::Char('c') => app.reset_controls(),
                KeyCode::Char('e') if app.view.download.is_some() => {
                    if let Err(err) = app.export_to(Path::new(".")) {
                        app.status_message = Some(format!("Export failed: {}", err));
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => {
                    if app.table_len() > 0 {
                        app.table_state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    let len = app.table_len();
                    if len > 0 {
                        app.table_state.select(Some(len - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Page title
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app);
    render_content(f, body[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            app.view.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(app.view.subtitle.clone(), Style::default().fg(Color::DarkGray)),
        Span::raw("  |  "),
        Span::styled(
            format!("Rows: {}", app.records.len()),
            Style::default().fg(Color::White),
        ),
    ];

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let style = if *page == app.current_page {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(page.title(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", app.sidebar_title)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(list, area, &mut app.sidebar_state);
}

fn render_content(f: &mut Frame, area: Rect, app: &mut App) {
    let view = &app.view;
    let section_lines: usize = view.sections.iter().map(|s| s.lines.len() + 1).sum();

    let mut constraints = Vec::new();
    if !view.controls.is_empty() {
        constraints.push(Constraint::Length(view.controls.len() as u16 + 2));
    }
    if !view.sections.is_empty() {
        if view.charts.is_empty() && view.table.is_none() {
            constraints.push(Constraint::Min(0));
        } else {
            constraints.push(Constraint::Length((section_lines as u16 + 2).min(10)));
        }
    }
    if !view.metrics.is_empty() {
        constraints.push(Constraint::Length(4));
    }
    if !view.charts.is_empty() {
        constraints.push(Constraint::Min(12));
    }
    if view.table.is_some() {
        if view.charts.is_empty() {
            constraints.push(Constraint::Min(0));
        } else {
            constraints.push(Constraint::Percentage(35));
        }
    }
    if view.note.is_some() {
        constraints.push(Constraint::Length(3));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    let mut next = chunks.iter().copied();

    if app.has_controls() {
        if let Some(area) = next.next() {
            render_controls(f, area, app);
        }
    }
    if !app.view.sections.is_empty() {
        if let Some(area) = next.next() {
            render_sections(f, area, &app.view);
        }
    }
    if !app.view.metrics.is_empty() {
        if let Some(area) = next.next() {
            render_metrics(f, area, &app.view.metrics);
        }
    }
    if !app.view.charts.is_empty() {
        if let Some(area) = next.next() {
            render_charts(f, area, &app.view.charts);
        }
    }
    if app.view.table.is_some() {
        if let Some(area) = next.next() {
            render_table(f, area, app);
        }
    }
    if let Some(note) = &app.view.note {
        if let Some(area) = next.next() {
            let paragraph = Paragraph::new(Span::styled(
                note.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ))
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(paragraph, area);
        }
    }
}

fn render_controls(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .view
        .controls
        .iter()
        .enumerate()
        .map(|(i, slider)| {
            let focused = i == app.selected_control;
            let marker = if focused {
                Span::styled("→ ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                Span::raw("  ")
            };
            Line::from(vec![
                marker,
                Span::styled(format!("{:<30}", slider.label), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {} ", slider.min)),
                Span::styled(
                    slider_bar(slider.min, slider.max, slider.value, 24),
                    Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray }),
                ),
                Span::raw(format!(" {}  ", slider.max)),
                Span::styled(
                    slider.value.to_string(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Controls (←/→ adjust, [/] select, c reset) "),
    );
    f.render_widget(paragraph, area);
}

fn slider_bar(min: i64, max: i64, value: i64, width: usize) -> String {
    let filled = if max > min {
        (((value - min) as f64 / (max - min) as f64) * width as f64).round() as usize
    } else {
        width
    };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "─".repeat(width - filled))
}

fn render_sections(f: &mut Frame, area: Rect, view: &PageView) {
    let mut lines = Vec::new();
    for section in &view.sections {
        lines.push(Line::from(Span::styled(
            section.heading.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for line in &section.lines {
            lines.push(Line::from(format!("  • {}", line)));
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        );
    f.render_widget(paragraph, area);
}

fn render_metrics(f: &mut Frame, area: Rect, metrics: &[Metric]) {
    let constraints: Vec<Constraint> = metrics
        .iter()
        .map(|_| Constraint::Ratio(1, metrics.len() as u32))
        .collect();
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (metric, tile) in metrics.iter().zip(tiles.iter()) {
        let value_style = if metric.value.is_no_data() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };
        let paragraph = Paragraph::new(Span::styled(metric.display(), value_style)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", metric.label)),
        );
        f.render_widget(paragraph, *tile);
    }
}

// ============================================================================
// CHARTS
// ============================================================================

fn render_charts(f: &mut Frame, area: Rect, charts: &[ChartSpec]) {
    let columns = if charts.len() > 1 { 2 } else { 1 };
    let rows = charts.len().div_ceil(columns);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            (0..rows)
                .map(|_| Constraint::Ratio(1, rows as u32))
                .collect::<Vec<_>>(),
        )
        .split(area);

    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                (0..columns)
                    .map(|_| Constraint::Ratio(1, columns as u32))
                    .collect::<Vec<_>>(),
            )
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            if let Some(chart) = charts.get(row * columns + col) {
                render_chart(f, *cell, chart);
            }
        }
    }
}

fn render_chart(f: &mut Frame, area: Rect, chart: &ChartSpec) {
    match chart.kind {
        ChartKind::Line | ChartKind::Area | ChartKind::Scatter | ChartKind::DensityContour => {
            render_xy_chart(f, area, chart)
        }
        ChartKind::Bar | ChartKind::Polar => render_bar_chart(f, area, chart, category_bars(chart)),
        ChartKind::Histogram => {
            let width = area.width.saturating_sub(2) as usize;
            let nbins = chart.options.nbins.unwrap_or(10).min(width / 2).max(1);
            render_bar_chart(f, area, chart, histogram_bars(chart, nbins))
        }
        ChartKind::Box | ChartKind::Violin => render_summary(f, area, chart),
        ChartKind::Heatmap => render_heatmap(f, area, chart),
    }
}

fn chart_block(chart: &ChartSpec) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", chart.title))
}

fn all_points(chart: &ChartSpec) -> impl Iterator<Item = &Point> {
    chart.series.iter().flat_map(|s| s.points.iter())
}

/// Padded [min, max] of `values`; [0, 1] when there is nothing to show
fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if lo == hi {
        return [lo - 1.0, hi + 1.0];
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}

fn axis_labels(b: [f64; 2]) -> Vec<Span<'static>> {
    vec![
        Span::raw(format!("{:.0}", b[0])),
        Span::raw(format!("{:.0}", (b[0] + b[1]) / 2.0)),
        Span::raw(format!("{:.0}", b[1])),
    ]
}

fn render_xy_chart(f: &mut Frame, area: Rect, chart: &ChartSpec) {
    let data: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|s| s.points.iter().map(|p| (p.x, p.y)).collect())
        .collect();

    let graph_type = match chart.kind {
        ChartKind::Scatter | ChartKind::DensityContour => GraphType::Scatter,
        _ => GraphType::Line,
    };

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(&data)
        .enumerate()
        .map(|(i, (series, points))| {
            // Trend lines are drawn as lines even on scatter plots
            let graph_type = if Some(series.name.as_str()) == chart.options.trendline.as_deref() {
                GraphType::Line
            } else {
                graph_type
            };
            Dataset::default()
                .name(series.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(graph_type)
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                .data(points)
        })
        .collect();

    let x_bounds = bounds(all_points(chart).map(|p| p.x));
    let y_bounds = bounds(all_points(chart).map(|p| p.y));
    let x_title = chart.x.as_ref().map(|a| a.label.clone()).unwrap_or_default();
    let y_title = chart.y.as_ref().map(|a| a.label.clone()).unwrap_or_default();

    let widget = Chart::new(datasets)
        .block(chart_block(chart))
        .x_axis(
            ChartAxis::default()
                .title(x_title)
                .style(Style::default().fg(Color::DarkGray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            ChartAxis::default()
                .title(y_title)
                .style(Style::default().fg(Color::DarkGray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    f.render_widget(widget, area);
}

/// One bar per point, labelled by x; a second series is suffixed with its initial
fn category_bars(chart: &ChartSpec) -> Vec<(String, u64)> {
    let multi = chart.series.len() > 1;
    chart
        .series
        .iter()
        .flat_map(|series| {
            let suffix = if multi {
                series.name.chars().next().map(String::from).unwrap_or_default()
            } else {
                String::new()
            };
            series
                .points
                .iter()
                .map(move |p| (format!("{:.0}{}", p.x, suffix), p.y.max(0.0).round() as u64))
        })
        .collect()
}

fn histogram_bars(chart: &ChartSpec, nbins: usize) -> Vec<(String, u64)> {
    let values: Vec<f64> = all_points(chart).map(|p| p.y).collect();
    histogram(&values, nbins)
        .into_iter()
        .map(|bin| (format!("{:.0}", bin.start), bin.count as u64))
        .collect()
}

fn render_bar_chart(f: &mut Frame, area: Rect, chart: &ChartSpec, bars: Vec<(String, u64)>) {
    let data: Vec<(&str, u64)> = bars.iter().map(|(label, v)| (label.as_str(), *v)).collect();
    let inner = area.width.saturating_sub(2);
    let bar_width = (inner / data.len().max(1) as u16).saturating_sub(1).clamp(1, 9);

    let widget = BarChart::default()
        .block(chart_block(chart))
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(widget, area);
}

/// Points grouped by x, ascending
fn group_points_by_x<'a>(points: impl Iterator<Item = &'a Point>) -> Vec<(f64, Vec<f64>)> {
    let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();
    for p in points {
        match groups.iter_mut().find(|(x, _)| *x == p.x) {
            Some((_, ys)) => ys.push(p.y),
            None => groups.push((p.x, vec![p.y])),
        }
    }
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));
    groups
}

fn render_summary(f: &mut Frame, area: Rect, chart: &ChartSpec) {
    let groups = match chart.kind {
        ChartKind::Violin => group_points_by_x(all_points(chart)),
        _ => vec![(f64::NAN, all_points(chart).map(|p| p.y).collect())],
    };

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:>8} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "", "min", "q1", "median", "q3", "max"
        ),
        Style::default().fg(Color::Yellow),
    ))];

    for (x, ys) in &groups {
        let label = if x.is_nan() {
            "all".to_string()
        } else {
            format!("{:.0}", x)
        };
        let line = match five_number_summary(ys) {
            Ok(s) => format!(
                "{:>8} {:>9.0} {:>9.0} {:>9.0} {:>9.0} {:>9.0}",
                label, s.min, s.q1, s.median, s.q3, s.max
            ),
            Err(_) => format!("{:>8} no data", label),
        };
        lines.push(Line::from(line));
    }

    f.render_widget(Paragraph::new(lines).block(chart_block(chart)), area);
}

/// Grid of y rows by x columns; cells show z when present, else point counts
fn render_heatmap(f: &mut Frame, area: Rect, chart: &ChartSpec) {
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    for p in all_points(chart) {
        if !xs.contains(&p.x) {
            xs.push(p.x);
        }
        if !ys.contains(&p.y) {
            ys.push(p.y);
        }
    }
    xs.sort_by(f64::total_cmp);
    ys.sort_by(|a, b| b.total_cmp(a));

    let cell_value = |x: f64, y: f64| -> Option<f64> {
        let matching: Vec<&Point> = all_points(chart).filter(|p| p.x == x && p.y == y).collect();
        if matching.is_empty() {
            return None;
        }
        let zs: Vec<f64> = matching.iter().filter_map(|p| p.z).collect();
        if zs.is_empty() {
            Some(matching.len() as f64)
        } else {
            Some(zs.iter().sum::<f64>() / zs.len() as f64)
        }
    };

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(xs.iter().map(|x| Cell::from(format!("{:.0}", x))))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = ys.iter().map(|y| {
        let cells = std::iter::once(Cell::from(format!("{:.0}", y)).style(Style::default().fg(Color::Yellow)))
            .chain(xs.iter().map(|x| match cell_value(*x, *y) {
                Some(v) => Cell::from(format!("{:.0}", v)).style(Style::default().fg(Color::Green)),
                None => Cell::from("·").style(Style::default().fg(Color::DarkGray)),
            }))
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(6))
        .chain(xs.iter().map(|_| Constraint::Length(7)))
        .collect();

    let table = Table::new(rows, widths).header(header).block(chart_block(chart));
    f.render_widget(table, area);
}

// ============================================================================
// TABLE
// ============================================================================

fn format_cell(column: Column, record: &Record) -> String {
    let value = column.value(record);
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn table_widget(table: &TableView, download: bool) -> Table<'_> {
    let header_cells = table.columns.iter().map(|c| {
        Cell::from(c.label()).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = table.records.iter().map(|record| {
        let cells = table
            .columns
            .iter()
            .map(|c| Cell::from(format_cell(*c, record)))
            .collect::<Vec<_>>();
        Row::new(cells).height(1)
    });

    let widths: Vec<Constraint> = table.columns.iter().map(|_| Constraint::Length(18)).collect();

    let title = if download {
        format!(" {} ({} rows, e: export CSV) ", table.title, table.records.len())
    } else {
        format!(" {} ({} rows) ", table.title, table.records.len())
    };

    Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ")
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    if let Some(table) = &app.view.table {
        let widget = table_widget(table, app.view.download.is_some());
        f.render_stateful_widget(widget, area, &mut app.table_state);
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" Page: {}/{} ", page_number(app.current_page), Page::ALL.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.status_message {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
    }

    if app.table_len() > 0 {
        let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Row: {}/{}", selected, app.table_len()),
            Style::default().fg(Color::Cyan),
        ));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("1-9", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Jump | "));
    if app.has_controls() {
        status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Slider | "));
    }
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Rows | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn page_number(page: Page) -> usize {
    Page::ALL.iter().position(|p| *p == page).map(|i| i + 1).unwrap_or(1)
}
