//! Panel 2 (Forecast): horizon slider, model, and the price chart.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, LegendPosition, Paragraph};
use ratatui::Frame;

use stockcast_runner::config::{MAX_HORIZON_DAYS, MIN_HORIZON_DAYS};
use stockcast_runner::{BandPoint, ForecastChart};

use crate::app::AppState;
use crate::theme;
use crate::ui::widgets::Slider;

const Y_LABEL_COUNT: usize = 3;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_controls(f, chunks[0], app);

    match &app.run {
        Some(run) => render_chart(f, chunks[1], &run.chart, app.show_indicators),
        None => render_empty(f, chunks[1], app),
    }
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    f.render_widget(
        Slider::new("Horizon", app.horizon_days, MIN_HORIZON_DAYS, MAX_HORIZON_DAYS)
            .unit("days")
            .bar_width(usize::from(area.width / 3)),
        rows[0],
    );

    let overlay = if app.show_indicators { "on" } else { "off" };
    let mut spans = vec![
        Span::styled("Model ", theme::muted()),
        Span::styled(app.model.label(), theme::accent_bold()),
        Span::styled("  Indicators ", theme::muted()),
        Span::styled(overlay, theme::accent()),
        Span::styled(
            format!("  Interval {:.0}%", app.config.interval_width * 100.0),
            theme::muted(),
        ),
    ];
    if app.run_is_stale() {
        spans.push(Span::styled("  settings changed, Enter to rerun", theme::warning()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), rows[1]);

    if let Some(run) = &app.run {
        let s = &run.summary;
        let line = Line::from(vec![
            Span::styled("Last close ", theme::muted()),
            Span::styled(format!("{:.2}", s.last_close), theme::accent()),
            Span::styled(format!("  {} → ", s.forecast_end), theme::muted()),
            Span::styled(format!("{:.2}", s.final_point_estimate), theme::positive()),
            Span::styled(
                format!(" [{:.2}, {:.2}]", s.final_lower_bound, s.final_upper_bound),
                theme::neutral(),
            ),
        ]);
        f.render_widget(Paragraph::new(line), rows[2]);
    }
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState) {
    let hint = if app.data.is_some() {
        "Press Enter to run the forecast."
    } else {
        "Load data first: o to open a CSV, g for sample data."
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(hint, theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_chart(f: &mut Frame, area: Rect, chart: &ForecastChart, show_indicators: bool) {
    let [y_min, y_max] = chart.y_bounds;
    let lower: Vec<(f64, f64)> = chart.band.iter().map(|b| (b.x, b.lower)).collect();
    let upper: Vec<(f64, f64)> = chart.band.iter().map(|b| (b.x, b.upper)).collect();
    let fill = band_fill(&chart.band, chart.y_bounds, area);
    let marker: Vec<(f64, f64)> = chart
        .forecast_start
        .map(|x| vec![(x, y_min), (x, y_max)])
        .unwrap_or_default();

    let mut datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::MUTED))
            .graph_type(GraphType::Scatter)
            .data(&fill),
        band_dataset(&lower),
        band_dataset(&upper),
        Dataset::default()
            .name(chart.actual.name.as_str())
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::ACCENT))
            .graph_type(GraphType::Line)
            .data(&chart.actual.points),
        Dataset::default()
            .name(chart.predicted.name.as_str())
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::POSITIVE))
            .graph_type(GraphType::Line)
            .data(&chart.predicted.points),
    ];
    if !marker.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .style(theme::muted())
                .graph_type(GraphType::Line)
                .data(&marker),
        );
    }
    if show_indicators {
        for (i, line) in chart.overlays.iter().enumerate() {
            datasets.push(
                Dataset::default()
                    .name(line.name.as_str())
                    .marker(symbols::Marker::Braille)
                    .style(Style::default().fg(theme::overlay_color(i)))
                    .graph_type(GraphType::Line)
                    .data(&line.points),
            );
        }
    }

    let x_labels: Vec<Span> = chart
        .x_labels
        .iter()
        .map(|l| Span::styled(l.as_str(), theme::muted()))
        .collect();
    let y_labels: Vec<Span> = (0..Y_LABEL_COUNT)
        .map(|i| {
            let v = y_min + (y_max - y_min) * i as f64 / (Y_LABEL_COUNT - 1) as f64;
            Span::styled(format!("{v:.2}"), theme::muted())
        })
        .collect();

    let widget = Chart::new(datasets)
        .block(Block::default().title(Span::styled(
            chart.title.as_str(),
            theme::accent().add_modifier(Modifier::BOLD),
        )))
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .title(Span::styled(chart.x_label.as_str(), theme::muted()))
                .style(theme::muted())
                .bounds(chart.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(chart.y_label.as_str(), theme::muted()))
                .style(theme::muted())
                .bounds(chart.y_bounds)
                .labels(y_labels),
        );

    f.render_widget(widget, area);
}

fn band_dataset(points: &[(f64, f64)]) -> Dataset<'_> {
    Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::NEUTRAL))
        .graph_type(GraphType::Line)
        .data(points)
}

/// Dots filling the region between the band edges, one braille dot apart.
///
/// Columns are thinned to what the area can show.
fn band_fill(band: &[BandPoint], y_bounds: [f64; 2], area: Rect) -> Vec<(f64, f64)> {
    let cols = usize::from(area.width).max(1) * 2;
    let rows = usize::from(area.height).max(1) * 4;
    let dy = (y_bounds[1] - y_bounds[0]) / rows as f64;
    if !dy.is_finite() || dy <= 0.0 {
        return Vec::new();
    }
    let stride = band.len().div_ceil(cols).max(1);
    band.iter()
        .step_by(stride)
        .flat_map(|b| {
            let steps = ((b.upper - b.lower) / dy).floor();
            let steps = if steps.is_finite() { steps.max(0.0) as usize } else { 0 };
            (0..=steps.min(rows)).map(move |k| (b.x, b.lower + k as f64 * dy))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, lower: f64, upper: f64) -> BandPoint {
        BandPoint { x, lower, upper }
    }

    #[test]
    fn fill_covers_the_band_between_edges() {
        // 10 rows of 4 dots over [0, 40] → one dot per unit
        let band = [point(0.0, 10.0, 14.0), point(1.0, 20.0, 20.0)];
        let fill = band_fill(&band, [0.0, 40.0], Rect::new(0, 0, 20, 10));
        let first: Vec<f64> = fill.iter().filter(|p| p.0 == 0.0).map(|p| p.1).collect();
        assert_eq!(first, [10.0, 11.0, 12.0, 13.0, 14.0]);
        let second: Vec<f64> = fill.iter().filter(|p| p.0 == 1.0).map(|p| p.1).collect();
        assert_eq!(second, [20.0]);
        assert!(fill.iter().all(|&(_, y)| (10.0..=20.0).contains(&y)));
    }

    #[test]
    fn fill_thins_columns_to_the_area_width() {
        let band: Vec<BandPoint> = (0..1000).map(|i| point(i as f64, 0.0, 1.0)).collect();
        let fill = band_fill(&band, [0.0, 1.0], Rect::new(0, 0, 10, 2));
        let mut xs: Vec<f64> = fill.iter().map(|p| p.0).collect();
        xs.dedup();
        assert!(xs.len() <= 20);
        assert!(!xs.is_empty());
    }

    #[test]
    fn degenerate_bounds_give_no_fill() {
        let band = [point(0.0, 5.0, 5.0)];
        assert!(band_fill(&band, [5.0, 5.0], Rect::new(0, 0, 10, 10)).is_empty());
    }
}
