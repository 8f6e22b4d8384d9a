//! Panel 1 (Data): upload summary, cleaning report, scrollable cleaned rows.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, LoadedData};
use crate::theme;

const DATE_WIDTH: usize = 19;
const VALUE_WIDTH: usize = 16;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    match &app.data {
        Some(data) => render_loaded(f, area, app, data),
        None => render_empty(f, area, app),
    }
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("No data loaded.", theme::muted())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[o]", theme::accent()),
            Span::styled(" open a CSV with Date and Close columns", theme::muted()),
        ]),
        Line::from(vec![
            Span::styled("[g]", theme::accent()),
            Span::styled(" load generated sample data", theme::muted()),
        ]),
    ];
    if let Some(last) = &app.last_file {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Last file: ", theme::muted()),
            Span::styled(last.display().to_string(), theme::neutral()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn render_loaded(f: &mut Frame, area: Rect, app: &AppState, data: &LoadedData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(area);

    render_summary(f, chunks[0], data);
    render_rows(f, chunks[1], app, data);
}

fn render_summary(f: &mut Frame, area: Rect, data: &LoadedData) {
    let up = &data.upload;
    let report = &up.report;
    let series = &up.series;
    let mut lines: Vec<Line> = Vec::new();

    let source = data
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "generated".to_string());
    lines.push(Line::from(vec![
        Span::styled("File: ", theme::muted()),
        Span::styled(up.file_name.as_str(), theme::accent_bold()),
        Span::styled(format!("  ({source})"), theme::muted()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Columns: ", theme::muted()),
        Span::styled(up.columns.join(", "), theme::neutral()),
    ]));

    let dropped_style = if report.dropped_rows() > 0 {
        theme::warning()
    } else {
        theme::muted()
    };
    lines.push(Line::from(vec![
        Span::styled("Rows: ", theme::muted()),
        Span::styled(format!("{} kept", report.kept_rows), theme::positive()),
        Span::styled(format!(" of {}", report.total_rows), theme::muted()),
        Span::styled(
            format!(
                "  dropped {} (bad date {}, no price {})",
                report.dropped_rows(),
                report.dropped_invalid_date,
                report.dropped_missing_price
            ),
            dropped_style,
        ),
        Span::styled(
            format!("  duplicates {}", report.duplicates_overwritten),
            theme::muted(),
        ),
    ]));

    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        lines.push(Line::from(vec![
            Span::styled("Range: ", theme::muted()),
            Span::styled(format!("{} → {}", first.ds, last.ds), theme::accent()),
            Span::styled(format!("  ({:.0} days)", series.span_days()), theme::muted()),
        ]));
    }
    if let Some((lo, hi)) = series.price_range() {
        lines.push(Line::from(vec![
            Span::styled("Close: ", theme::muted()),
            Span::styled(format!("{lo:.2} .. {hi:.2}"), theme::accent()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Hash: ", theme::muted()),
        Span::styled(up.dataset_hash.get(..16).unwrap_or(""), theme::muted()),
    ]));

    f.render_widget(Paragraph::new(lines), area);
}

fn render_rows(f: &mut Frame, area: Rect, app: &AppState, data: &LoadedData) {
    let mut lines: Vec<Line> = Vec::new();

    let mut header = format!("{:<DATE_WIDTH$}{:>VALUE_WIDTH$}", "Date", "Close");
    for col in &data.indicators {
        header.push_str(&format!("{:>VALUE_WIDTH$}", col.name));
    }
    lines.push(Line::from(Span::styled(
        header,
        theme::accent().add_modifier(Modifier::BOLD),
    )));

    let visible = (area.height as usize).saturating_sub(1);
    let points = data.upload.series.points();
    for (i, obs) in points
        .iter()
        .enumerate()
        .skip(app.preview_scroll)
        .take(visible)
    {
        let mut row = format!(
            "{:<DATE_WIDTH$}{:>VALUE_WIDTH$.2}",
            obs.ds.to_string(),
            obs.y
        );
        for col in &data.indicators {
            match col.get(i) {
                Some(v) => row.push_str(&format!("{v:>VALUE_WIDTH$.2}")),
                None => row.push_str(&format!("{:>VALUE_WIDTH$}", "-")),
            }
        }
        let style = if i == app.preview_scroll {
            theme::accent()
        } else {
            theme::muted()
        };
        lines.push(Line::from(Span::styled(row, style)));
    }

    f.render_widget(Paragraph::new(lines), area);
}
