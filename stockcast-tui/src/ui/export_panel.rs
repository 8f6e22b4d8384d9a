//! Panel 3 (Export): destination paths and what each file will contain.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use stockcast_runner::export::FORECAST_HEADER;

use crate::actions::{series_export_path, summary_export_path};
use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Forecast CSV: ", theme::muted()),
        Span::styled(app.export_path.display().to_string(), theme::accent_bold()),
        Span::styled("  [s]et path [w]rite", theme::muted()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  columns ", theme::muted()),
        Span::styled(FORECAST_HEADER.join(","), theme::neutral()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Series CSV:   ", theme::muted()),
        Span::styled(
            series_export_path(&app.export_path).display().to_string(),
            theme::accent(),
        ),
        Span::styled("  [c] cleaned rows with indicators", theme::muted()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Summary JSON: ", theme::muted()),
        Span::styled(
            summary_export_path(&app.export_path).display().to_string(),
            theme::accent(),
        ),
        Span::styled("  [j]", theme::muted()),
    ]));
    lines.push(Line::from(""));

    match &app.run {
        Some(run) => {
            let forecast = &run.forecast;
            lines.push(Line::from(vec![
                Span::styled("Ready: ", theme::muted()),
                Span::styled(
                    format!(
                        "{} rows ({} observed + {} ahead), model {}",
                        forecast.len(),
                        forecast.history_rows().len(),
                        forecast.future_rows().len(),
                        forecast.model
                    ),
                    theme::positive(),
                ),
            ]));
            if app.run_is_stale() {
                lines.push(Line::from(Span::styled(
                    "Settings changed since this run; the file reflects the run shown.",
                    theme::warning(),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Last rows:", theme::accent_bold())));
            let tail = forecast.rows.len().saturating_sub(5);
            for row in &forecast.rows[tail..] {
                lines.push(Line::from(Span::styled(
                    format!(
                        "  {}  {:>12.2}  {:>12.2}  {:>12.2}",
                        row.ds, row.point_estimate, row.lower_bound, row.upper_bound
                    ),
                    theme::muted(),
                )));
            }
        }
        None => {
            let hint = if app.data.is_some() {
                "No forecast yet: press 2 then Enter. Series CSV is available now."
            } else {
                "No data loaded: press o to open a CSV or g for sample data."
            };
            lines.push(Line::from(Span::styled(hint, theme::muted())));
        }
    }

    f.render_widget(Paragraph::new(lines), area);
}
