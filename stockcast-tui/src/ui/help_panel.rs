//! Panel 4 (Help): keyboard shortcuts and input format.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use stockcast_runner::config::{MAX_HORIZON_DAYS, MIN_HORIZON_DAYS};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "o", "Open a CSV file");
    key(&mut lines, "g", "Load generated sample data");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "?", "Show this panel");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1: Data");
    key(&mut lines, "j / k", "Scroll the cleaned rows");
    key(&mut lines, "Home / G", "Jump to first / last row");
    key(&mut lines, "Enter", "Run the forecast");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2: Forecast");
    key(&mut lines, "h / l", "Horizon -5 / +5 days");
    key(&mut lines, "H / L", "Horizon -30 / +30 days");
    key(&mut lines, "m", "Cycle model (additive, drift)");
    key(&mut lines, "i", "Toggle SMA, EMA and Bollinger overlays");
    key(&mut lines, "Enter", "Run the forecast");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3: Export");
    key(&mut lines, "s", "Set the forecast CSV path");
    key(&mut lines, "w / Enter", "Write the forecast CSV");
    key(&mut lines, "c", "Write cleaned series with indicators");
    key(&mut lines, "j", "Write the JSON run summary");
    lines.push(Line::from(""));

    section(&mut lines, "Input");
    key(&mut lines, "Columns", "Date and Close required, others ignored");
    key(&mut lines, "Dates", "Timezone offsets are dropped, duplicates keep the last row");
    key(
        &mut lines,
        "Horizon",
        &format!("{MIN_HORIZON_DAYS}..{MAX_HORIZON_DAYS} days, now {}", app.horizon_days),
    );
    key(
        &mut lines,
        "Interval",
        &format!("{:.0}% confidence band", app.config.interval_width * 100.0),
    );

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
