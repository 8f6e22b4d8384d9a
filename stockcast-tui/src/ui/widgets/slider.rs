//! Labeled horizontal slider widget.
//!
//! Renders `label [=====     ] value unit` on one line. Used for the
//! forecast horizon.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::theme;

/// Bar text for `value` within `min..=max`, `width` cells between brackets.
pub fn slider_bar(value: f64, min: f64, max: f64, width: usize) -> String {
    let range = max - min;
    if range <= 0.0 {
        return format!("[{}]", "=".repeat(width));
    }
    let frac = ((value - min) / range).clamp(0.0, 1.0);
    let filled = (frac * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

#[derive(Debug, Clone)]
pub struct Slider<'a> {
    label: &'a str,
    value: u32,
    min: u32,
    max: u32,
    unit: &'a str,
    bar_width: usize,
}

impl<'a> Slider<'a> {
    pub fn new(label: &'a str, value: u32, min: u32, max: u32) -> Self {
        Self {
            label,
            value,
            min,
            max,
            unit: "",
            bar_width: 30,
        }
    }

    pub fn unit(mut self, unit: &'a str) -> Self {
        self.unit = unit;
        self
    }

    pub fn bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }
}

impl Widget for Slider<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bar = slider_bar(
            f64::from(self.value),
            f64::from(self.min),
            f64::from(self.max),
            self.bar_width,
        );
        let line = Line::from(vec![
            Span::styled(format!("{} ", self.label), theme::muted()),
            Span::styled(bar, theme::accent()),
            Span::styled(format!(" {}", self.value), theme::accent_bold()),
            Span::styled(format!(" {}", self.unit), theme::muted()),
            Span::styled(format!("  ({}..{})", self.min, self.max), theme::muted()),
        ]);
        line.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(slider_bar(30.0, 30.0, 730.0, 10), "[          ]");
        assert_eq!(slider_bar(730.0, 30.0, 730.0, 10), "[==========]");
        assert_eq!(slider_bar(380.0, 30.0, 730.0, 10), "[=====     ]");
    }

    #[test]
    fn bar_clamps_and_handles_empty_range() {
        assert_eq!(slider_bar(1000.0, 0.0, 10.0, 4), "[====]");
        assert_eq!(slider_bar(-5.0, 0.0, 10.0, 4), "[    ]");
        assert_eq!(slider_bar(5.0, 5.0, 5.0, 3), "[===]");
    }

    #[test]
    fn renders_label_and_value() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        Slider::new("Horizon", 365, 30, 730)
            .unit("days")
            .bar_width(10)
            .render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.starts_with("Horizon [=====     ] 365 days"));
    }
}
