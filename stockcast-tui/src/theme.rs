//! Neon-on-charcoal palette and the style helpers every panel draws with.
//!
//! - **Accent**: electric cyan (focus, keys, actual prices)
//! - **Positive**: neon green (predicted prices, success)
//! - **Negative**: hot pink (errors)
//! - **Warning**: neon orange (dropped rows, clamped input)
//! - **Neutral**: cool purple (confidence band, indicators)
//! - **Muted**: steel blue (hints, secondary text)

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

/// Overlay lines cycle through these.
pub const OVERLAY_COLORS: [Color; 3] = [WARNING, NEUTRAL, TEXT_SECONDARY];

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Color for a dataset overlay, cycling by index.
pub fn overlay_color(index: usize) -> Color {
    OVERLAY_COLORS[index % OVERLAY_COLORS.len()]
}
