//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::actions::{self, HORIZON_BIG_STEP, HORIZON_STEP};
use crate::app::{AppState, Overlay, Panel};

/// Handle one key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::OpenFile | Overlay::ExportPath => {
            handle_text_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            if let Some(panel) = Panel::from_index(index) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('o') => {
            open_text_overlay(app, Overlay::OpenFile);
            return;
        }
        KeyCode::Char('g') => {
            actions::load_sample(app);
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('?') => {
            app.active_panel = Panel::Help;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Data => handle_data_key(app, key),
        Panel::Forecast => handle_forecast_key(app, key),
        Panel::Export => handle_export_key(app, key),
        Panel::Help => {}
    }
}

/// Show a text input prefilled with the current value.
fn open_text_overlay(app: &mut AppState, overlay: Overlay) {
    app.input_buffer = match overlay {
        Overlay::OpenFile => app
            .last_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        Overlay::ExportPath => app.export_path.display().to_string(),
        _ => String::new(),
    };
    app.overlay = overlay;
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_text_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.input_buffer.clear();
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.input_buffer);
            let overlay = std::mem::replace(&mut app.overlay, Overlay::None);
            match overlay {
                Overlay::OpenFile => {
                    let path = input.trim();
                    if path.is_empty() {
                        app.set_warning("No file opened: empty path");
                    } else {
                        actions::open_file(app, &PathBuf::from(path));
                    }
                }
                Overlay::ExportPath => actions::set_export_path(app, &input),
                _ => {}
            }
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => {
            app.input_buffer.push(c);
        }
        _ => {}
    }
}

fn handle_data_key(app: &mut AppState, key: KeyEvent) {
    let rows = app.data.as_ref().map_or(0, |d| d.upload.series.len());
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.preview_scroll + 1 < rows {
                app.preview_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.preview_scroll = app.preview_scroll.saturating_sub(1);
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.preview_scroll = rows.saturating_sub(1);
        }
        KeyCode::Home => {
            app.preview_scroll = 0;
        }
        KeyCode::Enter => actions::run_forecast(app),
        _ => {}
    }
}

fn handle_forecast_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => actions::adjust_horizon(app, -HORIZON_STEP),
        KeyCode::Char('l') | KeyCode::Right => actions::adjust_horizon(app, HORIZON_STEP),
        KeyCode::Char('H') => actions::adjust_horizon(app, -HORIZON_BIG_STEP),
        KeyCode::Char('L') => actions::adjust_horizon(app, HORIZON_BIG_STEP),
        KeyCode::Char('m') => actions::cycle_model(app),
        KeyCode::Char('i') => actions::toggle_indicators(app),
        KeyCode::Enter => actions::run_forecast(app),
        _ => {}
    }
}

fn handle_export_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('s') => open_text_overlay(app, Overlay::ExportPath),
        KeyCode::Char('w') | KeyCode::Enter => actions::write_forecast(app),
        KeyCode::Char('c') => actions::write_series(app),
        KeyCode::Char('j') => actions::write_summary(app),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{rising_csv, test_app};
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(app, press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = test_app();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key(&mut app, release);
        assert!(app.running);
    }

    #[test]
    fn number_keys_and_tab_switch_panels() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.active_panel, Panel::Export);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_panel, Panel::Help);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::Export);
        handle_key(&mut app, press(KeyCode::Char('9')));
        assert_eq!(app.active_panel, Panel::Export);
    }

    #[test]
    fn welcome_swallows_first_key() {
        let mut app = test_app();
        app.overlay = Overlay::Welcome;
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.overlay, Overlay::None);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn open_file_overlay_loads_typed_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, rising_csv(15)).unwrap();

        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('o')));
        assert_eq!(app.overlay, Overlay::OpenFile);
        // Keys that are global elsewhere are text here
        type_text(&mut app, "qx");
        handle_key(&mut app, press(KeyCode::Backspace));
        handle_key(&mut app, press(KeyCode::Backspace));
        type_text(&mut app, &path.display().to_string());
        handle_key(&mut app, press(KeyCode::Enter));

        assert!(app.running);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.data.as_ref().unwrap().upload.series.len(), 15);
    }

    #[test]
    fn escape_cancels_text_input() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('3')));
        handle_key(&mut app, press(KeyCode::Char('s')));
        assert_eq!(app.input_buffer, "forecast.csv");
        type_text(&mut app, "x");
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.input_buffer.is_empty());
        assert_eq!(app.export_path, PathBuf::from("forecast.csv"));
    }

    #[test]
    fn forecast_panel_keys_drive_horizon_and_run() {
        let mut app = test_app();
        actions::load_bytes(&mut app, "a.csv", rising_csv(20).as_bytes(), None);
        handle_key(&mut app, press(KeyCode::Char('2')));
        app.horizon_days = 100;
        handle_key(&mut app, press(KeyCode::Char('l')));
        handle_key(&mut app, press(KeyCode::Char('L')));
        assert_eq!(app.horizon_days, 135);
        handle_key(&mut app, press(KeyCode::Char('h')));
        assert_eq!(app.horizon_days, 130);
        handle_key(&mut app, press(KeyCode::Char('i')));
        assert!(app.show_indicators);
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.run.as_ref().unwrap().forecast.horizon_days, 130);
    }

    #[test]
    fn error_history_opens_and_scrolls() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('2')));
        handle_key(&mut app, press(KeyCode::Enter));
        actions::open_file(&mut app, std::path::Path::new("/nonexistent/a.csv"));
        actions::open_file(&mut app, std::path::Path::new("/nonexistent/b.csv"));

        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.error_scroll, 1);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn data_panel_scroll_is_bounded() {
        let mut app = test_app();
        actions::load_bytes(&mut app, "a.csv", rising_csv(3).as_bytes(), None);
        for _ in 0..5 {
            handle_key(&mut app, press(KeyCode::Char('j')));
        }
        assert_eq!(app.preview_scroll, 2);
        handle_key(&mut app, press(KeyCode::Home));
        assert_eq!(app.preview_scroll, 0);
    }
}
