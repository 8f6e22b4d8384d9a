//! App state persistence: JSON save/load across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use stockcast_runner::{clamp_horizon, ModelKind, DEFAULT_EXPORT_FILE};

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub last_file: Option<PathBuf>,
    pub horizon_days: Option<u32>,
    pub model: Option<ModelKind>,
    pub export_path: PathBuf,
    pub active_panel: Panel,
    pub show_indicators: bool,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            last_file: None,
            horizon_days: None,
            model: None,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            active_panel: Panel::Data,
            show_indicators: false,
            welcome_dismissed: false,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt state file");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        last_file: app.last_file.clone(),
        horizon_days: Some(app.horizon_days),
        model: Some(app.model),
        export_path: app.export_path.clone(),
        active_panel: app.active_panel,
        show_indicators: app.show_indicators,
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state to AppState.
///
/// Saved horizon and model override the config file; the last file is only
/// remembered, not reloaded.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.last_file = state.last_file;
    if let Some(days) = state.horizon_days {
        app.horizon_days = clamp_horizon(days);
    }
    if let Some(model) = state.model {
        app.model = model;
    }
    app.export_path = state.export_path;
    app.active_panel = state.active_panel;
    app.show_indicators = state.show_indicators;
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}
