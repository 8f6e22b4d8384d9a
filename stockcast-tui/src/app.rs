//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. Actions in `actions.rs` take `&mut AppState`
//! and run to completion before the next frame is drawn.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use stockcast_core::IndicatorColumn;
use stockcast_runner::{
    clamp_horizon, ErrorKind, ForecastConfig, ForecastRun, ModelKind, Upload, DEFAULT_EXPORT_FILE,
};

/// Error history keeps the most recent entries only.
pub const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Data,
    Forecast,
    Export,
    Help,
}

impl Panel {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Panel::Data => 0,
            Panel::Forecast => 1,
            Panel::Export => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Data),
            1 => Some(Panel::Forecast),
            2 => Some(Panel::Export),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Data => "Data",
            Panel::Forecast => "Forecast",
            Panel::Export => "Export",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Data)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Data)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unreadable file, malformed CSV, missing columns.
    Input,
    /// Nothing usable left after cleaning.
    Data,
    /// Too few points or a model failure.
    Model,
    Export,
    Config,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Input => "IN",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Model => "MDL",
            ErrorCategory::Export => "EXP",
            ErrorCategory::Config => "CFG",
            ErrorCategory::Other => "ERR",
        }
    }
}

impl From<ErrorKind> for ErrorCategory {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Parse | ErrorKind::Schema => ErrorCategory::Input,
            ErrorKind::EmptyInput => ErrorCategory::Data,
            ErrorKind::InsufficientData | ErrorKind::ForecastFailure => ErrorCategory::Model,
            ErrorKind::Export => ErrorCategory::Export,
            ErrorKind::Config => ErrorCategory::Config,
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    /// Text input for a CSV path to load.
    OpenFile,
    /// Text input for the forecast download path.
    ExportPath,
}

/// A loaded file and the indicators computed over it.
#[derive(Debug)]
pub struct LoadedData {
    pub upload: Upload,
    /// Path it came from; `None` for generated sample data.
    pub source: Option<PathBuf>,
    pub indicators: Vec<IndicatorColumn>,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Pipeline state, each stage owning the next
    pub config: ForecastConfig,
    pub model: ModelKind,
    pub horizon_days: u32,
    pub data: Option<LoadedData>,
    pub run: Option<ForecastRun>,

    // View options
    pub show_indicators: bool,
    pub preview_scroll: usize,
    pub export_path: PathBuf,
    /// Last CSV path that loaded successfully.
    pub last_file: Option<PathBuf>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub input_buffer: String,

    pub state_path: PathBuf,
}

impl AppState {
    pub fn new(config: ForecastConfig, state_path: PathBuf) -> Self {
        Self {
            active_panel: Panel::Data,
            running: true,
            model: config.model,
            horizon_days: clamp_horizon(config.horizon_days),
            config,
            data: None,
            run: None,
            show_indicators: false,
            preview_scroll: 0,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            last_file: None,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            input_buffer: String::new(),
            state_path,
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        tracing::warn!(category = category.label(), %context, "{message}");
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// True when the shown forecast was made with different settings than
    /// the current ones.
    pub fn run_is_stale(&self) -> bool {
        self.run.as_ref().is_some_and(|run| {
            run.forecast.horizon_days != self.horizon_days || run.summary.model != self.model.label()
        })
    }
}
