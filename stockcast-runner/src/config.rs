//! Forecast configuration, loaded from TOML.
//!
//! ```toml
//! horizon_days = 365
//! interval_width = 0.8
//! min_observations = 10
//! model = "additive"
//!
//! [additive]
//! n_changepoints = 25
//! changepoint_penalty = 1.0
//! weekly = { mode = "disabled", order = 3 }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockcast_core::forecast::{
    DEFAULT_INTERVAL_WIDTH, DEFAULT_MIN_OBSERVATIONS, MIN_OBSERVATIONS_FLOOR,
};
use stockcast_core::{AdditiveModel, AdditiveSettings, DriftModel, Forecaster};

pub const DEFAULT_HORIZON_DAYS: u32 = 365;
/// Interactive horizon range (the shell's slider bounds).
pub const MIN_HORIZON_DAYS: u32 = 30;
pub const MAX_HORIZON_DAYS: u32 = 730;
/// Hard ceiling for headless runs.
pub const HORIZON_LIMIT_DAYS: u32 = 3_650;

const MAX_FOURIER_ORDER: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("unknown model '{0}' (expected 'additive' or 'drift')")]
    UnknownModel(String),
}

/// Which forecasting capability to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Additive,
    Drift,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Additive, ModelKind::Drift];

    pub fn label(self) -> &'static str {
        match self {
            ModelKind::Additive => "additive",
            ModelKind::Drift => "drift",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ModelKind::Additive => ModelKind::Drift,
            ModelKind::Drift => ModelKind::Additive,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" => Ok(ModelKind::Additive),
            "drift" => Ok(ModelKind::Drift),
            other => Err(ConfigError::UnknownModel(other.to_string())),
        }
    }
}

/// Everything needed to build a forecaster and run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    pub interval_width: f64,
    pub min_observations: usize,
    pub model: ModelKind,
    pub additive: AdditiveSettings,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            model: ModelKind::default(),
            additive: AdditiveSettings::default(),
        }
    }
}

impl ForecastConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_days == 0 || self.horizon_days > HORIZON_LIMIT_DAYS {
            return Err(ConfigError::Invalid(format!(
                "horizon_days must be between 1 and {HORIZON_LIMIT_DAYS}, got {}",
                self.horizon_days
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "interval_width must be strictly between 0 and 1, got {}",
                self.interval_width
            )));
        }
        if self.min_observations < MIN_OBSERVATIONS_FLOOR {
            return Err(ConfigError::Invalid(format!(
                "min_observations must be at least {MIN_OBSERVATIONS_FLOOR}, got {}",
                self.min_observations
            )));
        }

        let a = &self.additive;
        if !(a.changepoint_range > 0.0 && a.changepoint_range <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "additive.changepoint_range must be in (0, 1], got {}",
                a.changepoint_range
            )));
        }
        for (name, value) in [
            ("changepoint_penalty", a.changepoint_penalty),
            ("seasonality_penalty", a.seasonality_penalty),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "additive.{name} must be a positive number, got {value}"
                )));
            }
        }
        for (name, s) in [("yearly", a.yearly), ("weekly", a.weekly), ("daily", a.daily)] {
            if s.order > MAX_FOURIER_ORDER {
                return Err(ConfigError::Invalid(format!(
                    "additive.{name}.order must be at most {MAX_FOURIER_ORDER}, got {}",
                    s.order
                )));
            }
        }
        Ok(())
    }

    /// Build the configured forecaster.
    pub fn build_forecaster(&self) -> Box<dyn Forecaster> {
        self.build(self.model)
    }

    /// Build a specific forecaster with this config's shared settings.
    pub fn build(&self, kind: ModelKind) -> Box<dyn Forecaster> {
        match kind {
            ModelKind::Additive => Box::new(
                AdditiveModel::new(self.additive.clone())
                    .with_interval_width(self.interval_width)
                    .with_min_observations(self.min_observations),
            ),
            ModelKind::Drift => Box::new(
                DriftModel::new()
                    .with_interval_width(self.interval_width)
                    .with_min_observations(self.min_observations),
            ),
        }
    }
}

/// Clamp a horizon into the interactive range.
pub fn clamp_horizon(days: u32) -> u32 {
    days.clamp(MIN_HORIZON_DAYS, MAX_HORIZON_DAYS)
}
