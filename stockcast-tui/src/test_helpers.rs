//! Shared fixtures for state and action tests.

use std::path::PathBuf;

use stockcast_runner::ForecastConfig;

use crate::app::AppState;

pub fn test_app() -> AppState {
    AppState::new(ForecastConfig::default(), PathBuf::from("."))
}

/// `Date,Close` CSV with `days` daily rows rising by one per day from 100.
pub fn rising_csv(days: usize) -> String {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut out = String::from("Date,Close\n");
    for i in 0..days {
        let date = start + chrono::Duration::days(i as i64);
        out.push_str(&format!("{date},{}\n", 100 + i));
    }
    out
}
