//! Stockcast Core: domain types, ingestion, preprocessing, forecasting models.
//!
//! This crate contains everything that turns an uploaded price file into a forecast:
//! - Domain types (raw records, clean series, forecast rows)
//! - CSV ingestion with `Date` / `Close` schema checks
//! - Preprocessing: date parsing, timezone stripping, missing-price drops, last-wins dedup
//! - The `Forecaster` capability plus additive and drift implementations
//! - Technical indicators (SMA, EMA, RSI, MACD, Bollinger Bands) over closing prices

pub mod data;
pub mod domain;
pub mod forecast;
pub mod indicators;

pub use data::{ingest_csv, preprocess, IngestError, PreprocessError, PreprocessReport, Preprocessed};
pub use domain::{CleanSeries, Forecast, ForecastRow, Observation, RawRecord, RawRow, SeriesError};
pub use forecast::{
    AdditiveModel, AdditiveSettings, DriftModel, ForecastError, Forecaster, Seasonality,
    SeasonalityMode,
};
pub use indicators::{compute_all, standard_indicators, Indicator, IndicatorColumn};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types can move between threads.
    ///
    /// The shell is single-threaded today, but every stage owns its data, so
    /// nothing here should ever pick up an `Rc` or `RefCell`.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<RawRecord>();
        require_sync::<RawRecord>();
        require_send::<CleanSeries>();
        require_sync::<CleanSeries>();
        require_send::<Forecast>();
        require_sync::<Forecast>();
        require_send::<PreprocessReport>();
        require_sync::<PreprocessReport>();
        require_send::<AdditiveModel>();
        require_sync::<AdditiveModel>();
        require_send::<DriftModel>();
        require_sync::<DriftModel>();
    }

    /// Architecture contract: a forecaster sees only the clean series and a horizon.
    ///
    /// If someone threads raw records or UI state into `fit`, the trait changes
    /// and this stops compiling.
    #[test]
    fn forecaster_trait_takes_only_series_and_horizon() {
        fn _check_trait_object_builds(
            model: &dyn Forecaster,
            series: &CleanSeries,
        ) -> Result<Forecast, ForecastError> {
            model.fit(series, 365)
        }
    }
}
