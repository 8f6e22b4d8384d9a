//! Domain types shared by every pipeline stage.

pub mod forecast;
pub mod series;

pub use forecast::{Forecast, ForecastRow};
pub use series::{days_between, CleanSeries, Observation, RawRecord, RawRow, SeriesError};
