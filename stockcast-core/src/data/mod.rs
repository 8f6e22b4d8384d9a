//! Data ingestion and cleaning

pub mod datetime;
pub mod ingest;
pub mod preprocess;

pub use datetime::parse_naive_datetime;
pub use ingest::{ingest_csv, IngestError, CLOSE_COLUMN, DATE_COLUMN};
pub use preprocess::{preprocess, PreprocessError, PreprocessReport, Preprocessed};
