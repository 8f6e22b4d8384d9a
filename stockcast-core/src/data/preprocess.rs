//! Preprocessing: `RawRecord` to `CleanSeries`.
//!
//! Policy:
//! 1. Unparseable dates → row dropped
//! 2. Empty, unparseable or non-finite price → row dropped (never interpolated)
//! 3. Timezone offsets stripped, wall-clock time kept
//! 4. Duplicate timestamps → the later row in file order wins
//! 5. Output sorted ascending
//!
//! Zero surviving rows is an error, not an empty series.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::datetime::parse_naive_datetime;
use crate::domain::{CleanSeries, Observation, RawRecord, SeriesError};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("no valid rows after cleaning ({total_rows} rows read, {dropped_invalid_date} bad dates, {dropped_missing_price} missing prices)")]
    EmptyInput {
        total_rows: usize,
        dropped_invalid_date: usize,
        dropped_missing_price: usize,
    },

    #[error("cleaned series violates its invariants: {0}")]
    Invariant(#[from] SeriesError),
}

/// What the cleaning pass did to the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_invalid_date: usize,
    pub dropped_missing_price: usize,
    /// Rows whose timestamp had already been seen; each replaced the earlier value.
    pub duplicates_overwritten: usize,
}

impl PreprocessReport {
    pub fn dropped_rows(&self) -> usize {
        self.dropped_invalid_date + self.dropped_missing_price
    }

    /// One-line warnings for anything that was silently repaired.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.dropped_invalid_date > 0 {
            out.push(format!(
                "{} row(s) dropped: unparseable date",
                self.dropped_invalid_date
            ));
        }
        if self.dropped_missing_price > 0 {
            out.push(format!(
                "{} row(s) dropped: missing or invalid Close",
                self.dropped_missing_price
            ));
        }
        if self.duplicates_overwritten > 0 {
            out.push(format!(
                "{} duplicate date(s): later rows kept",
                self.duplicates_overwritten
            ));
        }
        out
    }
}

/// Result of a successful cleaning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub series: CleanSeries,
    pub report: PreprocessReport,
}

/// Parse a price cell. Blank, non-numeric, NaN and infinite values are missing.
fn parse_price(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Clean a raw record into an ordered, deduplicated series.
pub fn preprocess(raw: &RawRecord) -> Result<Preprocessed, PreprocessError> {
    let mut report = PreprocessReport {
        total_rows: raw.len(),
        ..Default::default()
    };
    let mut by_date: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();

    for row in &raw.rows {
        let Some(ds) = parse_naive_datetime(&row.date) else {
            report.dropped_invalid_date += 1;
            tracing::trace!(line = row.line, date = %row.date, "dropping row: bad date");
            continue;
        };
        let Some(y) = parse_price(&row.close) else {
            report.dropped_missing_price += 1;
            tracing::trace!(line = row.line, close = %row.close, "dropping row: missing price");
            continue;
        };
        if by_date.insert(ds, y).is_some() {
            report.duplicates_overwritten += 1;
        }
    }

    if by_date.is_empty() {
        return Err(PreprocessError::EmptyInput {
            total_rows: report.total_rows,
            dropped_invalid_date: report.dropped_invalid_date,
            dropped_missing_price: report.dropped_missing_price,
        });
    }

    let points: Vec<Observation> = by_date
        .into_iter()
        .map(|(ds, y)| Observation { ds, y })
        .collect();
    report.kept_rows = points.len();
    let series = CleanSeries::new(points)?;

    tracing::debug!(
        kept = report.kept_rows,
        dropped = report.dropped_rows(),
        duplicates = report.duplicates_overwritten,
        "preprocessed series"
    );
    Ok(Preprocessed { series, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;
    use chrono::NaiveDate;

    fn raw(rows: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            columns: vec!["Date".into(), "Close".into()],
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, (d, c))| RawRow {
                    line: i as u64 + 2,
                    date: d.to_string(),
                    close: c.to_string(),
                })
                .collect(),
        }
    }

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn sorts_ascending() {
        let out = preprocess(&raw(&[("2024-01-03", "3"), ("2024-01-01", "1"), ("2024-01-02", "2")]))
            .unwrap();
        assert_eq!(out.series.dates(), vec![day(1), day(2), day(3)]);
        assert_eq!(out.series.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_dates_keep_the_later_row() {
        let out = preprocess(&raw(&[("2024-01-01", "1500"), ("2024-01-01", "1600")])).unwrap();
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.series.points()[0].y, 1600.0);
        assert_eq!(out.report.duplicates_overwritten, 1);
    }

    #[test]
    fn missing_and_invalid_prices_are_dropped() {
        let out = preprocess(&raw(&[
            ("2024-01-01", ""),
            ("2024-01-02", "abc"),
            ("2024-01-03", "NaN"),
            ("2024-01-04", "inf"),
            ("2024-01-05", " 101.5 "),
        ]))
        .unwrap();
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.series.points()[0].y, 101.5);
        assert_eq!(out.report.dropped_missing_price, 4);
        assert_eq!(out.report.kept_rows, 1);
    }

    #[test]
    fn bad_dates_are_dropped_and_counted() {
        let out = preprocess(&raw(&[("yesterday", "1"), ("2024-01-02", "2")])).unwrap();
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.report.dropped_invalid_date, 1);
        assert_eq!(out.report.warnings().len(), 1);
    }

    #[test]
    fn timezone_offsets_are_stripped() {
        let out = preprocess(&raw(&[
            ("2024-01-02 00:00:00-05:00", "10"),
            ("2024-01-01 00:00:00+01:00", "20"),
        ]))
        .unwrap();
        assert_eq!(out.series.dates(), vec![day(1), day(2)]);
    }

    #[test]
    fn all_missing_prices_is_empty_input() {
        let err = preprocess(&raw(&[("2024-01-01", ""), ("2024-01-02", " ")])).unwrap_err();
        match err {
            PreprocessError::EmptyInput {
                total_rows,
                dropped_missing_price,
                ..
            } => {
                assert_eq!(total_rows, 2);
                assert_eq!(dropped_missing_price, 2);
            }
            other => panic!("expected EmptyInput, got {other:?}"),
        }
    }

    #[test]
    fn header_only_is_empty_input() {
        assert!(matches!(
            preprocess(&raw(&[])).unwrap_err(),
            PreprocessError::EmptyInput { total_rows: 0, .. }
        ));
    }

    #[test]
    fn cleaning_a_clean_series_is_identity() {
        let first = preprocess(&raw(&[
            ("2024-01-05", "10.25"),
            ("2024-01-01", "9.5"),
            ("2024-01-01", "9.75"),
            ("2024-01-03 14:30:00+02:00", "0.30000000000000004"),
        ]))
        .unwrap();
        let second = preprocess(&RawRecord::from(&first.series)).unwrap();
        assert_eq!(first.series, second.series);
        assert_eq!(second.report.dropped_rows(), 0);
        assert_eq!(second.report.duplicates_overwritten, 0);
    }

    #[test]
    fn sub_second_rows_survive_a_second_cleaning() {
        let first = preprocess(&raw(&[
            ("2024-03-15 16:00:00.250", "1"),
            ("2024-03-15 16:00:00.750", "2"),
            ("2024-03-16", "3"),
        ]))
        .unwrap();
        assert_eq!(first.series.len(), 3);
        let second = preprocess(&RawRecord::from(&first.series)).unwrap();
        assert_eq!(first.series, second.series);
        assert_eq!(second.report.duplicates_overwritten, 0);
    }
}
