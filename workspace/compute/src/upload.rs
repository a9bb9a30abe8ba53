//! Reading a user-supplied two-column table of (period, value) rows.
//!
//! The first line is a header and its names are ignored: the first column is
//! always the period and the second the value.

use std::io::Read;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, instrument, warn};

use crate::error::{ComputeError, Result};
use crate::series::{ActualSeries, ConsumptionRecord, PredictionSeries};

/// Parses CSV rows into records, keeping the file order. Values are not rounded.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ConsumptionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Header names are ignored but must still be valid UTF-8
    csv_reader
        .headers()
        .map_err(|e| ComputeError::UploadFormat(format!("Unreadable header: {}", e)))?;

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| ComputeError::UploadFormat(e.to_string()))?;
        let line = row.position().map_or(0, |p| p.line());

        if row.iter().all(str::is_empty) {
            continue;
        }

        let period_field = row.get(0).unwrap_or_default();
        let value_field = match row.get(1) {
            Some(field) if !field.is_empty() => field,
            _ => {
                return Err(ComputeError::UploadFormat(format!(
                    "Line {}: missing value column",
                    line
                )));
            }
        };

        let period = parse_period(period_field).ok_or_else(|| {
            ComputeError::UploadFormat(format!(
                "Line {}: period '{}' is not an integer",
                line, period_field
            ))
        })?;
        let value = parse_value(value_field).ok_or_else(|| {
            ComputeError::UploadFormat(format!(
                "Line {}: value '{}' is not numeric",
                line, value_field
            ))
        })?;

        records.push(ConsumptionRecord::new(period, value));
    }

    debug!("Parsed {} uploaded rows", records.len());
    Ok(records)
}

/// Parses an uploaded replacement forecast.
#[instrument(skip(reader))]
pub fn parse_prediction_upload<R: Read>(reader: R) -> Result<PredictionSeries> {
    PredictionSeries::new(parse_records(reader)?)
}

/// Accepts `2021` as well as `2021.0`, but not `2021.5`.
fn parse_period(field: &str) -> Option<i32> {
    if let Ok(period) = field.parse::<i32>() {
        return Some(period);
    }
    let decimal = parse_value(field)?;
    if decimal.fract().is_zero() {
        decimal.trunc().to_i32()
    } else {
        None
    }
}

fn parse_value(field: &str) -> Option<Decimal> {
    Decimal::from_str(field)
        .or_else(|_| Decimal::from_scientific(field))
        .ok()
}

/// Logs, without rejecting, uploaded periods that overlap the actual series,
/// do not follow it, or leave gaps.
pub fn check_upload_periods(actuals: &ActualSeries, predictions: &PredictionSeries) {
    let Some(latest) = actuals.latest() else {
        return;
    };

    let overlapping: Vec<i32> = predictions
        .records()
        .iter()
        .map(|r| r.period)
        .filter(|p| *p <= latest.period)
        .collect();
    if !overlapping.is_empty() {
        warn!(
            "Uploaded forecast covers periods up to the latest actual {}: {:?}",
            latest.period, overlapping
        );
    }

    let contiguous = predictions
        .records()
        .windows(2)
        .all(|pair| pair[1].period == pair[0].period + 1);
    if !contiguous {
        warn!("Uploaded forecast periods are not contiguous");
    }
}
