//! Consumption series: the actual and predicted yearly values and their
//! period-keyed combination.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ComputeError, Result};

/// Rounds a consumption value to two decimal places.
///
/// Uses banker's rounding and always keeps two fractional digits, so `2021`
/// becomes `2021.00` and `100.004` becomes `100.00`.
pub fn round_value(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// A single (period, value) observation. The period is a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumptionRecord {
    pub period: i32,
    pub value: Decimal,
}

impl ConsumptionRecord {
    pub fn new(period: i32, value: Decimal) -> Self {
        Self { period, value }
    }

    /// Same record with the value rounded to two decimal places.
    pub fn rounded(self) -> Self {
        Self {
            period: self.period,
            value: round_value(self.value),
        }
    }
}

/// Returns the first record whose value is below zero, if any.
fn find_negative(records: &[ConsumptionRecord]) -> Option<&ConsumptionRecord> {
    records.iter().find(|r| r.value < Decimal::ZERO)
}

/// Sorts records ascending by period and returns the first repeated period, if any.
fn sort_and_find_duplicate(records: &mut [ConsumptionRecord]) -> Option<i32> {
    records.sort_by_key(|r| r.period);
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().map(|r| r.period).find(|p| !seen.insert(*p))
}

/// Historically recorded consumption, kept ascending by period.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualSeries {
    records: Vec<ConsumptionRecord>,
}

impl ActualSeries {
    /// Builds a series from records in any order. Values are rounded.
    ///
    /// Fails with [`ComputeError::DataAccess`] when the same period appears
    /// twice or a value is negative.
    pub fn new(records: Vec<ConsumptionRecord>) -> Result<Self> {
        let mut records: Vec<_> = records.into_iter().map(ConsumptionRecord::rounded).collect();
        if let Some(record) = find_negative(&records) {
            return Err(ComputeError::DataAccess(format!(
                "Negative consumption {} recorded for period {}",
                record.value, record.period
            )));
        }
        if let Some(period) = sort_and_find_duplicate(&mut records) {
            return Err(ComputeError::DataAccess(format!(
                "Period {} appears more than once in the actual series",
                period
            )));
        }
        Ok(Self { records })
    }

    /// Records ascending by period.
    pub fn records(&self) -> &[ConsumptionRecord] {
        &self.records
    }

    /// Records descending by period, the order used for display.
    pub fn descending(&self) -> impl Iterator<Item = &ConsumptionRecord> {
        self.records.iter().rev()
    }

    /// The record with the highest period.
    pub fn latest(&self) -> Option<&ConsumptionRecord> {
        self.records.last()
    }

    /// The record just before the latest one.
    pub fn prior(&self) -> Option<&ConsumptionRecord> {
        self.records.iter().rev().nth(1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// DataFrame with `period` and `value` columns, descending by period.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let periods: Vec<i32> = self.descending().map(|r| r.period).collect();
        let values: Vec<f64> = self
            .descending()
            .map(|r| r.value.to_f64().unwrap_or(f64::NAN))
            .collect();

        let df = DataFrame::new(vec![
            Series::new("period".into(), periods).into(),
            Series::new("value".into(), values).into(),
        ])?;
        Ok(df)
    }
}

/// Where the active prediction series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOrigin {
    /// Produced by the forecaster for the periods after the latest actual.
    Model,
    /// Supplied by the user as a replacement table.
    Upload,
}

/// Predicted consumption, kept ascending by period.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSeries {
    records: Vec<ConsumptionRecord>,
}

impl PredictionSeries {
    /// Builds a series from records in any order. Values are rounded.
    ///
    /// Fails with [`ComputeError::UploadFormat`] when the same period appears
    /// twice or a value is negative. Model forecasts are checked per period by
    /// [`compute_forecast`](crate::forecast::compute_forecast) before they get here.
    pub fn new(records: Vec<ConsumptionRecord>) -> Result<Self> {
        let mut records: Vec<_> = records.into_iter().map(ConsumptionRecord::rounded).collect();
        if let Some(record) = find_negative(&records) {
            return Err(ComputeError::UploadFormat(format!(
                "Negative prediction {} for period {}",
                record.value, record.period
            )));
        }
        if let Some(period) = sort_and_find_duplicate(&mut records) {
            return Err(ComputeError::UploadFormat(format!(
                "Period {} appears more than once",
                period
            )));
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ConsumptionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Actual and predicted value for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CombinedPoint {
    pub actual: Option<Decimal>,
    pub prediction: Option<Decimal>,
}

/// Period-keyed outer join of an actual and a prediction series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CombinedSeries {
    points: BTreeMap<i32, CombinedPoint>,
}

impl CombinedSeries {
    /// Outer-joins both series on period.
    ///
    /// A period only present on one side leaves the other field unset. When a
    /// period is present on both sides (an upload overlapping the actuals)
    /// both fields are filled.
    pub fn combine(actuals: &ActualSeries, predictions: &PredictionSeries) -> Self {
        let mut points: BTreeMap<i32, CombinedPoint> = BTreeMap::new();

        for record in actuals.records() {
            points.entry(record.period).or_default().actual = Some(record.value);
        }
        for record in predictions.records() {
            points.entry(record.period).or_default().prediction = Some(record.value);
        }

        Self { points }
    }

    /// Points ascending by period.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &CombinedPoint)> {
        self.points.iter().map(|(period, point)| (*period, point))
    }

    pub fn get(&self, period: i32) -> Option<&CombinedPoint> {
        self.points.get(&period)
    }

    pub fn periods(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// DataFrame with `period`, `actual` and `prediction` columns, ascending
    /// by period. Unset fields become nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let periods: Vec<i32> = self.periods().collect();
        let actuals: Vec<Option<f64>> = self
            .points
            .values()
            .map(|p| p.actual.and_then(|v| v.to_f64()))
            .collect();
        let predictions: Vec<Option<f64>> = self
            .points
            .values()
            .map(|p| p.prediction.and_then(|v| v.to_f64()))
            .collect();

        let df = DataFrame::new(vec![
            Series::new("period".into(), periods).into(),
            Series::new("actual".into(), actuals).into(),
            Series::new("prediction".into(), predictions).into(),
        ])?;
        Ok(df)
    }
}
