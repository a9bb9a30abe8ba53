//! Forecasts for the periods following the latest actual value.
//!
//! The prediction model itself lives outside this crate. A [`Forecaster`]
//! maps one period to one predicted value; [`compute_forecast`] asks it for
//! each future period in turn.

use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use tracing::{debug, error, info, instrument};

use crate::error::{ComputeError, Result};
use crate::series::{ConsumptionRecord, PredictionSeries};

/// Number of future periods forecast when nothing else is requested.
pub const DEFAULT_HORIZON: u32 = 3;

/// A prediction model: one period in, one predicted value out.
#[async_trait]
pub trait Forecaster: Send + Sync + fmt::Debug {
    async fn predict(&self, period: i32) -> Result<Decimal>;
}

/// Invokes `forecaster` for the `horizon` periods after `latest_period`.
///
/// Calls are made one after another. The first failure aborts the whole
/// forecast and no partial series is returned.
#[instrument(skip(forecaster))]
pub async fn compute_forecast(
    forecaster: &dyn Forecaster,
    latest_period: i32,
    horizon: u32,
) -> Result<PredictionSeries> {
    if horizon == 0 {
        return Err(ComputeError::Configuration(
            "Forecast horizon must be at least one period".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(horizon as usize);
    for offset in 1..=horizon as i32 {
        let period = latest_period + offset;
        let value = forecaster.predict(period).await.map_err(|e| {
            error!("Forecast for period {} failed: {}", period, e);
            match e {
                ComputeError::Prediction { .. } => e,
                other => ComputeError::Prediction {
                    period,
                    reason: other.to_string(),
                },
            }
        })?;
        if value < Decimal::ZERO {
            error!("Forecast for period {} is negative: {}", period, value);
            return Err(ComputeError::Prediction {
                period,
                reason: format!("negative prediction {}", value),
            });
        }
        debug!("Predicted {} for period {}", value, period);
        records.push(ConsumptionRecord::new(period, value));
    }

    info!(
        "Forecast computed for periods {}..={}",
        latest_period + 1,
        latest_period + horizon as i32
    );
    PredictionSeries::new(records)
}

/// Calls a SQL function of the warehouse, e.g. a deployed model UDF, as
/// `SELECT <function>(period) AS value`, cast to a numeric type.
#[derive(Debug, Clone)]
pub struct SqlFunctionForecaster {
    db: DatabaseConnection,
    function: String,
}

impl SqlFunctionForecaster {
    /// `function` must be a plain identifier, optionally schema qualified
    /// (`PREDICT_CONSUMPTION`, `analytics.predict_consumption`).
    pub fn new(db: DatabaseConnection, function: impl Into<String>) -> Result<Self> {
        let function = function.into();
        if !is_qualified_identifier(&function) {
            return Err(ComputeError::Configuration(format!(
                "Invalid forecast function name '{}'",
                function
            )));
        }
        Ok(Self { db, function })
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    fn statement(&self, period: i32) -> Statement {
        let backend = self.db.get_database_backend();
        // Model functions may return integers or floats; decode as one type
        let sql = match backend {
            DbBackend::Postgres => format!("SELECT {}($1)::numeric AS value", self.function),
            _ => format!("SELECT CAST({}(?) AS REAL) AS value", self.function),
        };
        Statement::from_sql_and_values(backend, sql, [period.into()])
    }
}

fn is_qualified_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[async_trait]
impl Forecaster for SqlFunctionForecaster {
    async fn predict(&self, period: i32) -> Result<Decimal> {
        let prediction_error = |reason: String| ComputeError::Prediction { period, reason };

        let row = self
            .db
            .query_one(self.statement(period))
            .await
            .map_err(|e| prediction_error(e.to_string()))?
            .ok_or_else(|| prediction_error(format!("{} returned no row", self.function)))?;

        row.try_get::<Decimal>("", "value")
            .map_err(|e| prediction_error(e.to_string()))
    }
}

/// Adapts a plain function or closure into a [`Forecaster`].
pub struct FnForecaster<F> {
    predict: F,
}

impl<F> FnForecaster<F>
where
    F: Fn(i32) -> std::result::Result<Decimal, String> + Send + Sync,
{
    pub fn new(predict: F) -> Self {
        Self { predict }
    }
}

impl<F> fmt::Debug for FnForecaster<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnForecaster").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Forecaster for FnForecaster<F>
where
    F: Fn(i32) -> std::result::Result<Decimal, String> + Send + Sync,
{
    async fn predict(&self, period: i32) -> Result<Decimal> {
        (self.predict)(period).map_err(|reason| ComputeError::Prediction { period, reason })
    }
}
