//! Consumption report builder.
//!
//! Fetches the actual yearly consumption series, obtains a forecast for the
//! following periods (from a model or from an uploaded table), joins both on
//! period and derives the headline metrics.

pub mod error;
pub mod forecast;
pub mod metrics;
pub mod report;
pub mod series;
pub mod source;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ComputeError, Result};
pub use forecast::{DEFAULT_HORIZON, FnForecaster, Forecaster, SqlFunctionForecaster};
pub use metrics::ReportMetrics;
pub use report::{ConsumptionReport, ForecastSource, ReportBuilder};
pub use series::{
    ActualSeries, CombinedPoint, CombinedSeries, ConsumptionRecord, PredictionOrigin,
    PredictionSeries,
};
pub use source::ConsumptionSource;
