use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One (period, value) row of a consumption table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ConsumptionPoint {
    /// Calendar year
    pub period: i32,
    /// Consumption in kt, two decimal places
    #[schema(value_type = String, example = "100.00")]
    pub value: Decimal,
}

/// One period of the chart series: the actual and/or predicted value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CombinedConsumptionPoint {
    pub period: i32,
    #[schema(value_type = Option<String>)]
    pub actual: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub prediction: Option<Decimal>,
}

/// Which path produced the predictions of a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionOrigin {
    /// Forecast by the prediction model
    Model,
    /// Replaced by an uploaded table
    Upload,
}

/// Headline metrics of a report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ConsumptionMetrics {
    pub latest_period: i32,
    #[schema(value_type = String)]
    pub latest_actual: Decimal,
    /// Latest actual minus the actual of the period before it
    #[schema(value_type = String)]
    pub delta_vs_prior_period: Decimal,
    pub first_forecast_period: i32,
    #[schema(value_type = String)]
    pub first_forecast_value: Decimal,
    /// First forecast minus the latest actual
    #[schema(value_type = String)]
    pub delta_forecast_vs_latest_actual: Decimal,
    pub second_forecast_period: i32,
    #[schema(value_type = String)]
    pub second_forecast_value: Decimal,
    /// Second forecast minus the latest actual
    #[schema(value_type = String)]
    pub delta_second_forecast_vs_latest_actual: Decimal,
}

/// Complete dashboard payload for one render.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ConsumptionReport {
    /// Actual values, most recent period first
    pub actuals: Vec<ConsumptionPoint>,
    /// Predicted values, earliest period first
    pub predictions: Vec<ConsumptionPoint>,
    pub prediction_origin: PredictionOrigin,
    /// Actuals and predictions keyed by period, earliest first
    pub combined: Vec<CombinedConsumptionPoint>,
    pub metrics: ConsumptionMetrics,
}
