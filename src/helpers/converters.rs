//! Conversions from compute results to the API payloads of `common`.

use common::{
    CombinedConsumptionPoint, ConsumptionMetrics, ConsumptionPoint, ConsumptionReport,
    PredictionOrigin,
};
use compute::{ActualSeries, ConsumptionRecord, ReportMetrics};

pub fn to_point(record: &ConsumptionRecord) -> ConsumptionPoint {
    ConsumptionPoint {
        period: record.period,
        value: record.value,
    }
}

/// Actual series as shown in the table, newest period first.
pub fn actuals_to_points(actuals: &ActualSeries) -> Vec<ConsumptionPoint> {
    actuals.descending().map(to_point).collect()
}

fn origin_to_dto(origin: compute::PredictionOrigin) -> PredictionOrigin {
    match origin {
        compute::PredictionOrigin::Model => PredictionOrigin::Model,
        compute::PredictionOrigin::Upload => PredictionOrigin::Upload,
    }
}

fn metrics_to_dto(metrics: ReportMetrics) -> ConsumptionMetrics {
    ConsumptionMetrics {
        latest_period: metrics.latest_period,
        latest_actual: metrics.latest_actual,
        delta_vs_prior_period: metrics.delta_vs_prior_period,
        first_forecast_period: metrics.first_forecast_period,
        first_forecast_value: metrics.first_forecast_value,
        delta_forecast_vs_latest_actual: metrics.delta_forecast_vs_latest_actual,
        second_forecast_period: metrics.second_forecast_period,
        second_forecast_value: metrics.second_forecast_value,
        delta_second_forecast_vs_latest_actual: metrics.delta_second_forecast_vs_latest_actual,
    }
}

/// Converts a built report into its API payload.
///
/// Actuals are listed newest first, predictions and the combined series in
/// ascending period order.
pub fn report_to_dto(report: compute::ConsumptionReport) -> ConsumptionReport {
    ConsumptionReport {
        actuals: actuals_to_points(&report.actuals),
        predictions: report.predictions.records().iter().map(to_point).collect(),
        prediction_origin: origin_to_dto(report.prediction_origin),
        combined: report
            .combined
            .iter()
            .map(|(period, point)| CombinedConsumptionPoint {
                period,
                actual: point.actual,
                prediction: point.prediction,
            })
            .collect(),
        metrics: metrics_to_dto(report.metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_actuals_are_listed_newest_first() {
        let actuals = ActualSeries::new(vec![
            ConsumptionRecord::new(2018, dec("1")),
            ConsumptionRecord::new(2020, dec("3")),
            ConsumptionRecord::new(2019, dec("2")),
        ])
        .unwrap();

        let periods: Vec<i32> = actuals_to_points(&actuals).iter().map(|p| p.period).collect();

        assert_eq!(periods, vec![2020, 2019, 2018]);
    }
}
