//! Headline metrics shown above the consumption chart.

use rust_decimal::Decimal;
use tracing::instrument;

use crate::error::{ComputeError, Result};
use crate::series::{ActualSeries, PredictionSeries};

/// Latest actual value, its change against the prior period, and the first
/// two forecasts compared with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetrics {
    pub latest_period: i32,
    pub latest_actual: Decimal,
    pub delta_vs_prior_period: Decimal,
    pub first_forecast_period: i32,
    pub first_forecast_value: Decimal,
    pub delta_forecast_vs_latest_actual: Decimal,
    pub second_forecast_period: i32,
    pub second_forecast_value: Decimal,
    pub delta_second_forecast_vs_latest_actual: Decimal,
}

/// Derives [`ReportMetrics`] from the two most recent actuals and the two
/// earliest predictions.
///
/// Fails with [`ComputeError::InsufficientData`] if either series has fewer
/// than two rows.
#[instrument(skip_all, fields(actuals = actuals.len(), predictions = predictions.len()))]
pub fn compute_metrics(
    actuals: &ActualSeries,
    predictions: &PredictionSeries,
) -> Result<ReportMetrics> {
    let (Some(latest), Some(prior)) = (actuals.latest(), actuals.prior()) else {
        return Err(ComputeError::InsufficientData(format!(
            "At least 2 actual rows are required, got {}",
            actuals.len()
        )));
    };

    let [first, second, ..] = predictions.records() else {
        return Err(ComputeError::InsufficientData(format!(
            "At least 2 predicted rows are required, got {}",
            predictions.len()
        )));
    };

    Ok(ReportMetrics {
        latest_period: latest.period,
        latest_actual: latest.value,
        delta_vs_prior_period: latest.value - prior.value,
        first_forecast_period: first.period,
        first_forecast_value: first.value,
        delta_forecast_vs_latest_actual: first.value - latest.value,
        second_forecast_period: second.period,
        second_forecast_value: second.value,
        delta_second_forecast_vs_latest_actual: second.value - latest.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::ConsumptionRecord;
    use crate::testing::dec;

    fn actuals(rows: &[(i32, &str)]) -> ActualSeries {
        ActualSeries::new(
            rows.iter()
                .map(|(p, v)| ConsumptionRecord::new(*p, dec(v)))
                .collect(),
        )
        .unwrap()
    }

    fn predictions(rows: &[(i32, &str)]) -> PredictionSeries {
        PredictionSeries::new(
            rows.iter()
                .map(|(p, v)| ConsumptionRecord::new(*p, dec(v)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_metrics_from_rounded_actuals() {
        let metrics = compute_metrics(
            &actuals(&[(2020, "100.004"), (2019, "90.0")]),
            &predictions(&[(2021, "105.5"), (2022, "98.25"), (2023, "120")]),
        )
        .unwrap();

        assert_eq!(metrics.latest_period, 2020);
        assert_eq!(metrics.latest_actual.to_string(), "100.00");
        assert_eq!(metrics.delta_vs_prior_period.to_string(), "10.00");
        assert_eq!(metrics.first_forecast_period, 2021);
        assert_eq!(metrics.first_forecast_value, dec("105.50"));
        assert_eq!(metrics.delta_forecast_vs_latest_actual.to_string(), "5.50");
        assert_eq!(metrics.second_forecast_period, 2022);
        assert_eq!(metrics.second_forecast_value, dec("98.25"));
        assert_eq!(metrics.delta_second_forecast_vs_latest_actual.to_string(), "-1.75");
    }

    #[test]
    fn test_delta_uses_next_lower_period_not_previous_year() {
        // 2018 is missing; the prior period of 2019 is 2017
        let metrics = compute_metrics(
            &actuals(&[(2017, "80"), (2019, "95.5"), (2015, "10")]),
            &predictions(&[(2020, "1"), (2021, "2")]),
        )
        .unwrap();

        assert_eq!(metrics.latest_period, 2019);
        assert_eq!(metrics.delta_vs_prior_period, dec("15.5"));
    }

    #[test]
    fn test_single_actual_row_is_insufficient() {
        let result = compute_metrics(
            &actuals(&[(2020, "100")]),
            &predictions(&[(2021, "1"), (2022, "2")]),
        );

        assert!(matches!(result, Err(ComputeError::InsufficientData(_))));
    }

    #[test]
    fn test_single_prediction_row_is_insufficient() {
        let result = compute_metrics(
            &actuals(&[(2019, "90"), (2020, "100")]),
            &predictions(&[(2021, "1")]),
        );

        assert!(matches!(result, Err(ComputeError::InsufficientData(_))));
    }

    #[test]
    fn test_empty_predictions_are_insufficient() {
        let result = compute_metrics(&actuals(&[(2019, "90"), (2020, "100")]), &predictions(&[]));

        assert!(matches!(result, Err(ComputeError::InsufficientData(_))));
    }
}
