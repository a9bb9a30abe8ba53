//! Report assembly: fetch the actuals, take the predictions from the model or
//! an upload, combine both series and derive the headline metrics.
//!
//! Every step must succeed. A failure anywhere aborts the report and nothing
//! partial is returned.

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::forecast::{DEFAULT_HORIZON, Forecaster, compute_forecast};
use crate::metrics::{ReportMetrics, compute_metrics};
use crate::series::{ActualSeries, CombinedSeries, PredictionOrigin, PredictionSeries};
use crate::source::{ConsumptionSource, fetch_actuals};
use crate::upload::check_upload_periods;

/// Where the predictions of a report come from.
pub enum ForecastSource<'a> {
    /// Ask the model for the periods after the latest actual.
    Model(&'a dyn Forecaster),
    /// Use an uploaded table instead of the model, without merging.
    Upload(PredictionSeries),
}

impl ForecastSource<'_> {
    fn origin(&self) -> PredictionOrigin {
        match self {
            ForecastSource::Model(_) => PredictionOrigin::Model,
            ForecastSource::Upload(_) => PredictionOrigin::Upload,
        }
    }
}

/// Everything the dashboard shows for one render.
#[derive(Debug, Clone)]
pub struct ConsumptionReport {
    pub actuals: ActualSeries,
    pub predictions: PredictionSeries,
    pub prediction_origin: PredictionOrigin,
    pub combined: CombinedSeries,
    pub metrics: ReportMetrics,
}

/// Builds a [`ConsumptionReport`] from a consumption source.
///
/// The builder keeps no state between builds; each call queries the source
/// once and recomputes everything.
pub struct ReportBuilder<'a> {
    source: &'a dyn ConsumptionSource,
    horizon: u32,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(source: &'a dyn ConsumptionSource) -> Self {
        Self {
            source,
            horizon: DEFAULT_HORIZON,
        }
    }

    /// Number of periods requested from the model.
    pub fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    #[instrument(skip_all, fields(horizon = self.horizon))]
    pub async fn build(&self, forecast: ForecastSource<'_>) -> Result<ConsumptionReport> {
        let actuals = fetch_actuals(self.source).await?;
        let prediction_origin = forecast.origin();

        let predictions = match forecast {
            ForecastSource::Model(forecaster) => {
                // fetch_actuals never returns an empty series
                let latest_period = actuals.latest().map_or(0, |r| r.period);
                compute_forecast(forecaster, latest_period, self.horizon).await?
            }
            ForecastSource::Upload(predictions) => {
                debug!("Using {} uploaded prediction rows", predictions.len());
                check_upload_periods(&actuals, &predictions);
                predictions
            }
        };

        let combined = CombinedSeries::combine(&actuals, &predictions);
        let metrics = compute_metrics(&actuals, &predictions)?;

        info!(
            "Report built: {} actual rows, {} predicted rows ({:?})",
            actuals.len(),
            predictions.len(),
            prediction_origin
        );

        Ok(ConsumptionReport {
            actuals,
            predictions,
            prediction_origin,
            combined,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputeError;
    use crate::forecast::FnForecaster;
    use crate::testing::{StaticSource, dec, seed_consumption, setup_db};
    use crate::upload::parse_prediction_upload;
    use rust_decimal::Decimal;

    fn identity_forecaster() -> FnForecaster<impl Fn(i32) -> std::result::Result<Decimal, String>> {
        FnForecaster::new(|period| Ok(Decimal::from(period)))
    }

    #[tokio::test]
    async fn test_build_with_model_forecast() {
        let source = StaticSource::new(&[(2020, "100.004"), (2019, "90.0")]);
        let forecaster = identity_forecaster();

        let report = ReportBuilder::new(&source)
            .build(ForecastSource::Model(&forecaster))
            .await
            .unwrap();

        assert_eq!(report.prediction_origin, PredictionOrigin::Model);
        let predicted: Vec<i32> = report.predictions.records().iter().map(|r| r.period).collect();
        assert_eq!(predicted, vec![2021, 2022, 2023]);

        let periods: Vec<i32> = report.combined.periods().collect();
        assert_eq!(periods, vec![2019, 2020, 2021, 2022, 2023]);

        assert_eq!(report.metrics.latest_actual, dec("100.00"));
        assert_eq!(report.metrics.delta_vs_prior_period.to_string(), "10.00");
        assert_eq!(report.metrics.first_forecast_value, dec("2021"));
        assert_eq!(report.metrics.delta_forecast_vs_latest_actual, dec("1921"));
    }

    #[tokio::test]
    async fn test_upload_replaces_model_forecast() {
        let source = StaticSource::new(&[(2020, "100"), (2019, "90")]);
        let upload = parse_prediction_upload("year,value\n2021,50.5\n2022,60.25\n".as_bytes())
            .unwrap();

        let report = ReportBuilder::new(&source)
            .build(ForecastSource::Upload(upload))
            .await
            .unwrap();

        assert_eq!(report.prediction_origin, PredictionOrigin::Upload);
        let predicted: Vec<(i32, String)> = report
            .predictions
            .records()
            .iter()
            .map(|r| (r.period, r.value.to_string()))
            .collect();
        assert_eq!(
            predicted,
            vec![(2021, "50.50".to_string()), (2022, "60.25".to_string())]
        );
        assert_eq!(report.combined.len(), 4);
        assert_eq!(report.metrics.delta_forecast_vs_latest_actual, dec("-49.50"));
        assert_eq!(report.metrics.delta_second_forecast_vs_latest_actual, dec("-39.75"));
    }

    #[tokio::test]
    async fn test_overlapping_upload_is_accepted() {
        let source = StaticSource::new(&[(2020, "100"), (2019, "90")]);
        let upload = parse_prediction_upload("y,v\n2020,99\n2021,101\n".as_bytes()).unwrap();

        let report = ReportBuilder::new(&source)
            .build(ForecastSource::Upload(upload))
            .await
            .unwrap();

        let overlap = report.combined.get(2020).unwrap();
        assert_eq!(overlap.actual, Some(dec("100")));
        assert_eq!(overlap.prediction, Some(dec("99")));
    }

    #[tokio::test]
    async fn test_single_actual_row_is_insufficient() {
        let source = StaticSource::new(&[(2020, "100")]);
        let forecaster = identity_forecaster();

        let result = ReportBuilder::new(&source)
            .build(ForecastSource::Model(&forecaster))
            .await;

        assert!(matches!(result, Err(ComputeError::InsufficientData(_))));
    }

    #[tokio::test]
    async fn test_forecast_failure_fails_build() {
        let source = StaticSource::new(&[(2020, "100"), (2019, "90")]);
        let forecaster = FnForecaster::new(|_| Err("endpoint down".to_string()));

        let result = ReportBuilder::new(&source)
            .build(ForecastSource::Model(&forecaster))
            .await;

        assert!(matches!(
            result,
            Err(ComputeError::Prediction { period: 2021, .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_horizon() {
        let source = StaticSource::new(&[(2020, "100"), (2019, "90")]);
        let forecaster = identity_forecaster();

        let report = ReportBuilder::new(&source)
            .with_horizon(5)
            .build(ForecastSource::Model(&forecaster))
            .await
            .unwrap();

        assert_eq!(report.predictions.len(), 5);
        assert_eq!(report.predictions.records()[4].period, 2025);
    }

    #[tokio::test]
    async fn test_build_from_database() {
        let db = setup_db().await;
        seed_consumption(&db, &[(2018, "80.25"), (2019, "85.5"), (2020, "91.125")]).await;
        let forecaster = FnForecaster::new(|_| Ok(dec("95")));

        let report = ReportBuilder::new(&db)
            .build(ForecastSource::Model(&forecaster))
            .await
            .unwrap();

        assert_eq!(report.actuals.len(), 3);
        assert_eq!(report.metrics.latest_period, 2020);
        assert_eq!(report.metrics.latest_actual, dec("91.12"));
        assert_eq!(report.metrics.delta_vs_prior_period, dec("5.62"));
        assert_eq!(report.metrics.delta_forecast_vs_latest_actual, dec("3.88"));
    }

    #[tokio::test]
    async fn test_empty_database_is_data_access_error() {
        let db = setup_db().await;
        let forecaster = identity_forecaster();

        let result = ReportBuilder::new(&db)
            .build(ForecastSource::Model(&forecaster))
            .await;

        assert!(matches!(result, Err(ComputeError::DataAccess(_))));
    }
}
