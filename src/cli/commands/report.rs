use anyhow::{Context, Result};
use compute::{ConsumptionReport, ForecastSource, ReportBuilder, SqlFunctionForecaster};
use sea_orm::Database;
use std::fs::File;
use tracing::{debug, info};

use crate::config::Settings;

/// Builds a report against the configured warehouse and prints it.
pub async fn report(settings: &Settings, upload: Option<&str>) -> Result<()> {
    debug!("Database URL: {}", settings.database_url);
    let db = Database::connect(&settings.database_url)
        .await
        .context("Failed to connect to database")?;

    let builder = ReportBuilder::new(&db).with_horizon(settings.forecast_horizon);
    let report = match upload {
        Some(path) => {
            info!("Using uploaded forecast from {}", path);
            let file = File::open(path).with_context(|| format!("Failed to open file: {}", path))?;
            let predictions = compute::upload::parse_prediction_upload(file)?;
            builder.build(ForecastSource::Upload(predictions)).await?
        }
        None => {
            let forecaster = SqlFunctionForecaster::new(db.clone(), settings.forecast_function.as_str())?;
            info!("Forecasting {} periods with {}", builder.horizon(), forecaster.function());
            builder.build(ForecastSource::Model(&forecaster)).await?
        }
    };

    print_report(&report)
}

fn print_report(report: &ConsumptionReport) -> Result<()> {
    println!("Actual consumption (kt)");
    println!("{}", report.actuals.to_dataframe()?);
    println!();
    println!("Actual and predicted consumption (kt, {:?} forecast)", report.prediction_origin);
    println!("{}", report.combined.to_dataframe()?);
    println!();

    let m = &report.metrics;
    println!("Latest actual ({}): {} kt ({:+} vs prior period)", m.latest_period, m.latest_actual, m.delta_vs_prior_period);
    println!(
        "Forecast {}: {} kt ({:+} vs latest actual)",
        m.first_forecast_period, m.first_forecast_value, m.delta_forecast_vs_latest_actual
    );
    println!(
        "Forecast {}: {} kt ({:+} vs latest actual)",
        m.second_forecast_period, m.second_forecast_value, m.delta_second_forecast_vs_latest_actual
    );
    Ok(())
}
