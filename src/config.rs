use anyhow::{Context, Result, bail};
use compute::{DEFAULT_HORIZON, SqlFunctionForecaster};
use ::config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use sea_orm::Database;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::{Authenticator, CredentialStore, SessionStore};
use crate::schemas::AppState;

/// Forecast horizons the API and CLI accept; the metrics need two predictions.
pub const HORIZON_RANGE: RangeInclusive<u32> = 2..=10;

/// Application settings.
///
/// Layered from built-in defaults, an optional `eppo.toml` in the working
/// directory and `EPPO_*` environment variables (e.g. `EPPO_DATABASE_URL`).
/// CLI arguments are applied on top by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SeaORM database URL of the warehouse
    pub database_url: String,
    /// Bind address for the web server
    pub bind_address: String,
    /// SQL function of the warehouse that predicts consumption for a year
    pub forecast_function: String,
    /// Number of future periods forecast per report
    pub forecast_horizon: u32,
    /// JSON credential file; the login gate is disabled when unset
    pub credentials_path: Option<String>,
    /// Lifetime of a login session
    pub session_ttl_secs: u64,
}

impl Settings {
    /// Builder pre-loaded with the default values.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("database_url", "sqlite://eppo.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("forecast_function", "PREDICT_CONSUMPTION")?
            .set_default("forecast_horizon", i64::from(DEFAULT_HORIZON))?
            .set_default("session_ttl_secs", 3600_i64)?)
    }

    /// Loads settings from `.env`, `eppo.toml` and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Self::builder()?
            .add_source(File::with_name("eppo").required(false))
            .add_source(Environment::with_prefix("EPPO").try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?;
        settings.validate()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Rejects values the report endpoints could never serve.
    pub fn validate(&self) -> Result<()> {
        if !HORIZON_RANGE.contains(&self.forecast_horizon) {
            bail!(
                "forecast_horizon must be between {} and {}, got {}",
                HORIZON_RANGE.start(),
                HORIZON_RANGE.end(),
                self.forecast_horizon
            );
        }
        if self.session_ttl_secs == 0 {
            bail!("session_ttl_secs must be positive");
        }
        Ok(())
    }
}

/// Initialize application state from settings
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    settings.validate()?;
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    let forecaster = SqlFunctionForecaster::new(db.clone(), settings.forecast_function.as_str())?;
    info!("Forecasts via SQL function {}", forecaster.function());

    let auth = match &settings.credentials_path {
        Some(path) => {
            let store = CredentialStore::load(path)
                .with_context(|| format!("Failed to load credentials from {}", path))?;
            info!("Login gate enabled for {} users", store.len());
            Some(Arc::new(Authenticator::new(store)))
        }
        None => {
            info!("Login gate disabled");
            None
        }
    };

    Ok(AppState {
        db,
        forecaster: Arc::new(forecaster),
        forecast_horizon: settings.forecast_horizon,
        auth,
        sessions: SessionStore::new(Duration::from_secs(settings.session_ttl_secs)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    #[test]
    fn test_defaults() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.bind_address, "0.0.0.0:3000");
        assert_eq!(settings.forecast_function, "PREDICT_CONSUMPTION");
        assert_eq!(settings.forecast_horizon, 3);
        assert_eq!(settings.session_ttl_secs, 3600);
        assert!(settings.credentials_path.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            database_url = "postgresql://eppo@localhost/warehouse"
            forecast_horizon = 5
            credentials_path = "config/credentials.json"
        "#;

        let settings: Settings = Settings::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.database_url, "postgresql://eppo@localhost/warehouse");
        assert_eq!(settings.forecast_horizon, 5);
        assert_eq!(
            settings.credentials_path.as_deref(),
            Some("config/credentials.json")
        );
        assert_eq!(settings.forecast_function, "PREDICT_CONSUMPTION");
    }

    fn settings_from(toml: &str) -> Settings {
        Settings::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_validate_rejects_out_of_range_horizon() {
        for toml in ["forecast_horizon = 1", "forecast_horizon = 0", "forecast_horizon = 11"] {
            let err = settings_from(toml).validate().unwrap_err();
            assert!(err.to_string().contains("forecast_horizon"), "{}", err);
        }

        assert!(settings_from("forecast_horizon = 2").validate().is_ok());
        assert!(settings_from("forecast_horizon = 10").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_session_ttl() {
        assert!(settings_from("session_ttl_secs = 0").validate().is_err());
    }
}
