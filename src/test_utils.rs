#[cfg(test)]
pub mod test_utils {
    use crate::auth::{Authenticator, CredentialRecord, CredentialStore, SessionStore, hash_password};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use compute::{FnForecaster, Forecaster};
    use migration::{Migrator, MigratorTrait};
    use model::entities::consumption;
    use rust_decimal::Decimal;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_USERNAME: &str = "somchai";
    pub const TEST_PASSWORD: &str = "lpg-2021";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    pub async fn seed_consumption(db: &DatabaseConnection, rows: &[(i32, &str)]) {
        for (year, value) in rows {
            consumption::ActiveModel {
                year: Set(*year),
                consumption_kt: Set(Decimal::from_str(value).unwrap()),
            }
            .insert(db)
            .await
            .expect("Failed to insert consumption row");
        }
    }

    /// Predicts `period / 20`, e.g. 101.05 for 2021.
    pub fn test_forecaster() -> Arc<dyn Forecaster> {
        Arc::new(FnForecaster::new(|period| Ok(Decimal::from(period) / Decimal::from(20))))
    }

    pub fn failing_forecaster() -> Arc<dyn Forecaster> {
        Arc::new(FnForecaster::new(|period| {
            if period > 2021 {
                Err("model endpoint unavailable".to_string())
            } else {
                Ok(Decimal::ONE)
            }
        }))
    }

    pub fn app_state(db: DatabaseConnection, forecaster: Arc<dyn Forecaster>) -> AppState {
        AppState {
            db,
            forecaster,
            forecast_horizon: 3,
            auth: None,
            sessions: SessionStore::new(Duration::from_secs(60)),
        }
    }

    /// Create AppState for testing, seeded with 2018-2020 actuals
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        seed_consumption(&db, &[(2018, "80.25"), (2019, "85.5"), (2020, "91.125")]).await;
        app_state(db, test_forecaster())
    }

    /// Same as [`setup_test_app_state`] with the login gate enabled for one user.
    pub async fn setup_test_app_state_with_auth() -> AppState {
        let store = CredentialStore::from_records(vec![CredentialRecord {
            name: "Somchai Prasert".to_string(),
            username: TEST_USERNAME.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
        }])
        .unwrap();

        let mut state = setup_test_app_state().await;
        state.auth = Some(Arc::new(Authenticator::new(store)));
        state
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| Level::from_str(&level).ok())
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn setup_test_app_with(state: AppState) -> Router {
        let _guard = init_test_tracing();
        create_router(state)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        setup_test_app_with(setup_test_app_state().await)
    }

    pub async fn setup_test_app_with_auth() -> Router {
        setup_test_app_with(setup_test_app_state_with_auth().await)
    }
}
