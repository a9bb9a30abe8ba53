use common::{
    AuthStatus, CombinedConsumptionPoint, ConsumptionMetrics, ConsumptionPoint,
    ConsumptionReport, Identity, LoginRequest, LoginResponse, PredictionOrigin,
};
use compute::Forecaster;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

use crate::auth::{Authenticator, SessionStore};

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Model used for the default forecast
    pub forecaster: Arc<dyn Forecaster>,
    /// Periods forecast when a request does not ask for a horizon
    pub forecast_horizon: u32,
    /// Login gate; `None` serves every route without a session
    pub auth: Option<Arc<Authenticator>>,
    /// Active login sessions
    pub sessions: SessionStore,
}

/// Query parameters for the report endpoint
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Number of forecast periods (default: configured horizon)
    #[validate(range(min = 2, max = 10))]
    pub horizon: Option<u32>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::consumption::get_consumption_actuals,
        crate::handlers::consumption::get_consumption_report,
        crate::handlers::consumption::upload_consumption_report,
        crate::handlers::auth::login,
        crate::handlers::auth::auth_status,
        crate::handlers::auth::logout,
    ),
    components(
        schemas(
            ApiResponse<Vec<ConsumptionPoint>>,
            ApiResponse<ConsumptionReport>,
            ApiResponse<AuthStatus>,
            ApiResponse<LoginResponse>,
            ErrorResponse,
            HealthResponse,
            ReportQuery,
            ConsumptionPoint,
            CombinedConsumptionPoint,
            ConsumptionMetrics,
            ConsumptionReport,
            PredictionOrigin,
            AuthStatus,
            Identity,
            LoginRequest,
            LoginResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "consumption", description = "Actual and forecast LPG consumption"),
        (name = "auth", description = "Login sessions"),
    ),
    info(
        title = "EPPO Consumption Dashboard API",
        description = "Yearly LPG consumption of Thailand with a three-year forecast",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
