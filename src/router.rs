use crate::handlers::{
    auth::{auth_status, login, logout, require_session},
    consumption::{get_consumption_actuals, get_consumption_report, upload_consumption_report},
    health::health_check,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Consumption routes sit behind the login gate
    let consumption = Router::new()
        .route("/api/v1/consumption/actuals", get(get_consumption_actuals))
        .route(
            "/api/v1/consumption/report",
            get(get_consumption_report).post(upload_consumption_report),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Login sessions
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/status", get(auth_status))
        .route("/api/v1/auth/logout", post(logout))
        .merge(consumption)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
