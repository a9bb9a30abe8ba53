use crate::auth::bearer_token;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use common::{AuthStatus, LoginRequest, LoginResponse};
use tracing::{debug, error, info, instrument, warn};

/// Log in with a username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Username and password are blank", body = ErrorResponse),
        (status = 401, description = "Unknown user or wrong password", body = ErrorResponse),
        (status = 404, description = "Login is not enabled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let Some(auth) = state.auth.clone() else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Login is not enabled", "AUTH_DISABLED")),
        ));
    };

    let LoginRequest { username, password } = request;
    debug!("Login attempt for '{}'", username);
    let status = tokio::task::spawn_blocking(move || auth.check(&username, &password))
        .await
        .map_err(|e| {
            error!("Credential check panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Credential check failed", "INTERNAL_ERROR")),
            )
        })?;

    match status {
        AuthStatus::Authenticated { identity } => {
            let token = state.sessions.open(identity.clone()).await;
            info!("Session opened for '{}'", identity.username);
            Ok(Json(ApiResponse {
                data: LoginResponse {
                    token,
                    status: AuthStatus::Authenticated { identity },
                    expires_in_secs: state.sessions.ttl().as_secs(),
                },
                message: "Logged in successfully".to_string(),
                success: true,
            }))
        }
        AuthStatus::Pending => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Please enter your username and password",
                "CREDENTIALS_MISSING",
            )),
        )),
        AuthStatus::Rejected => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Username/password is incorrect",
                "INVALID_CREDENTIALS",
            )),
        )),
    }
}

/// Get the status of the presented session token
#[utoipa::path(
    get,
    path = "/api/v1/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "Session status", body = ApiResponse<AuthStatus>)
    )
)]
#[instrument(skip_all)]
pub async fn auth_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ApiResponse<AuthStatus>> {
    let status = state.sessions.status(bearer_token(&headers)).await;
    Json(ApiResponse {
        data: status,
        message: "Session status retrieved successfully".to_string(),
        success: true,
    })
}

/// End the presented session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session closed", body = ApiResponse<AuthStatus>),
        (status = 401, description = "No active session", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<AuthStatus>>, (StatusCode, Json<ErrorResponse>)> {
    let closed = match bearer_token(&headers) {
        Some(token) => state.sessions.close(token).await,
        None => false,
    };

    if !closed {
        warn!("Logout without an active session");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("No active session", "SESSION_REJECTED")),
        ));
    }

    Ok(Json(ApiResponse {
        data: AuthStatus::Pending,
        message: "Logged out successfully".to_string(),
        success: true,
    }))
}

/// Rejects requests without a live session while the login gate is enabled.
pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.auth.is_none() {
        return next.run(request).await;
    }

    let token = bearer_token(request.headers()).map(str::to_owned);
    match state.sessions.status(token.as_deref()).await {
        AuthStatus::Authenticated { identity } => {
            debug!("Request authorized for '{}'", identity.username);
            next.run(request).await
        }
        AuthStatus::Pending => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Login required", "AUTHENTICATION_REQUIRED")),
        )
            .into_response(),
        AuthStatus::Rejected => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Session is unknown or expired",
                "SESSION_REJECTED",
            )),
        )
            .into_response(),
    }
}
