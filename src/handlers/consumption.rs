use crate::helpers::converters::{actuals_to_points, report_to_dto};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ReportQuery};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{ConsumptionPoint, ConsumptionReport};
use compute::{ComputeError, ForecastSource, ReportBuilder};
use tracing::{debug, error, info, instrument, trace, warn};

/// Maps a compute failure to the status and error code returned to clients.
pub fn compute_error_response(err: ComputeError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        ComputeError::DataAccess(_) => (StatusCode::SERVICE_UNAVAILABLE, "DATA_ACCESS_ERROR"),
        ComputeError::Prediction { .. } => (StatusCode::BAD_GATEWAY, "PREDICTION_ERROR"),
        ComputeError::InsufficientData(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_DATA")
        }
        ComputeError::UploadFormat(_) => (StatusCode::BAD_REQUEST, "UPLOAD_FORMAT_ERROR"),
        ComputeError::DataFrame(_) | ComputeError::Configuration(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    if status.is_server_error() {
        error!("Report request failed: {}", err);
    } else {
        warn!("Report request rejected: {}", err);
    }

    (status, Json(ErrorResponse::new(err.to_string(), code)))
}

/// Get the actual consumption series
#[utoipa::path(
    get,
    path = "/api/v1/consumption/actuals",
    tag = "consumption",
    responses(
        (status = 200, description = "Actual consumption, newest period first", body = ApiResponse<Vec<ConsumptionPoint>>),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 503, description = "Consumption data unavailable", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_consumption_actuals(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ConsumptionPoint>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_consumption_actuals function");

    let actuals = compute::source::fetch_actuals(&state.db)
        .await
        .map_err(compute_error_response)?;

    info!("Retrieved {} actual consumption rows", actuals.len());
    Ok(Json(ApiResponse {
        data: actuals_to_points(&actuals),
        message: "Actual consumption retrieved successfully".to_string(),
        success: true,
    }))
}

/// Build the report with the model forecast
#[utoipa::path(
    get,
    path = "/api/v1/consumption/report",
    tag = "consumption",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report built successfully", body = ApiResponse<ConsumptionReport>),
        (status = 400, description = "Invalid horizon", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 422, description = "Not enough rows for the metrics", body = ErrorResponse),
        (status = 502, description = "Forecast failed", body = ErrorResponse),
        (status = 503, description = "Consumption data unavailable", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_consumption_report(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ReportQuery>>,
) -> Result<Json<ApiResponse<ConsumptionReport>>, (StatusCode, Json<ErrorResponse>)> {
    let horizon = query.horizon.unwrap_or(state.forecast_horizon);
    debug!("Building report with a {} period forecast", horizon);

    let report = ReportBuilder::new(&state.db)
        .with_horizon(horizon)
        .build(ForecastSource::Model(state.forecaster.as_ref()))
        .await
        .map_err(compute_error_response)?;

    Ok(Json(ApiResponse {
        data: report_to_dto(report),
        message: "Consumption report built successfully".to_string(),
        success: true,
    }))
}

/// Build the report with an uploaded forecast
///
/// The body is a CSV table with a header row; the first column is the period
/// and the second the predicted value. It replaces the model forecast.
#[utoipa::path(
    post,
    path = "/api/v1/consumption/report",
    tag = "consumption",
    request_body(content = String, content_type = "text/csv", description = "Two-column CSV of period and value"),
    responses(
        (status = 200, description = "Report built successfully", body = ApiResponse<ConsumptionReport>),
        (status = 400, description = "Upload could not be read", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 422, description = "Not enough rows for the metrics", body = ErrorResponse),
        (status = 503, description = "Consumption data unavailable", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn upload_consumption_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<ConsumptionReport>>, (StatusCode, Json<ErrorResponse>)> {
    // Encoding errors surface from the CSV reader as upload format errors
    let predictions =
        compute::upload::parse_prediction_upload(&body[..]).map_err(compute_error_response)?;
    debug!("Upload parsed into {} prediction rows", predictions.len());

    let report = ReportBuilder::new(&state.db)
        .build(ForecastSource::Upload(predictions))
        .await
        .map_err(compute_error_response)?;

    Ok(Json(ApiResponse {
        data: report_to_dto(report),
        message: "Consumption report built from uploaded forecast".to_string(),
        success: true,
    }))
}
