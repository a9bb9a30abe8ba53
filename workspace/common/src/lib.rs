//! Common transport-layer types shared between the API and its clients.
//! These structs are the request/response payloads of the HTTP handlers so
//! a dashboard front end can deserialize responses without duplicating shapes.

mod auth;
mod consumption;

pub use auth::{AuthStatus, Identity, LoginRequest, LoginResponse};
pub use consumption::{
    CombinedConsumptionPoint, ConsumptionMetrics, ConsumptionPoint, ConsumptionReport,
    PredictionOrigin,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}
