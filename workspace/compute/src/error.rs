use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// The consumption query failed, returned no rows, or returned malformed rows
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// The forecaster failed for a period; the whole forecast is discarded
    #[error("Prediction error for period {period}: {reason}")]
    Prediction { period: i32, reason: String },

    /// Fewer rows than a delta computation needs
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An uploaded replacement table could not be read as (period, value) rows
    #[error("Upload format error: {0}")]
    UploadFormat(String),

    /// Error from Polars DataFrame operations
    #[error("DataFrame error: {0}")]
    DataFrame(String),

    /// Invalid builder or forecaster configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<polars::error::PolarsError> for ComputeError {
    fn from(error: polars::error::PolarsError) -> Self {
        let err = match error {
            polars::error::PolarsError::ShapeMismatch(_) => {
                ComputeError::DataFrame(format!("Shape mismatch: {}", error))
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                ComputeError::DataFrame(format!("Schema mismatch: {}", error))
            }
            polars::error::PolarsError::Duplicate(_) => {
                ComputeError::DataFrame(format!("Duplicate column: {}", error))
            }
            _ => ComputeError::DataFrame(error.to_string()),
        };
        error!(?err, "DataFrame error");
        err
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
