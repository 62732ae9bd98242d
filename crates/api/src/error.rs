use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use meshtex_comfyui::api::EngineApiError;
use meshtex_core::convert::ConvertError;

/// Application-level error type for the texture pipeline and HTTP
/// handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error
/// responses: validation failures map to 400, everything else to 500.
/// Internal detail (paths, transport errors) goes to the server log,
/// not the response body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad caller input; rejected before any side effects.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The workflow template or another startup configuration piece is
    /// missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The engine rejected the job or was unreachable.
    #[error("Submission failed: {0}")]
    Submission(#[from] EngineApiError),

    /// The engine reported failure, the event stream broke, or the
    /// timeout elapsed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// A required output file was absent after retrieval.
    #[error("Missing artifact: {0}")]
    ArtifactMissing(&'static str),

    /// The external conversion utility failed.
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// An unexpected I/O failure (context creation, reading the
    /// converted file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                msg.clone(),
            ),
            AppError::Submission(err) => {
                tracing::error!(error = %err, "Job submission failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SUBMISSION_ERROR",
                    "Failed to submit job to the generation engine".to_string(),
                )
            }
            AppError::ExecutionFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXECUTION_FAILED",
                msg.clone(),
            ),
            AppError::ArtifactMissing(role) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ARTIFACT_MISSING",
                format!("Generation produced no {role} file"),
            ),
            AppError::Conversion(err) => {
                tracing::error!(error = %err, "Mesh conversion failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONVERSION_ERROR",
                    "Mesh conversion failed".to_string(),
                )
            }
            AppError::Io(err) => {
                tracing::error!(error = %err, "Internal I/O error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
