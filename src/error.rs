use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shell::Mode;

/// Input problems caught before anything is sent to the model.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Please upload an image first.")]
    MissingImage,

    #[error("Please enter a trigger word.")]
    MissingTriggerWord,
}

/// Errors returned by the request builder.
///
/// `Failed` displays only the generic message for its mode. The real cause
/// stays reachable through [`std::error::Error::source`] for logging.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("{}", .mode.failure_message())]
    Failed {
        mode: Mode,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad upload: {0}")]
    BadUpload(String),

    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadUpload(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
        };
        tracing::warn!(status = %status, error = %self, "❌ Request rejected");
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
