use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::pipeline::PipelineError;
use crate::core::storage::StorageError;
use crate::core::tts::TTSError;

/// Errors surfaced by HTTP handlers.
///
/// `Display` carries the full internal detail for logs. Clients only ever see
/// [`AppError::client_message`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("script not found: {0}")]
    ScriptNotFound(String),

    #[error("script unusable: {0}")]
    ScriptUnusable(String),

    #[error("bad upload: {0}")]
    BadUpload(String),

    #[error("upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("speech synthesis rate limited: {0}")]
    SynthesisRateLimited(String),

    #[error("speech synthesis timed out")]
    SynthesisTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ScriptNotFound(_) => StatusCode::NOT_FOUND,
            Self::ScriptUnusable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadUpload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::StorageUnavailable(_) | Self::SynthesisRateLimited(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::SynthesisFailed(_) => StatusCode::BAD_GATEWAY,
            Self::SynthesisTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to HTTP clients.
    pub fn client_message(&self) -> String {
        match self {
            Self::ScriptNotFound(key) => format!("Script '{key}' was not found."),
            Self::ScriptUnusable(reason) => format!("Script cannot be synthesized: {reason}."),
            Self::BadUpload(reason) => format!("Invalid upload: {reason}."),
            Self::PayloadTooLarge(_) => "Uploaded file is too large.".to_string(),
            Self::StorageUnavailable(_) => "Object storage is unavailable.".to_string(),
            Self::SynthesisFailed(_) => "Speech synthesis failed.".to_string(),
            Self::SynthesisRateLimited(_) => {
                "Speech synthesis is rate limited, try again later.".to_string()
            }
            Self::SynthesisTimeout => "Speech synthesis timed out.".to_string(),
            Self::Internal(_) => "Internal server error.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            tracing::info!("Request rejected: {}", self);
        }

        (
            status,
            Json(json!({
                "message": self.client_message(),
                "error": true,
            })),
        )
            .into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { key, .. } => Self::ScriptNotFound(key),
            StorageError::InvalidUtf8 { .. } => {
                Self::ScriptUnusable("content is not valid UTF-8".to_string())
            }
            StorageError::Unavailable { .. } => Self::StorageUnavailable(err.to_string()),
            StorageError::InvalidKey { .. }
            | StorageError::Io { .. }
            | StorageError::Configuration(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TTSError> for AppError {
    fn from(err: TTSError) -> Self {
        match err {
            TTSError::EmptyText => Self::ScriptUnusable("script is empty".to_string()),
            TTSError::RateLimited => Self::SynthesisRateLimited(err.to_string()),
            TTSError::Timeout => Self::SynthesisTimeout,
            TTSError::InvalidConfiguration(_) => Self::Internal(err.to_string()),
            TTSError::Unauthorized(_)
            | TTSError::Rejected { .. }
            | TTSError::ProviderError(_)
            | TTSError::NetworkError(_)
            | TTSError::StreamInterrupted(_) => Self::SynthesisFailed(err.to_string()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Storage(e) => e.into(),
            PipelineError::Synthesis(e) => e.into(),
            PipelineError::EmptyScript { .. } => Self::ScriptUnusable("script is empty".to_string()),
            PipelineError::EmptyAudio => {
                Self::SynthesisFailed("provider returned zero bytes of audio".to_string())
            }
            PipelineError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadUpload(err.body_text())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
