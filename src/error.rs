use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Caller-supplied input that cannot be turned into a prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No past dates provided")]
    EmptyHistory,
    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate { input: String },
    #[error("Lookback must be a positive integer")]
    InvalidLookback,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Anything that goes wrong once the input has been accepted.
    #[error("Prediction error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("text generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("text generation service returned no candidates")]
    EmptyResponse,
}

/// Errors surfaced to HTTP clients. Rendered as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("{message}")]
    MalformedBody { status: StatusCode, message: String },
    /// Chat failures carry the user-facing apology, never the upstream cause.
    #[error("{0}")]
    ChatUnavailable(&'static str),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Prediction(PredictionError::Validation(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Prediction(PredictionError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Prediction(PredictionError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::MalformedBody { status, .. } => *status,
            AppError::ChatUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
