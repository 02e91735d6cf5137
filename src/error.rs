use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BuddyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("requested size {requested} exceeds the limit of {limit} bytes")]
    SizeLimitExceeded { requested: u64, limit: u64 },

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("generation cancelled")]
    Cancelled,

    #[error("{0}")]
    Generation(String),

    #[error("{kind} #{id} not found or expired")]
    NotFound { kind: String, id: i64 },

    /// A route that is switched off by configuration.
    #[error("not found")]
    RouteDisabled,

    #[error("unauthorized")]
    Unauthorized,

    #[error("too many file generation requests")]
    RateLimited,

    #[error("export error: {0}")]
    Export(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl BuddyError {
    /// Wrap any failure raised inside the bulk generator.
    pub fn generation(cause: impl std::fmt::Display) -> Self {
        BuddyError::Generation(format!("file generation failed: {cause}"))
    }

    fn status_and_body(&self) -> (StatusCode, &'static str, String) {
        match self {
            BuddyError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            BuddyError::SizeLimitExceeded { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "SIZE_LIMIT_EXCEEDED",
                self.to_string(),
            ),
            BuddyError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            BuddyError::Cancelled => (
                // nginx-style "client closed request"
                StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
                "CANCELLED",
                self.to_string(),
            ),
            BuddyError::NotFound { .. } | BuddyError::RouteDisabled => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            BuddyError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "invalid or missing key".to_string(),
            ),
            BuddyError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT",
                self.to_string(),
            ),
            BuddyError::Generation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_ERROR",
                "Failed to generate data.".to_string(),
            ),
            BuddyError::Export(_) | BuddyError::Csv(_) | BuddyError::Yaml(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXPORT_ERROR",
                "Failed to export data.".to_string(),
            ),
            BuddyError::DatabaseError(_)
            | BuddyError::Json(_)
            | BuddyError::Io(_)
            | BuddyError::Config(_)
            | BuddyError::RactorError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred.".to_string(),
            ),
        }
    }
}

impl From<figment::Error> for BuddyError {
    fn from(e: figment::Error) -> Self {
        BuddyError::Config(Box::new(e))
    }
}

impl IntoResponse for BuddyError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let body = ApiErrorResponse {
            success: false,
            error: ApiErrorBody {
                code: code.to_string(),
                message,
                status_code: status.as_u16(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}
