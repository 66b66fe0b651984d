use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message used when an upstream error body carries no usable `message`.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed to fetch activities";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No credentials on the inbound request.
    #[error("No token provided")]
    Unauthenticated,

    /// The activity service answered with a non-2xx status.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// Transport failures, malformed payloads and anything else unplanned.
    /// The cause is logged and never sent to the caller.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the request outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Upstream { .. } => "upstream_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Unauthenticated => json!({ "message": "No token provided" }),
            ApiError::Upstream { message, .. } => json!({ "error": message }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "Error fetching today's activities");
                json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
