use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::dashboards::d410_rankings::{ErrorBody, ErrorDetail};

use crate::shared::analytics::AnalyticsError;
use crate::system::auth::scope::ScopeDenied;

/// Error returned by analytics handlers, rendered as
/// `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug)]
pub enum ApiError {
    Analytics(AnalyticsError),
    BadRequest(String),
    Forbidden(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analytics(e) => match e {
                AnalyticsError::InvalidRange(_) | AnalyticsError::InvalidFilterCombination(_) => {
                    StatusCode::BAD_REQUEST
                }
                AnalyticsError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AnalyticsError::ExecutorFailure(_) | AnalyticsError::PartialResultForbidden(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message) = match self {
            ApiError::Analytics(e) => (e.code(), e.public_message()),
            ApiError::BadRequest(m) => ("bad_request", m.clone()),
            ApiError::Forbidden(m) => ("forbidden", m.clone()),
            ApiError::Internal(_) => ("internal_error", "Internal server error".to_string()),
        };
        ErrorDetail {
            code: code.to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Analytics(e) if !e.is_client_error() => {
                tracing::error!("Analytics request failed: {}", e)
            }
            ApiError::Internal(m) => tracing::error!("Internal error: {}", m),
            other => tracing::debug!("Rejected request: {:?}", other),
        }
        (status, Json(ErrorBody { error: self.detail() })).into_response()
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        ApiError::Analytics(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<ScopeDenied> for ApiError {
    fn from(e: ScopeDenied) -> Self {
        ApiError::Forbidden(e.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", e))
    }
}
