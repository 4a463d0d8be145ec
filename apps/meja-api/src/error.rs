//! Error types for the HTTP surface.
//!
//! Every failure leaves the server as `{ "code": "...", "message": "..." }`
//! with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meja_core::CoreError;
use meja_db::DbError;
use meja_gateway::GatewayError;
use serde::Serialize;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Upstream timeout: {0}")]
    GatewayTimeout(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serialized error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::GatewayTimeout(_) => "GATEWAY_TIMEOUT",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadGateway(msg)
            | ApiError::GatewayTimeout(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidLineItem(_) | CoreError::Validation(_) => {
                ApiError::InvalidRequest(err.to_string())
            }
            CoreError::IndexOutOfRange { .. } | CoreError::UnknownPricingView(_) => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::EmptyCart => ApiError::Conflict(err.to_string()),
            CoreError::NoSession => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<meja_core::ValidationError> for ApiError {
    fn from(err: meja_core::ValidationError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Unavailable(_) | DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                ApiError::Unavailable(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidToken(_) | GatewayError::InvalidSignature => {
                ApiError::Unauthorized(err.to_string())
            }
            GatewayError::AmountTooSmall { .. } => ApiError::InvalidRequest(err.to_string()),
            GatewayError::Timeout(_) => ApiError::GatewayTimeout(err.to_string()),
            GatewayError::UpstreamStatus { status: 404, .. } => ApiError::NotFound(err.to_string()),
            GatewayError::SerializationFailed(_) | GatewayError::Internal(_) => {
                ApiError::Internal(err.to_string())
            }
            ref e if e.is_config_error() => ApiError::Unavailable(err.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(
            ApiError::from(CoreError::IndexOutOfRange { index: 3, len: 1 }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::from(CoreError::NoSession).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(CoreError::EmptyCart).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(CoreError::InvalidLineItem("x".into())).code(),
            "INVALID_REQUEST"
        );
    }

    #[test]
    fn test_gateway_error_mapping() {
        assert_eq!(
            ApiError::from(GatewayError::InvalidToken("bad".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::from(GatewayError::Timeout(30)).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ApiError::from(GatewayError::InvalidConfig("no key".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(GatewayError::ConnectionFailed("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(GatewayError::UpstreamStatus { status: 404, message: String::new() })
                .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_db_error_mapping() {
        assert_eq!(
            ApiError::from(DbError::Unavailable("disk full".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(DbError::QueryFailed("syntax".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_shape() {
        let response = ApiError::NotFound("no such order".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
