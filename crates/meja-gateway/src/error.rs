//! # Gateway Error Types
//!
//! Error types for configuration and every outbound call.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gateway Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Upstream            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  UpstreamStatus         │ │
//! │  │  ConfigLoad     │  │  Timeout        │  │  InvalidResponse        │ │
//! │  │  ConfigSave     │  │                 │  │  MissingOrderCode       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Payment      │  │    QR Token     │                              │
//! │  │                 │  │                 │                              │
//! │  │  PaymentRejected│  │  InvalidToken   │                              │
//! │  │  MissingQr      │  │                 │                              │
//! │  │  BadSignature   │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error type covering configuration and outbound failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the remote host.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request did not complete in time.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Upstream Errors
    // =========================================================================
    /// Non-success HTTP status from the restaurant API.
    #[error("Upstream returned HTTP {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// Response body could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Order was accepted but no order code came back.
    #[error("Upstream did not return an order code")]
    MissingOrderCode,

    // =========================================================================
    // Payment Errors
    // =========================================================================
    /// The payment gateway refused the request.
    #[error("Payment rejected ({status_code}): {message}")]
    PaymentRejected { status_code: String, message: String },

    /// Charge succeeded but carried no QR string or QR action.
    #[error("Payment gateway returned no QR code")]
    MissingQrCode,

    /// Charge amount below what the gateway accepts.
    #[error("Payment amount {amount} is below the minimum of {minimum}")]
    AmountTooSmall { amount: i64, minimum: i64 },

    /// Webhook signature did not match.
    #[error("Notification signature mismatch")]
    InvalidSignature,

    // =========================================================================
    // QR Token Errors
    // =========================================================================
    /// Token is neither a valid JWT nor a decryptable blob.
    #[error("Invalid QR token: {0}")]
    InvalidToken(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// JSON encode/decode failed.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(0)
        } else if err.is_decode() {
            GatewayError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::UpstreamStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            GatewayError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        GatewayError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for GatewayError {
    fn from(err: toml::ser::Error) -> Self {
        GatewayError::ConfigSaveFailed(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for GatewayError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        GatewayError::InvalidToken(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl GatewayError {
    /// Converts a send failure, reporting timeouts with the limit that was hit.
    pub fn from_send(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(timeout_secs)
        } else {
            GatewayError::from(err)
        }
    }

    /// Returns true if the same request may succeed when tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::ConnectionFailed(_) | GatewayError::Timeout(_) => true,
            GatewayError::UpstreamStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidConfig(_)
                | GatewayError::ConfigLoadFailed(_)
                | GatewayError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the customer sent something we refuse (bad token,
    /// forged webhook, amount too small) rather than a remote failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidToken(_)
                | GatewayError::InvalidSignature
                | GatewayError::AmountTooSmall { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(GatewayError::ConnectionFailed("refused".into()).is_retryable());
        assert!(GatewayError::Timeout(30).is_retryable());
        assert!(GatewayError::UpstreamStatus { status: 503, message: "busy".into() }.is_retryable());

        assert!(!GatewayError::UpstreamStatus { status: 404, message: "gone".into() }.is_retryable());
        assert!(!GatewayError::InvalidSignature.is_retryable());
        assert!(!GatewayError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_categories() {
        assert!(GatewayError::ConfigLoadFailed("missing".into()).is_config_error());
        assert!(GatewayError::InvalidToken("garbage".into()).is_client_error());
        assert!(!GatewayError::MissingOrderCode.is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::PaymentRejected {
            status_code: "406".into(),
            message: "duplicate order id".into(),
        };
        assert!(err.to_string().contains("406"));
        assert!(err.to_string().contains("duplicate order id"));
    }
}
