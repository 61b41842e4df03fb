//! Client and transport error taxonomy
//!
//! Startup errors (`IntegrationMissing`, `UnsupportedPlatform`) halt
//! initialization instead of being deferred to the first call. Per-call
//! errors are delivered through the same completion channel as success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Convenience alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by the verification client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The current platform is supported but no transport was registered for
    /// it. Fatal at startup; the hint names the missing integration step.
    #[error("no transport registered for platform '{platform}': {hint}")]
    IntegrationMissing { platform: String, hint: String },

    /// The current platform is outside the supported set. Fatal at startup.
    #[error("unsupported platform '{os}'")]
    UnsupportedPlatform { os: String },

    /// An application key must be set via `configure` before starting a
    /// verification. Recoverable: configure and retry.
    #[error("application key not configured; call configure() first")]
    NotConfigured,

    /// The active transport failed during the remote operation
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::IntegrationMissing { .. } => "INTEGRATION_MISSING",
            ClientError::UnsupportedPlatform { .. } => "UNSUPPORTED_PLATFORM",
            ClientError::NotConfigured => "NOT_CONFIGURED",
            ClientError::Transport(e) => e.code(),
        }
    }

    /// Whether the caller can recover by correcting its own state and
    /// retrying. Startup errors are not retryable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ClientError::IntegrationMissing { .. } | ClientError::UnsupportedPlatform { .. }
        )
    }
}

/// Errors raised by a transport during the remote verification operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Invalid input on the client side (e.g. malformed phone number)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The submitted verification code was incorrect
    #[error("incorrect verification code")]
    IncorrectCode,

    /// Automatic code interception failed; the code must be submitted
    /// manually via `verify_code`
    #[error("code interception failed: {0}")]
    CodeInterception(String),

    /// `verify_code` was called with no verification in flight
    #[error("no active verification; call start_sms() or start_flash_call() first")]
    NoActiveVerification,

    /// The operation timed out
    #[error("verification timed out")]
    Timeout,

    /// The operation was cancelled before completion
    #[error("verification cancelled")]
    Cancelled,

    /// Network failure reaching the verification service
    #[error("network error: {0}")]
    Network(String),

    /// The service responded with a payload this client could not parse
    #[error("malformed response from verification service: {0}")]
    MalformedResponse(String),

    /// The verification service rejected the request. `reference` is the
    /// service-side trace reference when one was returned, usable when
    /// reporting the failure upstream.
    #[error("verification service error: {message}")]
    ServiceError {
        message: String,
        reference: Option<String>,
    },
}

impl TransportError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::InvalidInput(_) => "INVALID_INPUT",
            TransportError::IncorrectCode => "INCORRECT_CODE",
            TransportError::CodeInterception(_) => "CODE_INTERCEPTION_FAILED",
            TransportError::NoActiveVerification => "NO_ACTIVE_VERIFICATION",
            TransportError::Timeout => "TIMEOUT",
            TransportError::Cancelled => "CANCELLED",
            TransportError::Network(_) => "NETWORK_ERROR",
            TransportError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            TransportError::ServiceError { .. } => "SERVICE_ERROR",
        }
    }
}

/// Serializable error shape delivered through the completion channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

impl From<&ClientError> for ErrorResponse {
    fn from(error: &ClientError) -> Self {
        let response = ErrorResponse::new(error.code(), error);
        match error {
            ClientError::Transport(TransportError::ServiceError {
                reference: Some(reference),
                ..
            }) => response.with_detail("service_reference", serde_json::json!(reference)),
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_not_recoverable() {
        let err = ClientError::IntegrationMissing {
            platform: "android".to_string(),
            hint: "register a transport for android".to_string(),
        };
        assert!(!err.is_recoverable());

        let err = ClientError::UnsupportedPlatform {
            os: "plan9".to_string(),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn per_call_errors_are_recoverable() {
        assert!(ClientError::NotConfigured.is_recoverable());
        assert!(ClientError::Transport(TransportError::IncorrectCode).is_recoverable());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ClientError::NotConfigured.code(), "NOT_CONFIGURED");
        assert_eq!(TransportError::IncorrectCode.code(), "INCORRECT_CODE");
        assert_eq!(TransportError::Timeout.code(), "TIMEOUT");
    }

    #[test]
    fn service_reference_surfaces_in_response() {
        let err = ClientError::Transport(TransportError::ServiceError {
            message: "rejected".to_string(),
            reference: Some("ref-42".to_string()),
        });
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error, "SERVICE_ERROR");
        let details = response.details.expect("details present");
        assert_eq!(details["service_reference"], serde_json::json!("ref-42"));
    }
}
