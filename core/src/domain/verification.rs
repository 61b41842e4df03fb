//! Verification methods, pass-through data, and outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque key/value payload forwarded to the verification service unmodified.
///
/// The service echoes this data back in its callbacks, so applications use it
/// for client-side correlation. This layer never inspects the contents.
pub type CustomData = HashMap<String, String>;

/// The verification method requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    /// Verification code delivered in an SMS message
    Sms,
    /// Verification code encoded in the caller ID of a brief incoming call
    FlashCall,
}

impl VerificationMethod {
    /// Wire name used by the verification service
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::Sms => "sms",
            VerificationMethod::FlashCall => "flashcall",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful result of a verification operation
///
/// Produced once per call and not persisted. `data` carries whatever opaque
/// payload the transport's service returned (e.g. the CLI filter for a flash
/// call); callers that only care about success/failure can ignore it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Identifier the service assigned to this verification, if any
    pub verification_id: Option<String>,
    /// Which method produced this outcome
    pub method: VerificationMethod,
    /// Opaque service payload, passed through unmodified
    pub data: Option<serde_json::Value>,
    /// When the outcome was produced
    pub completed_at: DateTime<Utc>,
}

impl VerificationOutcome {
    /// Create an outcome with no service payload
    pub fn new(method: VerificationMethod) -> Self {
        Self {
            verification_id: None,
            method,
            data: None,
            completed_at: Utc::now(),
        }
    }

    /// Attach the service-assigned verification id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.verification_id = Some(id.into());
        self
    }

    /// Attach an opaque service payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_wire_names() {
        assert_eq!(VerificationMethod::Sms.as_str(), "sms");
        assert_eq!(VerificationMethod::FlashCall.as_str(), "flashcall");
    }

    #[test]
    fn outcome_builder() {
        let outcome = VerificationOutcome::new(VerificationMethod::Sms)
            .with_id("ver-123")
            .with_data(serde_json::json!({"ref": "abc"}));

        assert_eq!(outcome.verification_id.as_deref(), Some("ver-123"));
        assert_eq!(outcome.method, VerificationMethod::Sms);
        assert!(outcome.data.is_some());
    }
}
