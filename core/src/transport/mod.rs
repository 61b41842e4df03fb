//! Transport seam between the verification client and concrete backends
//!
//! A transport owns the wire protocol to the verification service (or wraps
//! a platform SDK). Retry policy, timeouts, and session bookkeeping all live
//! behind this trait; the client only delegates.

use async_trait::async_trait;

use crate::domain::{CustomData, VerificationOutcome};
use crate::errors::TransportError;

/// Capability interface implemented by every verification backend
///
/// Implementations include:
/// - REST transport against the verification service HTTP API
/// - Mock transport for development and testing
/// - Failover transport wrapping a primary and a backup
#[async_trait]
pub trait VerificationTransport: Send + Sync + std::fmt::Debug {
    /// Start an SMS verification for a phone number
    ///
    /// # Arguments
    ///
    /// * `application_key` - Tenant credential identifying the caller
    /// * `phone_number` - The number to verify (E.164 format)
    /// * `custom` - Opaque correlation data passed through to the service
    ///
    /// # Returns
    ///
    /// * `Ok(VerificationOutcome)` - The verification was initiated
    /// * `Err(TransportError)` - If the remote operation fails
    async fn send_sms(
        &self,
        application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError>;

    /// Start a flash-call verification for a phone number
    ///
    /// The service places a brief call whose caller ID encodes the
    /// verification code.
    async fn send_flash_call(
        &self,
        application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError>;

    /// Submit a user-provided code for the verification in flight
    ///
    /// Fails with [`TransportError::NoActiveVerification`] when no
    /// verification was started on this transport.
    async fn verify(&self, code: &str) -> Result<VerificationOutcome, TransportError>;

    /// Drop any in-flight verification session
    ///
    /// Default implementation is a no-op for stateless transports.
    async fn reset(&self) {}

    /// Name of the backend (e.g. "rest", "mock", "failover")
    fn backend_name(&self) -> &str;

    /// Check if the transport is available
    ///
    /// Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}
