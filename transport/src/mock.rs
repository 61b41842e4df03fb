//! Mock transport implementation
//!
//! A mock implementation of the verification transport for development and
//! testing. No service is contacted: initiation is logged to the console and
//! codes verify against a canned expected code.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use pv_core::domain::{
    is_valid_phone_number, mask_phone_number, CustomData, VerificationMethod, VerificationOutcome,
};
use pv_core::errors::TransportError;
use pv_core::transport::VerificationTransport;

/// Default code accepted by the mock transport
pub const MOCK_EXPECTED_CODE: &str = "123456";

#[derive(Debug, Clone)]
struct MockSession {
    verification_id: String,
    phone_number: String,
    method: VerificationMethod,
}

/// Mock verification transport for development and testing
///
/// This implementation:
/// - Logs verification requests instead of contacting a service
/// - Validates phone numbers
/// - Generates mock verification ids
/// - Tracks request count for testing
#[derive(Clone, Debug)]
pub struct MockTransport {
    /// Counter for tracking number of started verifications
    request_count: Arc<AtomicU64>,
    /// In-flight mock verification
    session: Arc<RwLock<Option<MockSession>>>,
    /// Code that `verify` accepts
    expected_code: String,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
    /// Whether to print requests to console
    console_output: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            session: Arc::new(RwLock::new(None)),
            expected_code: MOCK_EXPECTED_CODE.to_string(),
            simulate_failure: false,
            console_output: true,
        }
    }

    /// Create a mock transport with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            console_output,
            simulate_failure,
            ..Self::new()
        }
    }

    /// Override the code that `verify` accepts
    pub fn with_expected_code(mut self, code: impl Into<String>) -> Self {
        self.expected_code = code.into();
        self
    }

    /// Get the total number of verifications started
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    async fn start(
        &self,
        phone_number: &str,
        custom: &CustomData,
        method: VerificationMethod,
    ) -> Result<VerificationOutcome, TransportError> {
        if !is_valid_phone_number(phone_number) {
            return Err(TransportError::InvalidInput(format!(
                "phone number must be in E.164 format: {}",
                mask_phone_number(phone_number)
            )));
        }

        if self.simulate_failure {
            warn!(
                phone = %mask_phone_number(phone_number),
                "mock transport simulating failure"
            );
            return Err(TransportError::ServiceError {
                message: "simulated verification failure".to_string(),
                reference: None,
            });
        }

        let verification_id = format!("mock_{}", Uuid::new_v4());
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let masked_phone = mask_phone_number(phone_number);

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK VERIFICATION - REQUEST #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {} (masked: {})", phone_number, masked_phone);
            println!("Method: {}", method);
            println!("Verification ID: {}", verification_id);
            println!("Expected code: {}", self.expected_code);
            println!("Custom data: {:?}", custom);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "verification_transport",
            backend = "mock",
            phone = %masked_phone,
            method = %method,
            verification_id = %verification_id,
            "mock verification started"
        );

        *self.session.write().await = Some(MockSession {
            verification_id: verification_id.clone(),
            phone_number: phone_number.to_string(),
            method,
        });

        Ok(VerificationOutcome::new(method).with_id(verification_id))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationTransport for MockTransport {
    async fn send_sms(
        &self,
        _application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError> {
        self.start(phone_number, custom, VerificationMethod::Sms)
            .await
    }

    async fn send_flash_call(
        &self,
        _application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError> {
        self.start(phone_number, custom, VerificationMethod::FlashCall)
            .await
    }

    async fn verify(&self, code: &str) -> Result<VerificationOutcome, TransportError> {
        let session = match self.session.read().await.clone() {
            Some(session) => session,
            None => return Err(TransportError::NoActiveVerification),
        };

        if code != self.expected_code {
            warn!(
                phone = %mask_phone_number(&session.phone_number),
                "mock verification rejected code"
            );
            return Err(TransportError::IncorrectCode);
        }

        *self.session.write().await = None;

        info!(
            phone = %mask_phone_number(&session.phone_number),
            verification_id = %session.verification_id,
            "mock verification completed"
        );

        Ok(VerificationOutcome::new(session.method).with_id(session.verification_id))
    }

    async fn reset(&self) {
        *self.session.write().await = None;
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
