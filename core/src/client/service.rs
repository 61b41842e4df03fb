//! Verification client implementation
//!
//! The client owns the active transport (selected once at initialization,
//! never reassigned) and the application key (single writer, many readers).
//! It validates preconditions, delegates the remote work to the transport,
//! and performs no retries, caching, or ordering of its own. Callers that
//! need ordering between concurrent calls must sequence them themselves.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{mask_phone_number, CustomData, VerificationOutcome};
use crate::errors::{ClientError, ClientResult};
use crate::platform::{select_transport, Platform, TransportRegistry};
use crate::transport::VerificationTransport;

use super::callback::{Completion, VerificationEvent};

/// Client for starting and completing phone number verifications
pub struct VerificationClient {
    /// Active transport, resolved once at initialization
    transport: Arc<dyn VerificationTransport>,
    /// Application key; set via `configure`, read by every start call
    application_key: RwLock<Option<String>>,
}

impl std::fmt::Debug for VerificationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationClient").finish_non_exhaustive()
    }
}

impl VerificationClient {
    /// Initialize the client for the platform of the running process
    ///
    /// Resolves the active transport eagerly so that a missing integration
    /// fails here, at startup, with a descriptive error instead of deep
    /// inside the first verification call.
    ///
    /// # Errors
    ///
    /// * [`ClientError::UnsupportedPlatform`] - platform outside the
    ///   supported set
    /// * [`ClientError::IntegrationMissing`] - no transport registered for
    ///   the current platform
    pub fn initialize(registry: &TransportRegistry) -> ClientResult<Self> {
        Self::initialize_for(registry, &Platform::current())
    }

    /// Initialize the client for an explicit platform
    ///
    /// Used by integration code that resolves the platform itself, and by
    /// tests.
    pub fn initialize_for(
        registry: &TransportRegistry,
        platform: &Platform,
    ) -> ClientResult<Self> {
        let transport = select_transport(registry, platform)?;
        info!(
            platform = %platform,
            backend = transport.backend_name(),
            "verification client initialized"
        );
        Ok(Self {
            transport,
            application_key: RwLock::new(None),
        })
    }

    /// Create a client directly on a transport, bypassing platform selection
    pub fn with_transport(transport: Arc<dyn VerificationTransport>) -> Self {
        Self {
            transport,
            application_key: RwLock::new(None),
        }
    }

    /// Set the application key
    ///
    /// Idempotent; last write wins. No network effect.
    pub async fn configure(&self, application_key: impl Into<String>) {
        let key = application_key.into();
        let mut slot = self.application_key.write().await;
        if slot.is_some() {
            debug!("application key reconfigured");
        }
        *slot = Some(key);
    }

    /// Whether an application key has been configured
    pub async fn is_configured(&self) -> bool {
        self.application_key.read().await.is_some()
    }

    /// Name of the active transport backend
    pub fn backend_name(&self) -> &str {
        self.transport.backend_name()
    }

    /// Start an SMS verification
    ///
    /// Requires a configured application key; fails with
    /// [`ClientError::NotConfigured`] otherwise, without touching the
    /// transport.
    pub async fn start_sms(
        &self,
        phone_number: &str,
        custom: &CustomData,
    ) -> ClientResult<VerificationOutcome> {
        let key = self.require_key().await?;
        debug!(
            phone = %mask_phone_number(phone_number),
            method = "sms",
            "starting verification"
        );
        let outcome = self.transport.send_sms(&key, phone_number, custom).await?;
        info!(
            phone = %mask_phone_number(phone_number),
            verification_id = outcome.verification_id.as_deref().unwrap_or("-"),
            "sms verification initiated"
        );
        Ok(outcome)
    }

    /// Start a flash-call verification
    ///
    /// Same precondition as [`start_sms`](Self::start_sms).
    pub async fn start_flash_call(
        &self,
        phone_number: &str,
        custom: &CustomData,
    ) -> ClientResult<VerificationOutcome> {
        let key = self.require_key().await?;
        debug!(
            phone = %mask_phone_number(phone_number),
            method = "flashcall",
            "starting verification"
        );
        let outcome = self
            .transport
            .send_flash_call(&key, phone_number, custom)
            .await?;
        info!(
            phone = %mask_phone_number(phone_number),
            verification_id = outcome.verification_id.as_deref().unwrap_or("-"),
            "flash call verification initiated"
        );
        Ok(outcome)
    }

    /// Submit a user-provided code for the verification in flight
    ///
    /// Deliberately not gated on `configure`: the code is checked against
    /// the session the transport already holds, which was created with the
    /// key, so requiring the key again would add nothing but a failure mode.
    pub async fn verify_code(&self, code: &str) -> ClientResult<VerificationOutcome> {
        let outcome = self.transport.verify(code).await?;
        info!("verification code accepted");
        Ok(outcome)
    }

    /// Drop any in-flight verification session on the active transport
    pub async fn reset(&self) {
        self.transport.reset().await;
        debug!("verification session reset");
    }

    async fn require_key(&self) -> ClientResult<String> {
        match self.application_key.read().await.as_ref() {
            Some(key) => Ok(key.clone()),
            None => {
                warn!("verification requested before configure()");
                Err(ClientError::NotConfigured)
            }
        }
    }
}

/// Callback-style surface
///
/// Each wrapper spawns the async call and delivers exactly one
/// [`VerificationEvent`] to the supplied callback, routed through a
/// [`Completion`] so the callback still fires (with a cancellation error)
/// if the producing task dies.
impl VerificationClient {
    /// Start an SMS verification and deliver the result to `on_complete`
    pub fn start_sms_with<F>(
        self: &Arc<Self>,
        phone_number: String,
        custom: CustomData,
        on_complete: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(VerificationEvent) + Send + 'static,
    {
        let client = Arc::clone(self);
        self.dispatch(on_complete, |completion| async move {
            resolve(completion, client.start_sms(&phone_number, &custom).await);
        })
    }

    /// Start a flash-call verification and deliver the result to `on_complete`
    pub fn start_flash_call_with<F>(
        self: &Arc<Self>,
        phone_number: String,
        custom: CustomData,
        on_complete: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(VerificationEvent) + Send + 'static,
    {
        let client = Arc::clone(self);
        self.dispatch(on_complete, |completion| async move {
            resolve(
                completion,
                client.start_flash_call(&phone_number, &custom).await,
            );
        })
    }

    /// Submit a verification code and deliver the result to `on_complete`
    pub fn verify_code_with<F>(
        self: &Arc<Self>,
        code: String,
        on_complete: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(VerificationEvent) + Send + 'static,
    {
        let client = Arc::clone(self);
        self.dispatch(on_complete, |completion| async move {
            resolve(completion, client.verify_code(&code).await);
        })
    }

    fn dispatch<F, P, Fut>(&self, on_complete: F, produce: P) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(VerificationEvent) + Send + 'static,
        P: FnOnce(Completion) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (completion, handle) = Completion::channel();
        tokio::spawn(produce(completion));
        tokio::spawn(async move {
            on_complete(handle.wait().await);
        })
    }
}

fn resolve(completion: Completion, result: ClientResult<VerificationOutcome>) {
    match result {
        Ok(outcome) => completion.succeed(outcome),
        Err(err) => completion.fail(&err),
    }
}
