//! Failover transport implementation
//!
//! Wraps a primary and a backup transport and switches to the backup when
//! the primary fails with a service-level error (network, timeout, service
//! rejection). After a configurable recovery timeout the primary is tried
//! again.
//!
//! Failing over between `start` and `verify` drops the in-flight session on
//! the old side; callers in that situation receive `NoActiveVerification`
//! and must start over.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use pv_core::domain::{CustomData, VerificationOutcome};
use pv_core::errors::TransportError;
use pv_core::transport::VerificationTransport;

/// State tracking for the failover transport
#[derive(Debug, Clone, Default)]
struct FailoverState {
    /// Whether we're currently using the backup transport
    using_backup: bool,
    /// When the primary transport last failed
    last_primary_failure: Option<Instant>,
    /// Number of consecutive failures on primary
    primary_failure_count: u32,
}

/// Verification transport with automatic failover capability
pub struct FailoverTransport {
    /// Primary transport (e.g. REST against the main region)
    primary: Arc<dyn VerificationTransport>,
    /// Backup transport to fail over to
    backup: Arc<dyn VerificationTransport>,
    /// Failover state
    state: RwLock<FailoverState>,
    /// How long to wait before retrying primary after a failure
    failover_timeout: Duration,
}

impl std::fmt::Debug for FailoverTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverTransport").finish_non_exhaustive()
    }
}

impl FailoverTransport {
    /// Create a new failover transport
    ///
    /// # Arguments
    ///
    /// * `primary` - The transport to prefer
    /// * `backup` - The transport to fail over to
    /// * `failover_timeout` - How long to wait before retrying the primary
    pub fn new(
        primary: Arc<dyn VerificationTransport>,
        backup: Arc<dyn VerificationTransport>,
        failover_timeout: Duration,
    ) -> Self {
        info!(
            primary = primary.backend_name(),
            backup = backup.backend_name(),
            "initializing failover transport"
        );

        Self {
            primary,
            backup,
            state: RwLock::new(FailoverState::default()),
            failover_timeout,
        }
    }

    /// Check if we should try the primary transport
    async fn should_try_primary(&self) -> bool {
        let state = self.state.read().await;

        if !state.using_backup {
            return true;
        }

        match state.last_primary_failure {
            Some(last_failure) => last_failure.elapsed() > self.failover_timeout,
            None => true,
        }
    }

    /// Record a primary failure and switch to backup
    async fn record_primary_failure(&self) {
        let mut state = self.state.write().await;

        state.primary_failure_count += 1;
        state.last_primary_failure = Some(Instant::now());

        if !state.using_backup {
            warn!(
                failures = state.primary_failure_count,
                backup = self.backup.backend_name(),
                "primary transport failed, switching to backup"
            );
            state.using_backup = true;
        }
    }

    /// Record a primary success and switch back if we were on backup
    async fn record_primary_success(&self) {
        let mut state = self.state.write().await;

        if state.using_backup {
            info!(
                primary = self.primary.backend_name(),
                "primary transport recovered, switching back"
            );
        }
        state.using_backup = false;
        state.primary_failure_count = 0;
        state.last_primary_failure = None;
    }

    /// The transport `verify` and `reset` should address right now
    async fn active(&self) -> Arc<dyn VerificationTransport> {
        if self.state.read().await.using_backup {
            Arc::clone(&self.backup)
        } else {
            Arc::clone(&self.primary)
        }
    }
}

/// Whether an error indicates the transport itself is unhealthy, as opposed
/// to the caller's input being wrong
fn is_failover_worthy(error: &TransportError) -> bool {
    matches!(
        error,
        TransportError::Network(_)
            | TransportError::Timeout
            | TransportError::ServiceError { .. }
    )
}

macro_rules! send_with_failover {
    ($self:ident, $method:ident, $key:ident, $phone:ident, $custom:ident) => {{
        if $self.should_try_primary().await {
            match $self.primary.$method($key, $phone, $custom).await {
                Ok(outcome) => {
                    $self.record_primary_success().await;
                    return Ok(outcome);
                }
                Err(e) if is_failover_worthy(&e) => {
                    warn!(error = %e, "primary transport call failed");
                    $self.record_primary_failure().await;
                }
                Err(e) => return Err(e),
            }
        }
        $self.backup.$method($key, $phone, $custom).await
    }};
}

#[async_trait]
impl VerificationTransport for FailoverTransport {
    async fn send_sms(
        &self,
        application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError> {
        send_with_failover!(self, send_sms, application_key, phone_number, custom)
    }

    async fn send_flash_call(
        &self,
        application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError> {
        send_with_failover!(self, send_flash_call, application_key, phone_number, custom)
    }

    async fn verify(&self, code: &str) -> Result<VerificationOutcome, TransportError> {
        // The code belongs to the session on whichever side started it, so
        // verify is never a reason to switch sides.
        self.active().await.verify(code).await
    }

    async fn reset(&self) {
        self.primary.reset().await;
        self.backup.reset().await;
    }

    fn backend_name(&self) -> &str {
        "failover"
    }

    async fn is_available(&self) -> bool {
        self.primary.is_available().await || self.backup.is_available().await
    }
}
