//! Completion normalization for asynchronous verification calls
//!
//! Transports and platform SDKs report completion through different
//! mechanisms (futures, callbacks, listener objects). This module flattens
//! all of them into one contract: per invocation the caller sees exactly one
//! [`VerificationEvent`], carrying either a success outcome or an error,
//! never both and never neither. A [`Completion`] that is dropped without
//! being resolved still delivers an event (a `Cancelled` error), which is
//! what keeps the "never zero" half of the contract honest even when the
//! producing task dies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::domain::VerificationOutcome;
use crate::errors::{ClientError, ErrorResponse, TransportError};

/// Normalized completion signal for one verification call
///
/// Invariant: exactly one of `outcome` and `error` is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationEvent {
    /// Success outcome, absent on failure
    pub outcome: Option<VerificationOutcome>,
    /// Error response, absent on success
    pub error: Option<ErrorResponse>,
    /// When the event was produced
    pub at: DateTime<Utc>,
}

impl VerificationEvent {
    /// Build a success event
    pub fn success(outcome: VerificationOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            error: None,
            at: Utc::now(),
        }
    }

    /// Build a failure event
    pub fn failure(error: &ClientError) -> Self {
        Self {
            outcome: None,
            error: Some(ErrorResponse::from(error)),
            at: Utc::now(),
        }
    }

    /// Whether this event carries a success outcome
    pub fn is_success(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Producer half of a completion channel
///
/// `succeed` and `fail` consume the completion, so a resolved completion can
/// never fire twice. Dropping it unresolved delivers a `Cancelled` failure.
pub struct Completion {
    sender: Option<oneshot::Sender<VerificationEvent>>,
}

impl Completion {
    /// Create a completion and the handle that receives its event
    pub fn channel() -> (Self, CompletionHandle) {
        let (tx, rx) = oneshot::channel();
        (Self { sender: Some(tx) }, CompletionHandle { receiver: rx })
    }

    /// Resolve with a success outcome
    pub fn succeed(mut self, outcome: VerificationOutcome) {
        self.send(VerificationEvent::success(outcome));
    }

    /// Resolve with an error
    pub fn fail(mut self, error: &ClientError) {
        self.send(VerificationEvent::failure(error));
    }

    fn send(&mut self, event: VerificationEvent) {
        if let Some(sender) = self.sender.take() {
            // The receiver may already be gone; nothing left to notify then.
            let _ = sender.send(event);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::warn!("completion dropped unresolved, delivering cancellation");
            self.send(VerificationEvent::failure(&ClientError::Transport(
                TransportError::Cancelled,
            )));
        }
    }
}

/// Consumer half of a completion channel
pub struct CompletionHandle {
    receiver: oneshot::Receiver<VerificationEvent>,
}

impl CompletionHandle {
    /// Wait for the completion event
    ///
    /// Always yields an event: if the producing side vanished entirely the
    /// event is a `Cancelled` failure.
    pub async fn wait(self) -> VerificationEvent {
        match self.receiver.await {
            Ok(event) => event,
            Err(_) => VerificationEvent::failure(&ClientError::Transport(
                TransportError::Cancelled,
            )),
        }
    }
}
