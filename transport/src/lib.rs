//! # Verification Transports
//!
//! Concrete implementations of the [`pv_core::VerificationTransport`] seam:
//!
//! - **REST**: talks to the verification service HTTP API via `reqwest`,
//!   with retry, timeout, and Basic authentication
//! - **Mock**: console/log output for development and testing
//! - **Failover**: wraps a primary and a backup transport with automatic
//!   switchover and recovery
//!
//! The [`create_transport`] factory picks an implementation from
//! configuration, and [`default_registry`] wires it into a platform registry
//! ready for [`pv_core::VerificationClient::initialize`].

use std::sync::Arc;

pub mod failover;
pub mod mock;
pub mod rest;

pub use failover::FailoverTransport;
pub use mock::MockTransport;
pub use rest::{RestConfig, RestTransport};

use pv_core::platform::{Platform, TransportRegistry};
use pv_core::transport::VerificationTransport;

#[cfg(test)]
mod tests;

/// Errors raised while assembling a transport, before any verification runs
#[derive(Debug, thiserror::Error)]
pub enum TransportSetupError {
    /// Missing or invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to build the underlying HTTP client
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Transport configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Transport backend ("rest", "mock", "failover")
    pub provider: String,
    /// REST transport settings
    pub rest: RestConfig,
}

impl TransportConfig {
    /// Load configuration from environment variables
    ///
    /// Reads a `.env` file if one is present. Unset variables fall back to
    /// defaults; the default provider is "mock" so a bare environment stays
    /// runnable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            provider: std::env::var("VERIFY_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
            rest: RestConfig::from_env(),
        }
    }
}

/// Create a transport based on configuration
///
/// Returns the implementation named by `config.provider`. Unknown providers
/// and REST setup failures fall back to the mock transport with a warning,
/// so misconfiguration never leaves the process without a transport.
pub fn create_transport(config: &TransportConfig) -> Arc<dyn VerificationTransport> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockTransport::new()),
        "rest" => match RestTransport::new(config.rest.clone()) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                tracing::error!("failed to initialize REST transport: {}", e);
                tracing::warn!("falling back to mock transport");
                Arc::new(MockTransport::new())
            }
        },
        "failover" => match RestTransport::new(config.rest.clone()) {
            Ok(primary) => Arc::new(FailoverTransport::new(
                Arc::new(primary),
                Arc::new(MockTransport::new()),
                std::time::Duration::from_secs(30),
            )),
            Err(e) => {
                tracing::error!("failed to initialize primary REST transport: {}", e);
                tracing::warn!("falling back to mock transport");
                Arc::new(MockTransport::new())
            }
        },
        other => {
            tracing::warn!("unknown transport provider '{}', using mock implementation", other);
            Arc::new(MockTransport::new())
        }
    }
}

/// Build the default platform registry
///
/// Registers the configured transport for every supported platform; the
/// platform selector then picks it for whichever platform the process runs
/// on. Integration code that needs per-platform transports can build its own
/// registry instead.
pub fn default_registry(config: &TransportConfig) -> TransportRegistry {
    let transport = create_transport(config);
    let mut registry = TransportRegistry::new();
    registry.register(Platform::Ios, Arc::clone(&transport));
    registry.register(Platform::Android, transport);
    registry
}
