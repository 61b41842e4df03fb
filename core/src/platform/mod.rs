//! Platform detection and the transport registry
//!
//! The registry is the integration seam: platform-specific integration code
//! registers a [`VerificationTransport`] per supported platform, and the
//! selector resolves exactly one of them at client initialization. Selection
//! is a one-time, non-retryable decision; a missing registration fails
//! eagerly instead of surfacing as a confusing error deep inside the first
//! verification call.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::ClientError;
use crate::transport::VerificationTransport;

/// Runtime platforms this client knows how to integrate with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Android,
    /// Anything outside the supported set; selection fails for these
    Other(String),
}

impl Platform {
    /// Detect the platform of the running process
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (as reported by `std::env::consts::OS`) to a
    /// platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "ios" => Platform::Ios,
            "android" => Platform::Android,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Whether this platform is in the supported set
    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Other(_))
    }

    /// Integration step to name in the error when no transport is registered
    /// for this platform
    fn integration_hint(&self) -> &'static str {
        match self {
            Platform::Ios => "link the iOS verification integration and register its transport",
            Platform::Android => {
                "link the Android verification integration and register its transport"
            }
            Platform::Other(_) => "register a transport for this platform",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => f.write_str("ios"),
            Platform::Android => f.write_str("android"),
            Platform::Other(os) => f.write_str(os),
        }
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Platform::from_os(s))
    }
}

/// Registry mapping platforms to transport implementations
///
/// Populated by integration code before the client is initialized; read once
/// during selection and never afterwards.
#[derive(Default)]
pub struct TransportRegistry {
    transports: HashMap<Platform, Arc<dyn VerificationTransport>>,
}

impl TransportRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport for a platform, replacing any previous one
    pub fn register(&mut self, platform: Platform, transport: Arc<dyn VerificationTransport>) {
        tracing::debug!(
            platform = %platform,
            backend = transport.backend_name(),
            "registered verification transport"
        );
        self.transports.insert(platform, transport);
    }

    /// Look up the transport registered for a platform
    pub fn get(&self, platform: &Platform) -> Option<Arc<dyn VerificationTransport>> {
        self.transports.get(platform).cloned()
    }

    /// Number of registered transports
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

/// Resolve the active transport for a platform
///
/// # Errors
///
/// * [`ClientError::UnsupportedPlatform`] - the platform is outside the
///   supported set
/// * [`ClientError::IntegrationMissing`] - the platform is supported but no
///   transport was registered for it
pub fn select_transport(
    registry: &TransportRegistry,
    platform: &Platform,
) -> Result<Arc<dyn VerificationTransport>, ClientError> {
    if !platform.is_supported() {
        tracing::error!(platform = %platform, "unsupported platform, cannot select transport");
        return Err(ClientError::UnsupportedPlatform {
            os: platform.to_string(),
        });
    }

    match registry.get(platform) {
        Some(transport) => {
            tracing::info!(
                platform = %platform,
                backend = transport.backend_name(),
                "selected verification transport"
            );
            Ok(transport)
        }
        None => {
            tracing::error!(platform = %platform, "no transport registered for platform");
            Err(ClientError::IntegrationMissing {
                platform: platform.to_string(),
                hint: platform.integration_hint().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomData, VerificationMethod, VerificationOutcome};
    use crate::errors::TransportError;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct NullTransport;

    #[async_trait]
    impl VerificationTransport for NullTransport {
        async fn send_sms(
            &self,
            _application_key: &str,
            _phone_number: &str,
            _custom: &CustomData,
        ) -> Result<VerificationOutcome, TransportError> {
            Ok(VerificationOutcome::new(VerificationMethod::Sms))
        }

        async fn send_flash_call(
            &self,
            _application_key: &str,
            _phone_number: &str,
            _custom: &CustomData,
        ) -> Result<VerificationOutcome, TransportError> {
            Ok(VerificationOutcome::new(VerificationMethod::FlashCall))
        }

        async fn verify(&self, _code: &str) -> Result<VerificationOutcome, TransportError> {
            Err(TransportError::NoActiveVerification)
        }

        fn backend_name(&self) -> &str {
            "null"
        }
    }

    #[test]
    fn platform_mapping() {
        assert_eq!(Platform::from_os("ios"), Platform::Ios);
        assert_eq!(Platform::from_os("android"), Platform::Android);
        assert_eq!(
            Platform::from_os("linux"),
            Platform::Other("linux".to_string())
        );
        assert!(Platform::Ios.is_supported());
        assert!(!Platform::Other("linux".to_string()).is_supported());
    }

    #[test]
    fn selects_registered_transport() {
        let mut registry = TransportRegistry::new();
        registry.register(Platform::Android, Arc::new(NullTransport));

        let transport = select_transport(&registry, &Platform::Android).unwrap();
        assert_eq!(transport.backend_name(), "null");
    }

    #[test]
    fn missing_registration_fails_with_integration_error() {
        let registry = TransportRegistry::new();

        let err = select_transport(&registry, &Platform::Android).unwrap_err();
        match err {
            ClientError::IntegrationMissing { platform, hint } => {
                assert_eq!(platform, "android");
                assert!(hint.contains("Android"));
            }
            other => panic!("expected IntegrationMissing, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_platform_fails() {
        let mut registry = TransportRegistry::new();
        registry.register(Platform::Ios, Arc::new(NullTransport));

        let err = select_transport(&registry, &Platform::Other("linux".to_string())).unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = TransportRegistry::new();
        registry.register(Platform::Ios, Arc::new(NullTransport));
        registry.register(Platform::Ios, Arc::new(NullTransport));
        assert_eq!(registry.len(), 1);
    }
}
