//! End-to-end flow through the client, platform selector, and mock transport

use std::sync::Arc;

use pv_core::{ClientError, Platform, TransportRegistry, VerificationClient};
use pv_transport::{MockTransport, TransportConfig};

fn quiet_registry() -> (TransportRegistry, MockTransport) {
    let transport = MockTransport::with_options(false, false);
    let mut registry = TransportRegistry::new();
    registry.register(Platform::Ios, Arc::new(transport.clone()));
    registry.register(Platform::Android, Arc::new(transport.clone()));
    (registry, transport)
}

#[tokio::test]
async fn full_sms_verification_flow() {
    let (registry, transport) = quiet_registry();
    let client = VerificationClient::initialize_for(&registry, &Platform::Android).unwrap();
    client.configure("app-key").await;

    let custom = [("ref".to_string(), "abc".to_string())].into_iter().collect();
    let started = client.start_sms("+15551234567", &custom).await.unwrap();
    assert!(started.verification_id.is_some());
    assert_eq!(transport.request_count(), 1);

    let verified = client.verify_code("123456").await.unwrap();
    assert_eq!(verified.verification_id, started.verification_id);
}

#[tokio::test]
async fn flash_call_flow_with_reset() {
    let (registry, _transport) = quiet_registry();
    let client = VerificationClient::initialize_for(&registry, &Platform::Ios).unwrap();
    client.configure("app-key").await;

    client
        .start_flash_call("+15551234567", &Default::default())
        .await
        .unwrap();
    client.reset().await;

    // The session is gone, so the code has nothing to verify against.
    let result = client.verify_code("123456").await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn initialization_fails_loudly_without_registration() {
    let registry = TransportRegistry::new();

    let err = VerificationClient::initialize_for(&registry, &Platform::Ios).unwrap_err();
    assert!(matches!(err, ClientError::IntegrationMissing { .. }));

    let err =
        VerificationClient::initialize_for(&registry, &Platform::Other("linux".to_string()))
            .unwrap_err();
    assert!(matches!(err, ClientError::UnsupportedPlatform { .. }));
}

#[test]
fn default_registry_covers_both_platforms() {
    let config = TransportConfig {
        provider: "mock".to_string(),
        rest: pv_transport::RestConfig {
            base_url: "https://verification.invalid".to_string(),
            application_secret: String::new(),
            max_retries: 0,
            retry_delay_ms: 1,
            request_timeout_secs: 5,
        },
    };

    let registry = pv_transport::default_registry(&config);
    assert!(registry.get(&Platform::Ios).is_some());
    assert!(registry.get(&Platform::Android).is_some());
}

#[test]
fn unknown_provider_falls_back_to_mock() {
    let config = TransportConfig {
        provider: "carrier-pigeon".to_string(),
        rest: pv_transport::RestConfig {
            base_url: "https://verification.invalid".to_string(),
            application_secret: String::new(),
            max_retries: 0,
            retry_delay_ms: 1,
            request_timeout_secs: 5,
        },
    };

    let transport = pv_transport::create_transport(&config);
    assert_eq!(transport.backend_name(), "mock");
}
