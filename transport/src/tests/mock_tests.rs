//! Unit tests for the mock transport

use pv_core::domain::CustomData;
use pv_core::errors::TransportError;
use pv_core::transport::VerificationTransport;

use crate::mock::{MockTransport, MOCK_EXPECTED_CODE};

fn quiet_mock() -> MockTransport {
    MockTransport::with_options(false, false)
}

#[tokio::test]
async fn sms_then_correct_code_completes() {
    let transport = quiet_mock();

    let outcome = transport
        .send_sms("app-key", "+15551234567", &CustomData::new())
        .await
        .unwrap();
    assert!(outcome
        .verification_id
        .as_deref()
        .unwrap()
        .starts_with("mock_"));

    let verified = transport.verify(MOCK_EXPECTED_CODE).await.unwrap();
    assert_eq!(verified.verification_id, outcome.verification_id);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn wrong_code_is_rejected() {
    let transport = quiet_mock();
    transport
        .send_sms("app-key", "+15551234567", &CustomData::new())
        .await
        .unwrap();

    let result = transport.verify("000000").await;
    assert!(matches!(result, Err(TransportError::IncorrectCode)));
}

#[tokio::test]
async fn verify_without_start_fails() {
    let transport = quiet_mock();

    let result = transport.verify(MOCK_EXPECTED_CODE).await;
    assert!(matches!(result, Err(TransportError::NoActiveVerification)));
}

#[tokio::test]
async fn session_is_consumed_on_success() {
    let transport = quiet_mock();
    transport
        .send_flash_call("app-key", "+15551234567", &CustomData::new())
        .await
        .unwrap();
    transport.verify(MOCK_EXPECTED_CODE).await.unwrap();

    let result = transport.verify(MOCK_EXPECTED_CODE).await;
    assert!(matches!(result, Err(TransportError::NoActiveVerification)));
}

#[tokio::test]
async fn reset_drops_session() {
    let transport = quiet_mock();
    transport
        .send_sms("app-key", "+15551234567", &CustomData::new())
        .await
        .unwrap();
    transport.reset().await;

    let result = transport.verify(MOCK_EXPECTED_CODE).await;
    assert!(matches!(result, Err(TransportError::NoActiveVerification)));
}

#[tokio::test]
async fn invalid_phone_number_is_rejected() {
    let transport = quiet_mock();

    let result = transport
        .send_sms("app-key", "5551234567", &CustomData::new())
        .await;
    assert!(matches!(result, Err(TransportError::InvalidInput(_))));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn multibyte_phone_is_rejected_as_invalid_input() {
    let transport = quiet_mock();

    // Building the rejection masks the raw input; a multibyte typo must
    // still come back as an error, not a panic.
    let result = transport
        .send_sms("app-key", "+123456é890", &CustomData::new())
        .await;
    assert!(matches!(result, Err(TransportError::InvalidInput(_))));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn simulated_failure_surfaces_service_error() {
    let transport = MockTransport::with_options(false, true);

    let result = transport
        .send_sms("app-key", "+15551234567", &CustomData::new())
        .await;
    assert!(matches!(result, Err(TransportError::ServiceError { .. })));
}

#[tokio::test]
async fn expected_code_is_configurable() {
    let transport = MockTransport::with_options(false, false).with_expected_code("9999");
    transport
        .send_sms("app-key", "+15551234567", &CustomData::new())
        .await
        .unwrap();

    assert!(transport.verify("9999").await.is_ok());
}
