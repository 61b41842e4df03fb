//! REST transport against the verification service HTTP API
//!
//! ## Features
//!
//! - Basic authentication from the per-call application key and the
//!   configured application secret
//! - E.164 validation before any request leaves the process
//! - Automatic retry with exponential backoff on network errors and 5xx
//! - In-flight session tracking so `verify` can report the code against the
//!   verification that started it
//! - Phone number masking in all log output

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use pv_core::domain::{
    is_valid_phone_number, mask_phone_number, CustomData, VerificationMethod, VerificationOutcome,
};
use pv_core::errors::TransportError;
use pv_core::transport::VerificationTransport;

use crate::TransportSetupError;

/// REST transport configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the verification service
    pub base_url: String,
    /// Application secret paired with the per-call application key for auth
    pub application_secret: String,
    /// Maximum retry attempts for failed requests
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl RestConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VERIFY_BASE_URL")
                .unwrap_or_else(|_| "https://verification.api.example.com".to_string()),
            application_secret: std::env::var("VERIFY_APPLICATION_SECRET").unwrap_or_default(),
            max_retries: std::env::var("VERIFY_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: std::env::var("VERIFY_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            request_timeout_secs: std::env::var("VERIFY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// The verification a caller started and has not completed yet
#[derive(Debug, Clone)]
struct Session {
    verification_id: Option<String>,
    phone_number: String,
    method: VerificationMethod,
    application_key: String,
}

/// Error payload returned by the verification service
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    reference: Option<String>,
}

/// REST transport implementation
pub struct RestTransport {
    http: reqwest::Client,
    config: RestConfig,
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for RestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTransport").finish_non_exhaustive()
    }
}

impl RestTransport {
    /// Create a new REST transport
    pub fn new(config: RestConfig) -> Result<Self, TransportSetupError> {
        if config.base_url.is_empty() {
            return Err(TransportSetupError::Config(
                "VERIFY_BASE_URL must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(base_url = %config.base_url, "REST verification transport initialized");

        Ok(Self {
            http,
            config,
            session: RwLock::new(None),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, TransportSetupError> {
        Self::new(RestConfig::from_env())
    }

    fn auth_header(&self, application_key: &str) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!(
                "{}:{}",
                application_key, self.config.application_secret
            ))
        )
    }

    /// Execute a request with retry on network errors and 5xx responses
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, TransportError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        for attempt in 0..=self.config.max_retries {
            match build().send().await {
                Ok(response) => {
                    if response.status().is_server_error() && attempt < self.config.max_retries {
                        warn!(
                            status = %response.status(),
                            attempt = attempt + 1,
                            "verification service error, retrying"
                        );
                    } else {
                        return Ok(response);
                    }
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if !retryable || attempt == self.config.max_retries {
                        return Err(map_request_error(e));
                    }
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        "request failed, retrying"
                    );
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        // Loop always returns before exhausting attempts.
        Err(TransportError::Network("retry attempts exhausted".to_string()))
    }

    async fn read_success_body(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, TransportError> {
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }

    async fn initiate(
        &self,
        application_key: &str,
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

        let url = format!("{}/verification/v1/verifications", self.config.base_url);
        let reference = uuid::Uuid::new_v4().to_string();
        let body = serde_json::json!({
            "identity": { "type": "number", "endpoint": phone_number },
            "method": method.as_str(),
            "reference": reference,
            "custom": custom,
        });
        let auth = self.auth_header(application_key);

        debug!(
            phone = %mask_phone_number(phone_number),
            method = %method,
            reference = %reference,
            "initiating verification"
        );

        let response = self
            .send_with_retry(|| self.http.post(&url).header("Authorization", &auth).json(&body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ServiceErrorBody>().await.unwrap_or_default();
            let err = map_error_status(status, body, false);
            error!(
                phone = %mask_phone_number(phone_number),
                status = %status,
                error = %err,
                "verification initiation failed"
            );
            return Err(err);
        }

        let payload = Self::read_success_body(response).await?;
        let verification_id = payload
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        *self.session.write().await = Some(Session {
            verification_id: verification_id.clone(),
            phone_number: phone_number.to_string(),
            method,
            application_key: application_key.to_string(),
        });

        info!(
            phone = %mask_phone_number(phone_number),
            method = %method,
            verification_id = verification_id.as_deref().unwrap_or("-"),
            "verification initiated"
        );

        let mut outcome = VerificationOutcome::new(method).with_data(payload);
        outcome.verification_id = verification_id;
        Ok(outcome)
    }
}

#[async_trait]
impl VerificationTransport for RestTransport {
    async fn send_sms(
        &self,
        application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError> {
        self.initiate(application_key, phone_number, custom, VerificationMethod::Sms)
            .await
    }

    async fn send_flash_call(
        &self,
        application_key: &str,
        phone_number: &str,
        custom: &CustomData,
    ) -> Result<VerificationOutcome, TransportError> {
        self.initiate(
            application_key,
            phone_number,
            custom,
            VerificationMethod::FlashCall,
        )
        .await
    }

    async fn verify(&self, code: &str) -> Result<VerificationOutcome, TransportError> {
        if code.trim().is_empty() {
            return Err(TransportError::InvalidInput(
                "verification code must not be empty".to_string(),
            ));
        }

        let session = match self.session.read().await.clone() {
            Some(session) => session,
            None => return Err(TransportError::NoActiveVerification),
        };

        let url = format!(
            "{}/verification/v1/verifications/number/{}",
            self.config.base_url, session.phone_number
        );
        let body = report_payload(session.method, code);
        let auth = self.auth_header(&session.application_key);

        debug!(
            phone = %mask_phone_number(&session.phone_number),
            method = %session.method,
            "reporting verification code"
        );

        let response = self
            .send_with_retry(|| self.http.put(&url).header("Authorization", &auth).json(&body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ServiceErrorBody>().await.unwrap_or_default();
            let err = map_error_status(status, body, true);
            warn!(
                phone = %mask_phone_number(&session.phone_number),
                status = %status,
                error = %err,
                "code verification failed"
            );
            return Err(err);
        }

        let payload = Self::read_success_body(response).await?;

        // The session is complete; a second verify must start over.
        *self.session.write().await = None;

        info!(
            phone = %mask_phone_number(&session.phone_number),
            "verification completed"
        );

        let mut outcome = VerificationOutcome::new(session.method).with_data(payload);
        outcome.verification_id = session.verification_id;
        Ok(outcome)
    }

    async fn reset(&self) {
        if self.session.write().await.take().is_some() {
            debug!("dropped in-flight verification session");
        }
    }

    fn backend_name(&self) -> &str {
        "rest"
    }
}

/// Body for reporting a received code back to the service
fn report_payload(method: VerificationMethod, code: &str) -> serde_json::Value {
    match method {
        VerificationMethod::Sms => serde_json::json!({
            "method": "sms",
            "sms": { "code": code },
        }),
        VerificationMethod::FlashCall => serde_json::json!({
            "method": "flashCall",
            "flashCall": { "cli": code },
        }),
    }
}

fn map_request_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.to_string())
    }
}

/// Map a non-success status and error body to a transport error
///
/// `verifying` distinguishes the code-report call, where a rejection means
/// the code itself was wrong rather than the request being malformed.
pub(crate) fn map_error_status(
    status: StatusCode,
    body: ServiceErrorBody,
    verifying: bool,
) -> TransportError {
    let message = body
        .message
        .unwrap_or_else(|| format!("service returned {}", status));

    if verifying && (status == StatusCode::FORBIDDEN || status == StatusCode::UNPROCESSABLE_ENTITY)
    {
        TransportError::IncorrectCode
    } else if status == StatusCode::BAD_REQUEST {
        TransportError::InvalidInput(message)
    } else if status == StatusCode::REQUEST_TIMEOUT {
        TransportError::Timeout
    } else {
        TransportError::ServiceError {
            message,
            reference: body.reference,
        }
    }
}

#[cfg(test)]
pub(crate) fn error_body(message: &str, reference: Option<&str>) -> ServiceErrorBody {
    ServiceErrorBody {
        message: Some(message.to_string()),
        reference: reference.map(str::to_string),
    }
}
