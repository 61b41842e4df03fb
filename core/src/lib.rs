//! # PhoneVerify Core
//!
//! Core client logic for phone number verification. This crate contains the
//! verification client, the transport seam that concrete backends plug into,
//! the platform selector that resolves which backend is active, and the error
//! types shared across the workspace.
//!
//! All actual verification work (SMS delivery, flash calls, code validation)
//! happens behind the [`transport::VerificationTransport`] trait; this crate
//! owns platform selection, eager integration validation, per-call
//! precondition checks, and completion normalization.

pub mod client;
pub mod domain;
pub mod errors;
pub mod platform;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::{Completion, VerificationClient, VerificationEvent};
pub use domain::{CustomData, VerificationMethod, VerificationOutcome};
pub use errors::{ClientError, ClientResult, ErrorResponse, TransportError};
pub use platform::{Platform, TransportRegistry};
pub use transport::VerificationTransport;
