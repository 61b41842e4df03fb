//! Error types for the verification client and transports

pub mod client_error;

pub use client_error::{ClientError, ClientResult, ErrorResponse, TransportError};
