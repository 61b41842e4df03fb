//! Verification client and completion normalization

pub mod callback;
pub mod service;

pub use callback::{Completion, CompletionHandle, VerificationEvent};
pub use service::VerificationClient;

#[cfg(test)]
mod tests;
