//! Domain types for verification requests and outcomes

pub mod phone;
pub mod verification;

pub use phone::{is_valid_phone_number, mask_phone_number};
pub use verification::{CustomData, VerificationMethod, VerificationOutcome};
