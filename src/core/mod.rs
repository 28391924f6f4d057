//! Integrity verification core

pub mod digest;
pub mod error;
pub mod manifest;
pub mod verifier;

pub use error::{AuditError, DigestDecodeError};
pub use manifest::Manifest;
pub use verifier::{verify, FileOutcome, VerificationOutcome, VerifyOptions, VerifyReport};
