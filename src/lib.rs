//! File Audit Library
//!
//! Streaming duplicate-key detection for line-delimited logs and SHA-256
//! verification of files against an expected-checksum manifest.

pub mod core;
pub mod logging;
pub mod reporting;
pub mod scanner;

pub use crate::core::verifier;
pub use crate::reporting::report_writer;
pub use crate::scanner::duplicate_detector;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::digest::{
        constant_time_eq, decode_expected_digest, digest_path, digest_reader, DIGEST_LEN,
    };
    pub use crate::core::error::{AuditError, DigestDecodeError};
    pub use crate::core::manifest::Manifest;
    pub use crate::core::verifier::{
        verify, verify_entry, verify_with, verify_with_progress, FileOutcome, FileSource,
        FsSource, VerificationOutcome, VerifyOptions, VerifyReport,
    };
    pub use crate::reporting::report_writer::{
        format_outcome, write_diagnostics, write_duplicate_report, write_report,
    };
    pub use crate::scanner::duplicate_detector::{
        find_duplicates, find_duplicates_in_file, SeenCounter,
    };
    pub use crate::scanner::file_scanner::collect_files;
}
