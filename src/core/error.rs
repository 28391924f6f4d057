//! Error types shared by the scanner and the verifier

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole scan or verification run.
///
/// Per-entry failures never show up here; they are recorded as a
/// [`VerificationOutcome`](crate::core::verifier::VerificationOutcome).
#[derive(Debug, Error)]
pub enum AuditError {
    /// The duplicate scanner's input could not be opened or read.
    #[error("failed to read key stream{}: {source}", display_path(.path))]
    StreamRead {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// The manifest file itself could not be read.
    #[error("failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not a flat JSON object of strings.
    #[error("invalid manifest: {0}")]
    ManifestDecode(#[from] serde_json::Error),
}

impl AuditError {
    pub(crate) fn stream(source: io::Error) -> Self {
        AuditError::StreamRead { path: None, source }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

/// Why an expected digest string was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DigestDecodeError {
    #[error("{0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
