//! Manifest verification: decode, open, digest, compare, record

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use super::digest::{
    constant_time_eq, decode_expected_digest, digest_reader, DigestBytes, DEFAULT_BUFFER_SIZE,
};
use super::error::DigestDecodeError;
use super::manifest::Manifest;

/// Where manifest paths are opened from
pub trait FileSource: Sync {
    type Reader: Read;

    fn open(&self, path: &str) -> io::Result<Self::Reader>;
}

/// Opens manifest paths on the local filesystem.
///
/// Relative paths resolve against `root` when one is set, otherwise
/// against the current working directory.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    root: Option<PathBuf>,
}

impl FsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl FileSource for FsSource {
    type Reader = File;

    fn open(&self, path: &str) -> io::Result<File> {
        File::open(self.resolve(path))
    }
}

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Read buffer size per file
    pub buffer_size: usize,
    /// Verify entries on the rayon pool instead of sequentially
    pub parallel: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            parallel: false,
        }
    }
}

/// Result of checking one manifest entry
#[derive(Debug)]
pub enum VerificationOutcome {
    Match,
    /// Content hashed fine but differs; carries the computed hex digest
    Mismatch { actual: String },
    /// Expected digest was malformed; the file was never opened
    DigestDecodeError(DigestDecodeError),
    OpenError(io::Error),
    /// The file opened but reading it failed part way
    ReadError(io::Error),
}

impl VerificationOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, VerificationOutcome::Match)
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, VerificationOutcome::Mismatch { .. })
    }

    /// True for outcomes where the entry could not be checked at all
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            VerificationOutcome::DigestDecodeError(_)
                | VerificationOutcome::OpenError(_)
                | VerificationOutcome::ReadError(_)
        )
    }
}

/// An outcome together with the manifest path it belongs to
#[derive(Debug)]
pub struct FileOutcome {
    pub path: String,
    pub outcome: VerificationOutcome,
}

/// Every entry's outcome from a single verification pass
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub outcomes: Vec<FileOutcome>,
}

impl VerifyReport {
    /// True when every entry matched. An empty manifest passes.
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome.is_match())
    }

    pub fn matched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_match()).count()
    }

    pub fn mismatched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_mismatch()).count()
    }

    pub fn errored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_error()).count()
    }

    pub fn outcome_for(&self, path: &str) -> Option<&VerificationOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.path == path)
            .map(|o| &o.outcome)
    }
}

/// Verify a single manifest entry.
///
/// The expected digest is decoded before the source is touched, and the
/// reader is dropped before returning so handles never pile up across
/// entries.
pub fn verify_entry<S: FileSource>(
    source: &S,
    path: &str,
    expected_hex: &str,
    buffer_size: usize,
) -> VerificationOutcome {
    let expected = match decode_expected_digest(expected_hex) {
        Ok(d) => d,
        Err(e) => return VerificationOutcome::DigestDecodeError(e),
    };

    let reader = match source.open(path) {
        Ok(r) => r,
        Err(e) => return VerificationOutcome::OpenError(e),
    };

    let computed: DigestBytes = match digest_reader(reader, buffer_size) {
        Ok(d) => d,
        Err(e) => return VerificationOutcome::ReadError(e),
    };

    if constant_time_eq(&computed, &expected) {
        VerificationOutcome::Match
    } else {
        VerificationOutcome::Mismatch {
            actual: hex::encode(computed),
        }
    }
}

/// Verify every manifest entry against the local filesystem
pub fn verify(manifest: &Manifest) -> VerifyReport {
    verify_with(manifest, &FsSource::new(), &VerifyOptions::default())
}

/// Verify every manifest entry against `source`
pub fn verify_with<S: FileSource>(
    manifest: &Manifest,
    source: &S,
    options: &VerifyOptions,
) -> VerifyReport {
    verify_with_progress(manifest, source, options, &ProgressBar::hidden())
}

/// Verify every manifest entry, advancing `progress` once per entry.
///
/// No entry's failure stops the pass; each one yields exactly one
/// [`FileOutcome`].
pub fn verify_with_progress<S: FileSource>(
    manifest: &Manifest,
    source: &S,
    options: &VerifyOptions,
    progress: &ProgressBar,
) -> VerifyReport {
    let check = |(path, expected): (&str, &str)| {
        let outcome = verify_entry(source, path, expected, options.buffer_size);
        tracing::debug!(path, ?outcome, "verified entry");
        progress.inc(1);
        FileOutcome {
            path: path.to_string(),
            outcome,
        }
    };

    let outcomes: Vec<FileOutcome> = if options.parallel {
        let entries: Vec<(&str, &str)> = manifest.iter().collect();
        entries.into_par_iter().map(check).collect()
    } else {
        manifest.iter().map(check).collect()
    };

    let report = VerifyReport { outcomes };
    tracing::info!(
        total = report.outcomes.len(),
        matched = report.matched(),
        mismatched = report.mismatched(),
        errored = report.errored(),
        "verification complete"
    );
    report
}
