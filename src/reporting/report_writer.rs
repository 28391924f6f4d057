//! Diagnostic lines and report files

use anyhow::Result;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::core::verifier::{FileOutcome, VerificationOutcome, VerifyReport};

/// Escape control characters so a path always prints on one line
pub fn escape_path(path: &str) -> Cow<'_, str> {
    if !path.chars().any(char::is_control) {
        return Cow::Borrowed(path);
    }
    let mut escaped = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}

/// Format the one-line diagnostic for an entry
pub fn format_outcome(result: &FileOutcome) -> String {
    let path = escape_path(&result.path);
    match &result.outcome {
        VerificationOutcome::Match => format!("OK: {}", path),
        VerificationOutcome::Mismatch { .. } => format!("ALERT: {} (checksum mismatch)", path),
        VerificationOutcome::DigestDecodeError(e) => {
            format!("ERROR: {} (invalid expected SHA256 hex: {})", path, e)
        }
        VerificationOutcome::OpenError(e) => format!("ERROR: {} (open failed: {})", path, e),
        VerificationOutcome::ReadError(e) => format!("ERROR: {} (read failed: {})", path, e),
    }
}

/// Write exactly one diagnostic line per manifest entry
pub fn write_diagnostics<W: Write>(mut out: W, report: &VerifyReport) -> io::Result<()> {
    for result in &report.outcomes {
        writeln!(out, "{}", format_outcome(result))?;
    }
    out.flush()
}

/// Write verification results to a file
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `report` - Outcomes of a verification pass
pub fn write_report(output_path: &Path, report: &VerifyReport) -> Result<()> {
    let mut file = File::create(output_path)?;
    let total = report.outcomes.len();

    writeln!(file, "Integrity Verification Report")?;
    writeln!(file, "=============================")?;
    writeln!(file, "Generated: {:?}", std::time::SystemTime::now())?;
    writeln!(file)?;

    writeln!(file, "Summary Statistics:")?;
    writeln!(file, "-------------------")?;
    writeln!(file, "  Total entries: {}", total)?;
    writeln!(file, "  Verified: {}", report.matched())?;
    writeln!(file, "  Checksum mismatches: {}", report.mismatched())?;
    writeln!(file, "  Errors: {}", report.errored())?;
    writeln!(file, "  Result: {}", if report.all_ok() { "PASS" } else { "FAIL" })?;
    writeln!(file)?;

    let mut mismatches = report
        .outcomes
        .iter()
        .filter_map(|r| match &r.outcome {
            VerificationOutcome::Mismatch { actual } => {
                Some((escape_path(&r.path), actual.as_str()))
            }
            _ => None,
        })
        .peekable();
    if mismatches.peek().is_some() {
        writeln!(file, "Mismatched Files:")?;
        writeln!(file, "-----------------")?;
        for (path, actual) in mismatches {
            writeln!(file, "  {}", path)?;
            writeln!(file, "    actual: {}", actual)?;
        }
        writeln!(file)?;
    }

    if report.errored() > 0 {
        writeln!(file, "Errors:")?;
        writeln!(file, "-------")?;
        for result in report.outcomes.iter().filter(|r| r.outcome.is_error()) {
            writeln!(file, "  {}", format_outcome(result))?;
        }
        writeln!(file)?;
    }

    writeln!(file, "Verified Files:")?;
    writeln!(file, "---------------")?;
    for result in report.outcomes.iter().filter(|r| r.outcome.is_match()) {
        writeln!(file, "  {}", escape_path(&result.path))?;
    }

    Ok(())
}

/// Write duplicate keys, one per line, in detection order
pub fn write_duplicate_report(output_path: &Path, duplicates: &[String]) -> Result<()> {
    let mut file = File::create(output_path)?;

    writeln!(file, "Duplicate Key Report")?;
    writeln!(file, "====================")?;
    writeln!(file, "  Total duplicated keys: {}", duplicates.len())?;
    writeln!(file)?;
    for key in duplicates {
        writeln!(file, "{}", key)?;
    }

    Ok(())
}
