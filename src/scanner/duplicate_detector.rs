//! Streaming duplicate-key detection over line-delimited input

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::error::AuditError;

/// How often a key has been seen, saturating at two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Once,
    Twice,
}

/// Per-scan table of keys seen so far.
///
/// Memory grows with the number of distinct keys only; counts stop at
/// two because nothing beyond "duplicated" matters.
#[derive(Debug, Default)]
pub struct SeenCounter {
    keys: HashMap<String, Seen>,
}

impl SeenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `key`.
    ///
    /// Hands the key back exactly once: on its second occurrence.
    pub fn observe(&mut self, key: String) -> Option<String> {
        match self.keys.get_mut(&key) {
            Some(seen) if *seen == Seen::Once => {
                *seen = Seen::Twice;
                Some(key)
            }
            Some(_) => None,
            None => {
                self.keys.insert(key, Seen::Once);
                None
            }
        }
    }

    /// Number of distinct keys seen
    pub fn distinct(&self) -> usize {
        self.keys.len()
    }
}

/// Find keys that occur more than once in a line stream
///
/// # Arguments
/// * `reader` - Line-delimited input, one key per line
///
/// # Returns
/// Duplicated keys in the order their second occurrence appeared. Any
/// read failure discards partial results.
pub fn find_duplicates<R: BufRead>(reader: R) -> Result<Vec<String>, AuditError> {
    let mut counter = SeenCounter::new();
    let mut duplicates = Vec::new();
    let mut lines = 0usize;

    for line in reader.lines() {
        let key = line.map_err(AuditError::stream)?;
        lines += 1;
        if let Some(dup) = counter.observe(key) {
            duplicates.push(dup);
        }
    }

    tracing::debug!(
        lines,
        distinct = counter.distinct(),
        duplicates = duplicates.len(),
        "duplicate scan complete"
    );
    Ok(duplicates)
}

/// Open `path` and scan it for duplicate keys
pub fn find_duplicates_in_file(path: &Path) -> Result<Vec<String>, AuditError> {
    let with_path = |source: io::Error| AuditError::StreamRead {
        path: Some(path.to_path_buf()),
        source,
    };
    let file = File::open(path).map_err(with_path)?;
    find_duplicates(BufReader::new(file)).map_err(|e| match e {
        AuditError::StreamRead { source, .. } => with_path(source),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_single_duplicate() {
        let input = "a1b2c3\nx9y8z7\na1b2c3\nq1w2e3";
        let dups = find_duplicates(Cursor::new(input)).unwrap();
        assert_eq!(dups, vec!["a1b2c3"]);
    }

    #[test]
    fn test_reported_once_regardless_of_repeats() {
        for repeats in [3, 10, 100] {
            let input = "k\n".repeat(repeats);
            let dups = find_duplicates(Cursor::new(input)).unwrap();
            assert_eq!(dups, vec!["k"], "{} repeats", repeats);
        }
    }

    #[test]
    fn test_order_follows_second_occurrence() {
        // "a" first appears before "b", but "b" repeats first
        let input = "a\nb\nb\nc\na\nc\nb\n";
        let dups = find_duplicates(Cursor::new(input)).unwrap();
        assert_eq!(dups, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let input = "key\r\n\r\nkey\n\n";
        let dups = find_duplicates(Cursor::new(input)).unwrap();
        assert_eq!(dups, vec!["key", ""]);
    }

    #[test]
    fn test_no_duplicates() {
        let dups = find_duplicates(Cursor::new("a\nb\nc\n")).unwrap();
        assert!(dups.is_empty());
        assert!(find_duplicates(Cursor::new("")).unwrap().is_empty());
    }

    #[test]
    fn test_counter_saturates() {
        let mut counter = SeenCounter::new();
        assert_eq!(counter.observe("x".into()), None);
        assert_eq!(counter.observe("x".into()), Some("x".to_string()));
        assert_eq!(counter.observe("x".into()), None);
        assert_eq!(counter.observe("y".into()), None);
        assert_eq!(counter.distinct(), 2);
    }

    /// Serves one line, then fails
    struct BrokenStream {
        first: Option<&'static [u8]>,
    }

    impl Read for BrokenStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.first.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(io::Error::new(io::ErrorKind::Other, "disk error")),
            }
        }
    }

    #[test]
    fn test_read_failure_discards_partial_results() {
        let reader = io::BufReader::new(BrokenStream {
            first: Some(b"a\na\n"),
        });
        let err = find_duplicates(reader).unwrap_err();
        assert!(matches!(err, AuditError::StreamRead { path: None, .. }));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let err = find_duplicates(Cursor::new(&b"ok\n\xff\xfe\n"[..])).unwrap_err();
        assert!(matches!(err, AuditError::StreamRead { .. }));
    }

    #[test]
    fn test_scan_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"a1b2c3\nx9y8z7\na1b2c3\nq1w2e3\n").unwrap();
        temp_file.flush().unwrap();

        let dups = find_duplicates_in_file(temp_file.path()).unwrap();
        assert_eq!(dups, vec!["a1b2c3"]);
    }

    #[test]
    fn test_missing_file_carries_path() {
        let err = find_duplicates_in_file(Path::new("/definitely/not/here.log")).unwrap_err();
        match err {
            AuditError::StreamRead { path, source } => {
                assert_eq!(path.as_deref(), Some(Path::new("/definitely/not/here.log")));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
