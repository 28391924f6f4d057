//! Expected-checksum manifest: a flat JSON object of path -> SHA-256 hex

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::digest::digest_path;
use super::error::AuditError;
use crate::scanner::file_scanner::collect_files;

/// Mapping from file path to expected hex digest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: HashMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a manifest from JSON bytes.
    ///
    /// Anything other than an object whose values are all strings is a
    /// [`AuditError::ManifestDecode`].
    pub fn from_json_slice(input: &[u8]) -> Result<Self, AuditError> {
        Ok(serde_json::from_slice(input)?)
    }

    /// Read and decode a manifest file
    pub fn from_path(path: &Path) -> Result<Self, AuditError> {
        let bytes = fs::read(path).map_err(|source| AuditError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }

    /// Generate a manifest for every file under `dir`
    ///
    /// # Arguments
    /// * `dir` - Directory to hash
    /// * `recursive` - Whether to descend into subdirectories
    ///
    /// # Returns
    /// Manifest keyed by paths relative to `dir`
    pub fn build(dir: &Path, recursive: bool) -> Result<Self> {
        let files = collect_files(dir, recursive)?;

        let entries = files
            .par_iter()
            .map(|path| {
                let digest = digest_path(path)
                    .with_context(|| format!("failed to hash {}", path.display()))?;
                let relative = path.strip_prefix(dir).unwrap_or(path);
                let key = relative.to_string_lossy().into_owned();
                Ok::<_, anyhow::Error>((key, hex::encode(digest)))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        tracing::info!(files = entries.len(), dir = %dir.display(), "built manifest");
        Ok(Self { entries })
    }

    pub fn insert(&mut self, path: impl Into<String>, hex_digest: impl Into<String>) {
        self.entries.insert(path.into(), hex_digest.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize with keys sorted so generated manifests diff cleanly
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let sorted: BTreeMap<&String, &String> = self.entries.iter().collect();
        serde_json::to_string_pretty(&sorted)
    }
}

impl FromIterator<(String, String)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flat_object() {
        let manifest = Manifest::from_json_slice(
            br#"{
                "bin/app.exe": "a467a6c8a92b61fcd70cb83618a4268d73d5aeddc6a90168f93207ac2dde0820",
                "config/settings.yaml": "320df0b959781a7b12b304edd9431559900d67925a9b275d3ac0a55ad81b0c6a"
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.get("config/settings.yaml"),
            Some("320df0b959781a7b12b304edd9431559900d67925a9b275d3ac0a55ad81b0c6a")
        );
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = Manifest::from_json_slice(b"{ not json").unwrap_err();
        assert!(matches!(err, AuditError::ManifestDecode(_)));
    }

    #[test]
    fn test_non_string_value_is_decode_error() {
        let err = Manifest::from_json_slice(br#"{"a.txt": 42}"#).unwrap_err();
        assert!(matches!(err, AuditError::ManifestDecode(_)));

        let err = Manifest::from_json_slice(br#"["a.txt"]"#).unwrap_err();
        assert!(matches!(err, AuditError::ManifestDecode(_)));
    }

    #[test]
    fn test_missing_manifest_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Manifest::from_path(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AuditError::ManifestRead { .. }));
    }

    #[test]
    fn test_build_uses_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("sub");
        fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("empty.txt")).unwrap();
        let mut nested = File::create(subdir.join("hello.txt")).unwrap();
        nested.write_all(b"hello\n").unwrap();

        let manifest = Manifest::build(temp_dir.path(), true).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.get("empty.txt"),
            Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        let nested_key = Path::new("sub").join("hello.txt");
        assert_eq!(
            manifest.get(&nested_key.to_string_lossy()),
            Some("5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03")
        );
    }

    #[test]
    fn test_json_output_parses_back() {
        let mut manifest = Manifest::new();
        manifest.insert("b.txt", "00".repeat(32));
        manifest.insert("a.txt", "11".repeat(32));

        let json = manifest.to_json_pretty().unwrap();
        assert!(json.find("a.txt").unwrap() < json.find("b.txt").unwrap());
        assert_eq!(Manifest::from_json_slice(json.as_bytes()).unwrap(), manifest);
    }
}
