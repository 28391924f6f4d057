//! SHA-256 digest accumulation and expected-digest decoding

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::error::DigestDecodeError;

/// Output size of SHA-256 in bytes
pub const DIGEST_LEN: usize = 32;

/// Default read buffer used when streaming file content
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

pub type DigestBytes = [u8; DIGEST_LEN];

/// Decode a hex-encoded expected digest.
///
/// Upper and lower case are both accepted. The decoded value must be
/// exactly [`DIGEST_LEN`] bytes.
pub fn decode_expected_digest(hex_digest: &str) -> Result<DigestBytes, DigestDecodeError> {
    let bytes = hex::decode(hex_digest)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| DigestDecodeError::WrongLength {
            expected: DIGEST_LEN,
            actual,
        })
}

/// Stream a reader through SHA-256 using a fixed-size buffer
///
/// # Arguments
/// * `reader` - Source of bytes, consumed until EOF
/// * `buffer_size` - Size of each read; zero falls back to the default
///
/// # Returns
/// The raw 32-byte digest
pub fn digest_reader<R: Read>(mut reader: R, buffer_size: usize) -> io::Result<DigestBytes> {
    let size = if buffer_size == 0 { DEFAULT_BUFFER_SIZE } else { buffer_size };
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; size];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// Compute the SHA-256 digest of a file on disk
pub fn digest_path(path: &Path) -> io::Result<DigestBytes> {
    let file = File::open(path)?;
    digest_reader(file, DEFAULT_BUFFER_SIZE)
}

/// Compare two byte strings without short-circuiting on the first difference
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
