//! Hash digests.
//!
//! Hex digests of strings and files, plus digest matching that infers the
//! algorithm from the length of the expected hex string and compares in
//! constant time.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::error::{Result, SealError};

/// Read buffer size for file digests.
const CHUNK_SIZE: usize = 8 * 1024;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512 (default)
    #[default]
    Sha512,
}

impl HashAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Canonical lowercase identifier (`sha512`).
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Algorithm whose hex digest has `len` characters.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algo| algo.output_len() * 2 == len)
    }

    /// Binary digest of `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn hex_digest(self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }

    /// Binary digest of everything readable from `reader`.
    pub fn digest_reader<R: Read>(self, reader: R) -> io::Result<Vec<u8>> {
        match self {
            HashAlgorithm::Sha256 => stream::<Sha256, R>(reader),
            HashAlgorithm::Sha384 => stream::<Sha384, R>(reader),
            HashAlgorithm::Sha512 => stream::<Sha512, R>(reader),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|algo| algo.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SealError::UnsupportedAlgorithm(format!("hash algorithm \"{}\"", s)))
    }
}

fn stream<D: Digest, R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(reader);
    let mut hasher = D::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_vec())
}

/// SHA-256 hex digest.
pub fn sha256(data: &[u8]) -> String {
    HashAlgorithm::Sha256.hex_digest(data)
}

/// SHA-384 hex digest.
pub fn sha384(data: &[u8]) -> String {
    HashAlgorithm::Sha384.hex_digest(data)
}

/// SHA-512 hex digest.
pub fn sha512(data: &[u8]) -> String {
    HashAlgorithm::Sha512.hex_digest(data)
}

/// Hex digest of a file's contents.
///
/// # Errors
///
/// Returns `SealError::FileNotFound` if the path does not exist, or
/// `SealError::Io` if it cannot be read.
pub fn hash_file(path: &Path, algo: HashAlgorithm) -> Result<String> {
    if !path.exists() {
        return Err(SealError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    Ok(hex::encode(algo.digest_reader(file)?))
}

/// Check `input` against an expected hex digest.
///
/// The algorithm is chosen from the digest length (64, 96 or 128 hex
/// characters). Comparison is constant time.
///
/// # Errors
///
/// Returns `SealError::UnsupportedAlgorithm` if no supported algorithm
/// produces digests of that length.
pub fn matches(input: &[u8], expected_hex: &str) -> Result<bool> {
    let algo = algorithm_for(expected_hex)?;
    Ok(hex_eq(&algo.hex_digest(input), expected_hex))
}

/// Check a file's contents against an expected hex digest.
///
/// Same algorithm selection as [`matches`].
pub fn matches_file(path: &Path, expected_hex: &str) -> Result<bool> {
    let algo = algorithm_for(expected_hex)?;
    Ok(hex_eq(&hash_file(path, algo)?, expected_hex))
}

/// Constant-time byte comparison.
///
/// Slices of different lengths compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

fn algorithm_for(expected_hex: &str) -> Result<HashAlgorithm> {
    HashAlgorithm::from_hex_len(expected_hex.trim().len()).ok_or_else(|| {
        SealError::UnsupportedAlgorithm(format!(
            "no supported hash produces {} hex characters",
            expected_hex.trim().len()
        ))
    })
}

fn hex_eq(computed: &str, expected: &str) -> bool {
    let expected = expected.trim().to_ascii_lowercase();
    constant_time_eq(computed.as_bytes(), expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            sha256(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha384(b"abc").len(), 96);
        assert!(sha512(b"abc").starts_with("ddaf35a193617aba"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("sha512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!(matches!(
            "md5".parse::<HashAlgorithm>(),
            Err(SealError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_matches_picks_algorithm_by_length() {
        for algo in HashAlgorithm::ALL {
            let expected = algo.hex_digest(b"hello");
            assert!(matches(b"hello", &expected).unwrap());
            assert!(!matches(b"hullo", &expected).unwrap());
        }
    }

    #[test]
    fn test_matches_accepts_uppercase_hex() {
        let expected = sha256(b"hello").to_uppercase();
        assert!(matches(b"hello", &expected).unwrap());
    }

    #[test]
    fn test_matches_unknown_length() {
        let result = matches(b"hello", "abcd");
        assert!(matches!(result, Err(SealError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_file_digest_matches_string_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"file contents").unwrap();

        let digest = hash_file(file.path(), HashAlgorithm::Sha512).unwrap();
        assert_eq!(digest, sha512(b"file contents"));
        assert!(matches_file(file.path(), &digest).unwrap());
    }

    #[test]
    fn test_file_digest_missing_file() {
        let result = hash_file(Path::new("/definitely/not/here"), HashAlgorithm::Sha256);
        assert!(matches!(result, Err(SealError::FileNotFound(_))));
    }

    #[test]
    fn test_constant_time_eq_lengths() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"samey"));
        assert!(!constant_time_eq(b"same", b"sane"));
    }
}
