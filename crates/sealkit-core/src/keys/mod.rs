//! RSA keys.
//!
//! [`PublicKey`] and [`PrivateKey`] wrap parsed key material and expose the
//! four asymmetric directions plus signing. [`KeyPair`] composes one of each
//! and guarantees they belong together.
//!
//! Both directions of "encryption" are available: public-encrypt with
//! private-decrypt for confidentiality, and private-encrypt with
//! public-decrypt for raw PKCS#1 v1.5 type 1 blocks. Signing hashes the
//! message and produces a standard PKCS#1 v1.5 signature.

mod pair;
mod private;
mod public;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rsa::Pkcs1v15Sign;
use sha2::{Sha256, Sha384, Sha512};

use crate::digest::HashAlgorithm;
use crate::error::{Result, SealError};

pub use pair::KeyPair;
pub use private::PrivateKey;
pub use public::PublicKey;

/// Default modulus size for generated keys.
pub const DEFAULT_KEY_BITS: usize = 4096;

/// Smallest modulus accepted for generated keys.
pub const MIN_KEY_BITS: usize = 1024;

/// Padding scheme for asymmetric encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Padding {
    /// RSAES-OAEP with SHA-256. Confidentiality direction only.
    #[default]
    Oaep,
    /// PKCS#1 v1.5 (type 2 for public-encrypt, type 1 for private-encrypt).
    Pkcs1v15,
}

impl Padding {
    /// Canonical identifier.
    pub fn name(self) -> &'static str {
        match self {
            Padding::Oaep => "oaep",
            Padding::Pkcs1v15 => "pkcs1",
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Padding {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oaep" => Ok(Padding::Oaep),
            "pkcs1" | "pkcs1v15" | "pkcs1-v1_5" => Ok(Padding::Pkcs1v15),
            other => Err(SealError::UnsupportedPadding(format!(
                "unknown padding \"{}\"",
                other
            ))),
        }
    }
}

/// Asymmetric key algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyType {
    #[default]
    Rsa,
}

/// PBES2 scheme used to lock an exported private key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrivateKeyCipher {
    /// scrypt key derivation, AES-256-CBC
    #[default]
    ScryptAes256Cbc,
    /// PBKDF2-HMAC-SHA256 key derivation, AES-256-CBC
    Pbkdf2Sha256Aes256Cbc,
    /// PBKDF2-HMAC-SHA256 key derivation, AES-128-CBC
    Pbkdf2Sha256Aes128Cbc,
}

impl PrivateKeyCipher {
    pub const ALL: [PrivateKeyCipher; 3] = [
        PrivateKeyCipher::ScryptAes256Cbc,
        PrivateKeyCipher::Pbkdf2Sha256Aes256Cbc,
        PrivateKeyCipher::Pbkdf2Sha256Aes128Cbc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrivateKeyCipher::ScryptAes256Cbc => "scrypt-aes-256-cbc",
            PrivateKeyCipher::Pbkdf2Sha256Aes256Cbc => "pbkdf2-sha256-aes-256-cbc",
            PrivateKeyCipher::Pbkdf2Sha256Aes128Cbc => "pbkdf2-sha256-aes-128-cbc",
        }
    }
}

impl fmt::Display for PrivateKeyCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrivateKeyCipher {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|cipher| cipher.name() == wanted)
            .ok_or_else(|| {
                SealError::UnsupportedAlgorithm(format!("unknown private key cipher \"{}\"", s))
            })
    }
}

/// Parameters for key generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParams {
    /// Modulus size in bits
    pub bits: usize,
    /// Default signing digest of the generated pair
    pub digest: HashAlgorithm,
    /// Key algorithm
    pub key_type: KeyType,
    /// Scheme that locks the private key when a password is given
    pub private_key_cipher: PrivateKeyCipher,
}

impl Default for KeyParams {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
            digest: HashAlgorithm::default(),
            key_type: KeyType::default(),
            private_key_cipher: PrivateKeyCipher::default(),
        }
    }
}

impl KeyParams {
    /// Defaults with a different modulus size.
    pub fn with_bits(bits: usize) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Defaults with a different private-key cipher.
    pub fn with_private_key_cipher(mut self, cipher: PrivateKeyCipher) -> Self {
        self.private_key_cipher = cipher;
        self
    }

    /// Check the parameter set before asking the provider for a key.
    pub fn validate(&self) -> Result<()> {
        if self.bits < MIN_KEY_BITS {
            return Err(SealError::KeyGeneration(format!(
                "key size {} is below the minimum of {} bits",
                self.bits, MIN_KEY_BITS
            )));
        }
        if self.bits % 8 != 0 {
            return Err(SealError::KeyGeneration(format!(
                "key size {} is not a whole number of bytes",
                self.bits
            )));
        }
        Ok(())
    }
}

/// Where key material comes from.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    /// Path to a PEM file
    File(&'a Path),
    /// PEM text
    Pem(&'a str),
}

impl<'a> KeySource<'a> {
    /// Treat `value` as a file path if an existing file has that name,
    /// otherwise as PEM text. Probing never fails.
    pub fn detect(value: &'a str) -> Self {
        let path = Path::new(value);
        if !value.contains('\n') && path.is_file() {
            KeySource::File(path)
        } else {
            KeySource::Pem(value)
        }
    }
}

/// PKCS#1 v1.5 signature scheme bound to a digest algorithm.
pub(crate) fn signature_scheme(algo: HashAlgorithm) -> Pkcs1v15Sign {
    match algo {
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    Ok(base64::engine::general_purpose::STANDARD.decode(text.trim())?)
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_names() {
        assert_eq!("OAEP".parse::<Padding>().unwrap(), Padding::Oaep);
        assert_eq!("pkcs1".parse::<Padding>().unwrap(), Padding::Pkcs1v15);
        assert!(matches!(
            "none".parse::<Padding>(),
            Err(SealError::UnsupportedPadding(_))
        ));
    }

    #[test]
    fn test_default_params() {
        let params = KeyParams::default();
        assert_eq!(params.bits, 4096);
        assert_eq!(params.digest, HashAlgorithm::Sha512);
        assert_eq!(params.key_type, KeyType::Rsa);
        assert_eq!(params.private_key_cipher, PrivateKeyCipher::ScryptAes256Cbc);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_private_key_cipher_names() {
        for cipher in PrivateKeyCipher::ALL {
            assert_eq!(cipher.name().parse::<PrivateKeyCipher>().unwrap(), cipher);
        }
        assert_eq!(
            "PBKDF2-SHA256-AES-128-CBC".parse::<PrivateKeyCipher>().unwrap(),
            PrivateKeyCipher::Pbkdf2Sha256Aes128Cbc
        );
        assert!(matches!(
            "des-ede3-cbc".parse::<PrivateKeyCipher>(),
            Err(SealError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_params_reject_small_keys() {
        let result = KeyParams::with_bits(512).validate();
        assert!(matches!(result, Err(SealError::KeyGeneration(_))));
        assert!(KeyParams::with_bits(2049).validate().is_err());
    }

    #[test]
    fn test_detect_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(matches!(KeySource::detect(path), KeySource::File(_)));
        assert!(matches!(
            KeySource::detect("-----BEGIN PUBLIC KEY-----\nabc\n"),
            KeySource::Pem(_)
        ));
        assert!(matches!(
            KeySource::detect("/no/such/key.pem"),
            KeySource::Pem(_)
        ));
    }
}
