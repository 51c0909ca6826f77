use std::fmt;
use std::fs;
use std::path::Path;

use pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, Pkcs1v15Encrypt, RsaPublicKey};
use sha2::Sha256;

use super::{decode_base64, encode_base64, signature_scheme, Padding};
use crate::digest::HashAlgorithm;
use crate::error::{Result, SealError};

const SPKI_LABEL: &str = "-----BEGIN PUBLIC KEY-----";
const PKCS1_LABEL: &str = "-----BEGIN RSA PUBLIC KEY-----";

/// Minimum PKCS#1 v1.5 overhead: `00 01`, eight `FF` bytes, `00`.
const TYPE1_OVERHEAD: usize = 11;

/// An RSA public key.
///
/// Imports SubjectPublicKeyInfo (`PUBLIC KEY`) and PKCS#1 (`RSA PUBLIC KEY`)
/// PEM, and always exports SubjectPublicKeyInfo. The fingerprint is the
/// SHA-256 of the exported PEM, so two keys with the same modulus and
/// exponent always render the same regardless of how they were imported.
#[derive(Clone)]
pub struct PublicKey {
    key: RsaPublicKey,
    pem: String,
    fingerprint: String,
}

impl PublicKey {
    /// Parse PEM text.
    ///
    /// # Errors
    ///
    /// Returns `SealError::InvalidKeyMaterial` if the text holds no public
    /// key block or the block does not parse.
    pub fn import(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let key = if pem.contains(SPKI_LABEL) {
            RsaPublicKey::from_public_key_pem(pem)
                .map_err(|e| SealError::InvalidKeyMaterial(e.to_string()))?
        } else if pem.contains(PKCS1_LABEL) {
            RsaPublicKey::from_pkcs1_pem(pem)
                .map_err(|e| SealError::InvalidKeyMaterial(e.to_string()))?
        } else if pem.contains("PRIVATE KEY-----") {
            return Err(SealError::InvalidKeyMaterial(
                "expected a public key, found private key material".to_string(),
            ));
        } else {
            return Err(SealError::InvalidKeyMaterial(
                "no PEM public key block found".to_string(),
            ));
        };
        Self::from_rsa(key)
    }

    /// Read and parse a PEM file.
    pub fn import_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SealError::FileNotFound(path.to_path_buf()));
        }
        let pem = fs::read_to_string(path)?;
        Self::import(&pem)
    }

    pub(crate) fn from_rsa(key: RsaPublicKey) -> Result<Self> {
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| SealError::InvalidKeyMaterial(e.to_string()))?;
        let fingerprint = HashAlgorithm::Sha256.hex_digest(pem.as_bytes());
        Ok(Self {
            key,
            pem,
            fingerprint,
        })
    }

    /// SubjectPublicKeyInfo PEM.
    pub fn export(&self) -> &str {
        &self.pem
    }

    /// Write the PEM to `path`, replacing any existing file.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        crate::fs::write_atomic(path.as_ref(), self.pem.as_bytes(), false)?;
        Ok(())
    }

    /// Hex SHA-256 of the exported PEM.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.key.n().bits()
    }

    /// Modulus size in bytes, which is also the size of every ciphertext.
    pub fn size(&self) -> usize {
        self.key.size()
    }

    /// Encrypt so that only the private key holder can decrypt.
    pub fn encrypt(&self, data: &[u8], padding: Padding) -> Result<Vec<u8>> {
        let mut rng = OsRng;
        let result = match padding {
            Padding::Oaep => self.key.encrypt(&mut rng, Oaep::new::<Sha256>(), data),
            Padding::Pkcs1v15 => self.key.encrypt(&mut rng, Pkcs1v15Encrypt, data),
        };
        result.map_err(|e| SealError::Provider(format!("public encrypt: {}", e)))
    }

    /// [`encrypt`](Self::encrypt) with base64 output.
    pub fn encrypt_text(&self, data: &[u8], padding: Padding) -> Result<String> {
        self.encrypt(data, padding).map(|bytes| encode_base64(&bytes))
    }

    /// Recover data that the private key encrypted.
    ///
    /// This is the inverse of `PrivateKey::encrypt`: the ciphertext is raised
    /// to the public exponent and the PKCS#1 v1.5 type 1 block is stripped.
    /// Only [`Padding::Pkcs1v15`] has a meaning in this direction.
    pub fn decrypt(&self, data: &[u8], padding: Padding) -> Result<Vec<u8>> {
        if padding != Padding::Pkcs1v15 {
            return Err(SealError::UnsupportedPadding(format!(
                "{} cannot be used to decrypt with a public key",
                padding
            )));
        }

        let size = self.key.size();
        if data.len() != size {
            return Err(SealError::Provider(format!(
                "public decrypt: ciphertext is {} bytes, key size is {}",
                data.len(),
                size
            )));
        }
        let cipher = BigUint::from_bytes_be(data);
        if &cipher >= self.key.n() {
            return Err(SealError::Provider(
                "public decrypt: ciphertext out of range".to_string(),
            ));
        }

        let message = cipher.modpow(self.key.e(), self.key.n()).to_bytes_be();
        let mut block = vec![0u8; size];
        block[size - message.len()..].copy_from_slice(&message);
        strip_type1(&block)
    }

    /// [`decrypt`](Self::decrypt) with base64 input.
    pub fn decrypt_text(&self, data: &str, padding: Padding) -> Result<Vec<u8>> {
        self.decrypt(&decode_base64(data)?, padding)
    }

    /// Check a PKCS#1 v1.5 signature over `data`.
    ///
    /// `Ok(false)` means the signature is conclusively invalid. Any other
    /// provider failure is `SealError::VerificationInconclusive`.
    pub fn verify(&self, data: &[u8], signature: &[u8], algo: HashAlgorithm) -> Result<bool> {
        let hashed = algo.digest(data);
        match self.key.verify(signature_scheme(algo), &hashed, signature) {
            Ok(()) => Ok(true),
            Err(rsa::Error::Verification) => Ok(false),
            Err(e) => Err(SealError::VerificationInconclusive(e.to_string())),
        }
    }

    /// [`verify`](Self::verify) with a base64 signature.
    pub fn verify_text(&self, data: &[u8], signature: &str, algo: HashAlgorithm) -> Result<bool> {
        self.verify(data, &decode_base64(signature)?, algo)
    }

    pub(crate) fn rsa(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Strip `00 01 FF..FF 00` and return the payload.
fn strip_type1(block: &[u8]) -> Result<Vec<u8>> {
    let invalid = || SealError::Provider("public decrypt: invalid type 1 padding".to_string());

    if block.len() < TYPE1_OVERHEAD || block[0] != 0x00 || block[1] != 0x01 {
        return Err(invalid());
    }
    let separator = block[2..]
        .iter()
        .position(|&byte| byte != 0xff)
        .map(|offset| offset + 2)
        .ok_or_else(invalid)?;
    if block[separator] != 0x00 || separator < TYPE1_OVERHEAD - 1 {
        return Err(invalid());
    }
    Ok(block[separator + 1..].to_vec())
}
