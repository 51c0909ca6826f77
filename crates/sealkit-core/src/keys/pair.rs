use std::fmt;
use std::path::Path;

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use tracing::{debug, info};

use super::{KeyParams, KeySource, KeyType, Padding, PrivateKey, PrivateKeyCipher, PublicKey};
use crate::digest::HashAlgorithm;
use crate::error::{Result, SealError};

/// A public key and the private key it belongs to.
///
/// Construction checks that both halves share the same modulus and public
/// exponent, so every operation on a `KeyPair` can assume they match. The
/// pair also carries a default signing digest used by [`sign`](Self::sign)
/// and [`verify`](Self::verify), and the cipher that
/// [`export_to_files`](Self::export_to_files) locks the private half with.
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
    digest: HashAlgorithm,
    private_key_cipher: PrivateKeyCipher,
}

impl KeyPair {
    /// Compose a pair from already-parsed halves.
    ///
    /// # Errors
    ///
    /// Returns `SealError::KeyMismatch` if the halves do not belong together.
    pub fn new(public: PublicKey, private: PrivateKey) -> Result<Self> {
        if public.rsa() != &private.rsa().to_public_key() {
            return Err(SealError::KeyMismatch);
        }
        Ok(Self {
            public,
            private,
            digest: HashAlgorithm::default(),
            private_key_cipher: PrivateKeyCipher::default(),
        })
    }

    /// Generate a fresh pair.
    ///
    /// With a password the private key is exported encrypted and imported
    /// back, so a pair that was just generated behaves exactly like one
    /// loaded from the files [`export_to_files`](Self::export_to_files)
    /// writes.
    pub fn generate(password: Option<&str>, params: &KeyParams) -> Result<Self> {
        params.validate()?;
        info!(
            bits = params.bits,
            digest = %params.digest,
            cipher = %params.private_key_cipher,
            "generating key pair"
        );

        let mut private = match params.key_type {
            KeyType::Rsa => RsaPrivateKey::new(&mut OsRng, params.bits)
                .map(PrivateKey::from_rsa)
                .map_err(|e| SealError::KeyGeneration(e.to_string()))?,
        };

        if let Some(password) = password {
            let locked = private.export_with(Some(password), params.private_key_cipher)?;
            private = PrivateKey::import(&locked, Some(password))?;
        }

        let public = private.public_key()?;
        debug!(fingerprint = %public, "key pair generated");
        Ok(Self::new(public, private)?
            .with_digest(params.digest)
            .with_private_key_cipher(params.private_key_cipher))
    }

    /// Load both halves from PEM files.
    pub fn from_files(
        public: impl AsRef<Path>,
        private: impl AsRef<Path>,
        password: Option<&str>,
    ) -> Result<Self> {
        let public = PublicKey::import_from_file(public)?;
        let private = PrivateKey::import_from_file(private, password)?;
        Self::new(public, private)
    }

    /// Load each half from a file path or PEM text, whichever `value` is.
    ///
    /// See [`KeySource::detect`].
    pub fn from_sources(public: &str, private: &str, password: Option<&str>) -> Result<Self> {
        Self::from_key_sources(
            KeySource::detect(public),
            KeySource::detect(private),
            password,
        )
    }

    /// Load each half from an explicit source.
    pub fn from_key_sources(
        public: KeySource<'_>,
        private: KeySource<'_>,
        password: Option<&str>,
    ) -> Result<Self> {
        let public = match public {
            KeySource::File(path) => PublicKey::import_from_file(path)?,
            KeySource::Pem(pem) => PublicKey::import(pem)?,
        };
        let private = match private {
            KeySource::File(path) => PrivateKey::import_from_file(path, password)?,
            KeySource::Pem(pem) => PrivateKey::import(pem, password)?,
        };
        Self::new(public, private)
    }

    /// Replace the default signing digest.
    pub fn with_digest(mut self, digest: HashAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    /// Replace the cipher used when exporting the private half.
    pub fn with_private_key_cipher(mut self, cipher: PrivateKeyCipher) -> Self {
        self.private_key_cipher = cipher;
        self
    }

    /// Write both halves as PEM files. The private file is owner-only and,
    /// with a password, locked with the pair's private-key cipher.
    pub fn export_to_files(
        &self,
        public: impl AsRef<Path>,
        private: impl AsRef<Path>,
        password: Option<&str>,
    ) -> Result<()> {
        self.public.export_to_file(public)?;
        self.private
            .export_to_file_with(private, password, self.private_key_cipher)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Default signing digest.
    pub fn digest(&self) -> HashAlgorithm {
        self.digest
    }

    pub fn private_key_cipher(&self) -> PrivateKeyCipher {
        self.private_key_cipher
    }

    /// Fingerprint of the public half.
    pub fn fingerprint(&self) -> &str {
        self.public.fingerprint()
    }

    pub fn public_encrypt(&self, data: &[u8], padding: Padding) -> Result<Vec<u8>> {
        self.public.encrypt(data, padding)
    }

    pub fn public_decrypt(&self, data: &[u8], padding: Padding) -> Result<Vec<u8>> {
        self.public.decrypt(data, padding)
    }

    pub fn private_encrypt(&self, data: &[u8], padding: Padding) -> Result<Vec<u8>> {
        self.private.encrypt(data, padding)
    }

    pub fn private_decrypt(&self, data: &[u8], padding: Padding) -> Result<Vec<u8>> {
        self.private.decrypt(data, padding)
    }

    /// Base64 signature over `data` with the default digest.
    pub fn sign(&self, data: &[u8]) -> Result<String> {
        self.private.sign_text(data, self.digest)
    }

    /// Check a base64 signature made with the default digest.
    pub fn verify(&self, data: &[u8], signature: &str) -> Result<bool> {
        self.public.verify_text(data, signature, self.digest)
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.public, f)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &self.private)
            .field("digest", &self.digest)
            .field("private_key_cipher", &self.private_key_cipher)
            .finish()
    }
}
