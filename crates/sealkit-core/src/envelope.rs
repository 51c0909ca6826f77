//! Password-based symmetric envelopes.
//!
//! An envelope carries everything needed to decrypt except the password:
//!
//! ```text
//! options:base64(cipher):base64(hash):base64(iv):data
//! ```
//!
//! - `options` is a decimal bit set ([`EnvelopeOptions`])
//! - `cipher` and `hash` are algorithm identifiers (`AES-256-CBC`, `sha512`)
//! - `iv` is a fresh random IV sized for the cipher
//! - `data` is the ciphertext, base64 unless `RAW_DATA` is set
//!
//! Only the first four colons are structural, so raw ciphertext may contain
//! colons. The symmetric key is the leading `key_len` bytes of the lowercase
//! hex digest of the password.
//!
//! GCM ciphers append an authentication tag and reject any modified
//! ciphertext. CBC ciphers carry no tag: tampering usually breaks the padding
//! check but is not guaranteed to be detected.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use zeroize::Zeroizing;

use crate::digest::HashAlgorithm;
use crate::error::{Result, SealError};

const DELIMITER: u8 = b':';
const FIELD_COUNT: usize = 5;
const AES_BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Envelope option bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EnvelopeOptions(u32);

impl EnvelopeOptions {
    pub const NONE: Self = Self(0);
    /// Ciphertext field holds raw bytes instead of base64.
    pub const RAW_DATA: Self = Self(1);
    /// No block padding; plaintext must be a multiple of the block size.
    pub const ZERO_PADDING: Self = Self(2);

    const KNOWN_BITS: u32 = Self::RAW_DATA.0 | Self::ZERO_PADDING.0;

    /// Parse a bit set, rejecting bits that have no meaning.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::KNOWN_BITS != 0 {
            return Err(SealError::MalformedEnvelope(format!(
                "unknown option bits {}",
                bits
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn raw_data(self) -> bool {
        self.contains(Self::RAW_DATA)
    }

    pub fn zero_padding(self) -> bool {
        self.contains(Self::ZERO_PADDING)
    }
}

impl BitOr for EnvelopeOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Supported symmetric ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymmetricCipher {
    Aes128Cbc,
    Aes192Cbc,
    #[default]
    Aes256Cbc,
    Aes128Gcm,
    Aes256Gcm,
}

impl SymmetricCipher {
    pub const ALL: [SymmetricCipher; 5] = [
        SymmetricCipher::Aes128Cbc,
        SymmetricCipher::Aes192Cbc,
        SymmetricCipher::Aes256Cbc,
        SymmetricCipher::Aes128Gcm,
        SymmetricCipher::Aes256Gcm,
    ];

    /// Canonical identifier as written into envelopes.
    pub fn name(self) -> &'static str {
        match self {
            SymmetricCipher::Aes128Cbc => "AES-128-CBC",
            SymmetricCipher::Aes192Cbc => "AES-192-CBC",
            SymmetricCipher::Aes256Cbc => "AES-256-CBC",
            SymmetricCipher::Aes128Gcm => "AES-128-GCM",
            SymmetricCipher::Aes256Gcm => "AES-256-GCM",
        }
    }

    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            SymmetricCipher::Aes128Cbc | SymmetricCipher::Aes128Gcm => 16,
            SymmetricCipher::Aes192Cbc => 24,
            SymmetricCipher::Aes256Cbc | SymmetricCipher::Aes256Gcm => 32,
        }
    }

    /// IV (or nonce) length in bytes.
    pub fn iv_len(self) -> usize {
        if self.is_aead() {
            12
        } else {
            AES_BLOCK_SIZE
        }
    }

    /// Whether the cipher authenticates its ciphertext.
    pub fn is_aead(self) -> bool {
        matches!(self, SymmetricCipher::Aes128Gcm | SymmetricCipher::Aes256Gcm)
    }
}

impl fmt::Display for SymmetricCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymmetricCipher {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cipher| cipher.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SealError::UnsupportedAlgorithm(format!("cipher \"{}\"", s)))
    }
}

/// How to build an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeParams {
    pub cipher: SymmetricCipher,
    pub hash: HashAlgorithm,
    pub options: EnvelopeOptions,
}

impl EnvelopeParams {
    /// Build params from identifiers and an option bit set.
    ///
    /// # Errors
    ///
    /// `SealError::UnsupportedAlgorithm` for an unknown cipher or hash,
    /// `SealError::MalformedEnvelope` for unknown option bits.
    pub fn from_names(cipher: &str, hash: &str, options: u32) -> Result<Self> {
        Ok(Self {
            cipher: cipher.parse()?,
            hash: hash.parse()?,
            options: EnvelopeOptions::from_bits(options)?,
        })
    }

    pub fn with_cipher(mut self, cipher: SymmetricCipher) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_options(mut self, options: EnvelopeOptions) -> Self {
        self.options = options;
        self
    }
}

/// A parsed envelope.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    pub options: EnvelopeOptions,
    pub cipher: SymmetricCipher,
    pub hash: HashAlgorithm,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encrypt `data` under `password`.
    pub fn seal(data: &[u8], password: &str, params: &EnvelopeParams) -> Result<Self> {
        let mut iv = vec![0u8; params.cipher.iv_len()];
        getrandom::getrandom(&mut iv)
            .map_err(|e| SealError::Provider(format!("Failed to generate IV: {}", e)))?;

        let key = derive_key(password, params.hash, params.cipher);
        let ciphertext = encrypt_with(params.cipher, &key, &iv, params.options, data)?;
        debug!(
            cipher = %params.cipher,
            hash = %params.hash,
            options = params.options.bits(),
            bytes = data.len(),
            "sealed envelope"
        );

        Ok(Self {
            options: params.options,
            cipher: params.cipher,
            hash: params.hash,
            iv,
            ciphertext,
        })
    }

    /// Decrypt with `password`.
    pub fn open(&self, password: &str) -> Result<Vec<u8>> {
        let key = derive_key(password, self.hash, self.cipher);
        decrypt_with(self.cipher, &key, &self.iv, self.options, &self.ciphertext)
    }

    /// Parse the wire form.
    ///
    /// Validation order: field count, option bits, base64 of the header
    /// fields, hash identifier, cipher identifier, IV length, ciphertext
    /// encoding.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let fields: Vec<&[u8]> = input.splitn(FIELD_COUNT, |&b| b == DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(SealError::MalformedEnvelope(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let options = std::str::from_utf8(fields[0])
            .ok()
            .and_then(|text| text.parse::<u32>().ok())
            .ok_or_else(|| SealError::MalformedEnvelope("options is not a number".to_string()))?;
        let options = EnvelopeOptions::from_bits(options)?;

        let cipher_name = decode_field_text(fields[1], "cipher")?;
        let hash_name = decode_field_text(fields[2], "hash")?;
        let iv = decode_field(fields[3], "iv")?;

        let hash: HashAlgorithm = hash_name.parse()?;
        let cipher: SymmetricCipher = cipher_name.parse()?;
        if iv.len() != cipher.iv_len() {
            return Err(SealError::InvalidIvLength {
                expected: cipher.iv_len(),
                actual: iv.len(),
            });
        }

        let ciphertext = if options.raw_data() {
            fields[4].to_vec()
        } else {
            decode_field(fields[4], "data")?
        };

        Ok(Self {
            options,
            cipher,
            hash,
            iv,
            ciphertext,
        })
    }

    /// Wire form as bytes. Always valid, including raw envelopes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.header().into_bytes();
        if self.options.raw_data() {
            out.extend_from_slice(&self.ciphertext);
        } else {
            out.extend_from_slice(STANDARD.encode(&self.ciphertext).as_bytes());
        }
        out
    }

    /// Wire form as text.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Encoding` for raw envelopes, whose ciphertext is
    /// not text.
    pub fn to_text(&self) -> Result<String> {
        if self.options.raw_data() {
            return Err(SealError::Encoding(
                "raw envelopes are binary, use to_bytes".to_string(),
            ));
        }
        Ok(format!("{}{}", self.header(), STANDARD.encode(&self.ciphertext)))
    }

    fn header(&self) -> String {
        format!(
            "{}:{}:{}:{}:",
            self.options.bits(),
            STANDARD.encode(self.cipher.name()),
            STANDARD.encode(self.hash.name()),
            STANDARD.encode(&self.iv)
        )
    }
}

impl FromStr for Envelope {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.as_bytes())
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("options", &self.options.bits())
            .field("cipher", &self.cipher)
            .field("hash", &self.hash)
            .field("iv", &hex::encode(&self.iv))
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Encrypt `data` and serialize the envelope.
pub fn encrypt(data: &[u8], password: &str, params: &EnvelopeParams) -> Result<Vec<u8>> {
    Envelope::seal(data, password, params).map(|envelope| envelope.to_bytes())
}

/// Parse an envelope and decrypt it.
pub fn decrypt(input: &[u8], password: &str) -> Result<Vec<u8>> {
    Envelope::parse(input)?.open(password)
}

fn derive_key(password: &str, hash: HashAlgorithm, cipher: SymmetricCipher) -> Zeroizing<Vec<u8>> {
    let digest = Zeroizing::new(hash.hex_digest(password.as_bytes()));
    let mut key = Zeroizing::new(vec![0u8; cipher.key_len()]);
    let take = digest.len().min(key.len());
    key[..take].copy_from_slice(&digest.as_bytes()[..take]);
    key
}

fn decode_field(field: &[u8], what: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(field)
        .map_err(|e| SealError::MalformedEnvelope(format!("{} is not base64: {}", what, e)))
}

fn decode_field_text(field: &[u8], what: &str) -> Result<String> {
    String::from_utf8(decode_field(field, what)?)
        .map_err(|_| SealError::MalformedEnvelope(format!("{} is not UTF-8", what)))
}

fn encrypt_with(
    cipher: SymmetricCipher,
    key: &[u8],
    iv: &[u8],
    options: EnvelopeOptions,
    data: &[u8],
) -> Result<Vec<u8>> {
    let unpadded = options.zero_padding();
    match cipher {
        SymmetricCipher::Aes128Cbc => cbc_encrypt::<Aes128CbcEnc>(key, iv, unpadded, data),
        SymmetricCipher::Aes192Cbc => cbc_encrypt::<Aes192CbcEnc>(key, iv, unpadded, data),
        SymmetricCipher::Aes256Cbc => cbc_encrypt::<Aes256CbcEnc>(key, iv, unpadded, data),
        SymmetricCipher::Aes128Gcm => gcm_encrypt::<Aes128Gcm>(key, iv, data),
        SymmetricCipher::Aes256Gcm => gcm_encrypt::<Aes256Gcm>(key, iv, data),
    }
}

fn decrypt_with(
    cipher: SymmetricCipher,
    key: &[u8],
    iv: &[u8],
    options: EnvelopeOptions,
    data: &[u8],
) -> Result<Vec<u8>> {
    if iv.len() != cipher.iv_len() {
        return Err(SealError::InvalidIvLength {
            expected: cipher.iv_len(),
            actual: iv.len(),
        });
    }
    let unpadded = options.zero_padding();
    match cipher {
        SymmetricCipher::Aes128Cbc => cbc_decrypt::<Aes128CbcDec>(key, iv, unpadded, data),
        SymmetricCipher::Aes192Cbc => cbc_decrypt::<Aes192CbcDec>(key, iv, unpadded, data),
        SymmetricCipher::Aes256Cbc => cbc_decrypt::<Aes256CbcDec>(key, iv, unpadded, data),
        SymmetricCipher::Aes128Gcm => gcm_decrypt::<Aes128Gcm>(key, iv, data),
        SymmetricCipher::Aes256Gcm => gcm_decrypt::<Aes256Gcm>(key, iv, data),
    }
}

fn check_block_aligned(len: usize) -> Result<()> {
    if len % AES_BLOCK_SIZE != 0 {
        return Err(SealError::Provider(format!(
            "data length {} is not a multiple of the {} byte block size",
            len, AES_BLOCK_SIZE
        )));
    }
    Ok(())
}

fn cbc_encrypt<E>(key: &[u8], iv: &[u8], unpadded: bool, data: &[u8]) -> Result<Vec<u8>>
where
    E: KeyIvInit + BlockEncryptMut,
{
    let encryptor = E::new_from_slices(key, iv)
        .map_err(|e| SealError::Provider(format!("cipher init: {}", e)))?;
    if unpadded {
        check_block_aligned(data.len())?;
        Ok(encryptor.encrypt_padded_vec_mut::<NoPadding>(data))
    } else {
        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(data))
    }
}

fn cbc_decrypt<D>(key: &[u8], iv: &[u8], unpadded: bool, data: &[u8]) -> Result<Vec<u8>>
where
    D: KeyIvInit + BlockDecryptMut,
{
    check_block_aligned(data.len())?;
    let decryptor = D::new_from_slices(key, iv)
        .map_err(|e| SealError::Provider(format!("cipher init: {}", e)))?;
    let result = if unpadded {
        decryptor.decrypt_padded_vec_mut::<NoPadding>(data)
    } else {
        decryptor.decrypt_padded_vec_mut::<Pkcs7>(data)
    };
    result.map_err(|_| SealError::Provider("decryption failed: bad padding".to_string()))
}

fn gcm_encrypt<A>(key: &[u8], nonce: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    A: Aead + KeyInit,
{
    let cipher =
        A::new_from_slice(key).map_err(|e| SealError::Provider(format!("cipher init: {}", e)))?;
    cipher
        .encrypt(aes_gcm::aead::Nonce::<A>::from_slice(nonce), data)
        .map_err(|_| SealError::Provider("encryption failed".to_string()))
}

fn gcm_decrypt<A>(key: &[u8], nonce: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    A: Aead + KeyInit,
{
    let cipher =
        A::new_from_slice(key).map_err(|e| SealError::Provider(format!("cipher init: {}", e)))?;
    cipher
        .decrypt(aes_gcm::aead::Nonce::<A>::from_slice(nonce), data)
        .map_err(|_| SealError::Provider("decryption failed: authentication tag mismatch".to_string()))
}
