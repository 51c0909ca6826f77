//! Error types for Sealkit core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer will map these
//! to user-friendly messages.
//!
//! Two families exist:
//! - [`SealError`] for key handling, asymmetric operations and envelopes
//! - [`FormError`] for the form signing protocol

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Sealkit operations.
pub type Result<T> = std::result::Result<T, SealError>;

/// Core error type for Sealkit operations.
#[derive(Debug, Error)]
pub enum SealError {
    /// Key material could not be parsed or unlocked
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Key file does not exist
    #[error("Key file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Public and private halves of a pair do not belong together
    #[error("Public key does not match private key")]
    KeyMismatch,

    /// The provider could not generate a key
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Cipher or hash identifier is not in the supported set
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Padding mode cannot be used for the requested direction
    #[error("Unsupported padding: {0}")]
    UnsupportedPadding(String),

    /// Envelope text does not follow the `options:cipher:hash:iv:data` layout
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Initialization vector length does not match the cipher
    #[error("Invalid IV length: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// Length required by the cipher
        expected: usize,
        /// Length found in the envelope
        actual: usize,
    },

    /// The primitive provider rejected the operation
    #[error("Crypto provider error: {0}")]
    Provider(String),

    /// Signature check neither succeeded nor conclusively failed
    #[error("Signature verification inconclusive: {0}")]
    VerificationInconclusive(String),

    /// Text encoding (base64, hex, UTF-8) error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl SealError {
    /// Whether the error aborts the operation that requested the key.
    ///
    /// Construction-time failures have no safe continuation. Everything else
    /// is scoped to a single call and the caller may retry or reject the
    /// request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SealError::InvalidKeyMaterial(_)
                | SealError::FileNotFound(_)
                | SealError::KeyMismatch
                | SealError::KeyGeneration(_)
        )
    }
}

impl From<base64::DecodeError> for SealError {
    fn from(err: base64::DecodeError) -> Self {
        SealError::Encoding(err.to_string())
    }
}

/// Failure reasons of the form signing protocol.
///
/// All of these are soft failures: `FormSigner::verify` folds them into
/// `false` after logging, and signing leaves the form untouched.
#[derive(Debug, Error)]
pub enum FormError {
    /// Target element is not a `<form>`
    #[error("Expected a <form>, got a <{0}>")]
    NotAForm(String),

    /// Form has no `name` attribute, or it is empty
    #[error("Forms require a name in order to be signed")]
    MissingName,

    /// Grouping key absent from the submitted fields
    #[error("No verification data found under \"{0}\"")]
    MissingAttestation(String),

    /// Grouping key holds a scalar instead of a field map
    #[error("Verification data under \"{0}\" is not a field map")]
    NotAFieldMap(String),

    /// One of `name`, `ip`, `signature`, `expires` is absent
    #[error("Invalid form signature formatting: missing \"{0}\"")]
    MissingField(&'static str),

    /// `expires` is not a decimal integer
    #[error("Form signature expiry is not a timestamp: {0}")]
    InvalidExpiry(String),

    /// Current time is past `expires`
    #[error("Form signature expired at {expires} (now {now})")]
    Expired {
        /// Attested expiry
        expires: i64,
        /// Verification time
        now: i64,
    },

    /// `ip` is not a syntactically valid address
    #[error("Form verification IP is not a valid address: {0}")]
    InvalidIp(String),

    /// `ip` differs from the verifying request's origin
    #[error("Form verification IP does not match user IP")]
    IpMismatch,

    /// Signature is conclusively invalid for the rebuilt message
    #[error("Form signature is invalid")]
    BadSignature,

    /// Signing or verification failed inside the key pair
    #[error("Form signature error: {0}")]
    Signature(#[source] SealError),

    /// Credentials file could not be turned into a signer
    #[error("Form credentials error: {0}")]
    Credentials(#[source] SealError),
}
