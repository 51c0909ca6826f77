//! # Sealkit Core
//!
//! Core library for Sealkit - RSA key handling, password-based envelopes and
//! signed web forms.
//!
//! This crate provides the cryptographic facade independent of the CLI
//! interface. Primitives come from the RustCrypto crates; this crate owns the
//! formats and protocols built on top of them.
//!
//! ## Architecture
//!
//! - **keys**: public/private RSA keys and the key pair that composes them
//! - **envelope**: self-describing `options:cipher:hash:iv:data` encryption
//! - **form**: signed, expiring, IP-bound attestations attached to forms
//! - **digest**: hex digests and constant-time digest matching
//! - **password**: Argon2id password hashing
//! - **fs**: atomic key file writes
//!
//! ## Failure policy
//!
//! Key import and generation errors are fatal to the caller that asked for
//! the key. Per-call failures (encrypt, decrypt, sign, verify, envelope
//! decoding) are returned as recoverable errors, see [`SealError::is_fatal`].

pub mod digest;
pub mod envelope;
pub mod error;
pub mod form;
pub mod fs;
pub mod keys;
pub mod password;

pub use digest::HashAlgorithm;
pub use envelope::{Envelope, EnvelopeOptions, EnvelopeParams, SymmetricCipher};
pub use error::{FormError, Result, SealError};
pub use form::{
    Attestation, FieldMap, FieldValue, FixedRequest, FormElement, FormSigner, HtmlForm, KeyRing,
    RequestContext, SystemRequest,
};
pub use keys::{
    KeyPair, KeyParams, KeySource, KeyType, Padding, PrivateKey, PrivateKeyCipher, PublicKey,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
