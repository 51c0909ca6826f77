//! Command handlers, one module per command family.

pub mod envelope;
pub mod form;
pub mod hash;
pub mod keys;
pub mod misc;
pub mod sign;

pub use envelope::{handle_decrypt, handle_encrypt};
pub use form::{handle_form_sign, handle_form_verify};
pub use hash::handle_hash;
pub use keys::{handle_fingerprint, handle_keygen};
pub use misc::handle_completions;
pub use sign::{handle_sign, handle_verify};
