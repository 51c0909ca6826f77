//! Signed forms.
//!
//! A [`FormSigner`] attaches an attestation to a form: the form's name, the
//! client IP it was served to and an expiry, signed with the signer's key
//! pair. On submission the attestation is rebuilt from the posted fields and
//! checked in order (presence, expiry, IP, signature) so that malformed,
//! stale or replayed submissions are rejected before any RSA work happens.
//!
//! The markup and the request are reached through the [`FormElement`] and
//! [`RequestContext`] traits. [`KeyRing`] caches signers per credentials
//! file.

mod attestation;
mod context;
mod element;
mod fields;
mod keyring;
mod signer;

pub use attestation::{field_name, Attestation};
pub use context::{FixedRequest, RequestContext, SystemRequest};
pub use element::{FormElement, HiddenInput, HtmlForm};
pub use fields::{FieldMap, FieldValue};
pub use keyring::{credentials_path, Credentials, KeyRing};
pub use signer::{default_ttl, FormSigner, DEFAULT_GROUP, DEFAULT_TTL_SECS};
