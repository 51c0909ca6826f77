use serde::Serialize;

use super::fields::FieldMap;
use crate::error::FormError;

pub const FIELD_NAME: &str = "name";
pub const FIELD_IP: &str = "ip";
pub const FIELD_EXPIRES: &str = "expires";
pub const FIELD_SIGNATURE: &str = "signature";

/// The four fields a signed form carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attestation {
    /// Name of the signed form
    pub name: String,
    /// Client address the form was signed for, as text
    pub ip: String,
    /// Unix timestamp after which the attestation is void
    pub expires: i64,
    /// `expires` exactly as it was signed or submitted
    #[serde(skip)]
    pub expires_text: String,
    /// Base64 signature over the canonical message
    pub signature: String,
}

impl Attestation {
    /// An attestation for freshly signed values.
    pub fn new(name: &str, ip: &str, expires: i64, signature: String) -> Self {
        Self {
            name: name.to_string(),
            ip: ip.to_string(),
            expires,
            expires_text: expires.to_string(),
            signature,
        }
    }

    /// The exact bytes that are signed: `name-ip-expires`.
    pub fn canonical_message(name: &str, ip: &str, expires: &str) -> String {
        format!("{}-{}-{}", name, ip, expires)
    }

    /// Canonical message rebuilt from the fields as submitted, with the raw
    /// `expires` text.
    pub fn message(&self) -> String {
        Self::canonical_message(&self.name, &self.ip, &self.expires_text)
    }

    /// Extract the attestation stored under `group` in a form's fields.
    ///
    /// Checks, in order: the group is present, the group is a map, all four
    /// fields are present, `expires` is an integer.
    pub fn parse(fields: &FieldMap, group: &str) -> Result<Self, FormError> {
        let value = fields
            .get(group)
            .ok_or_else(|| FormError::MissingAttestation(group.to_string()))?;
        let map = value
            .as_map()
            .ok_or_else(|| FormError::NotAFieldMap(group.to_string()))?;

        let name = required(map, FIELD_NAME)?;
        let ip = required(map, FIELD_IP)?;
        let signature = required(map, FIELD_SIGNATURE)?;
        let expires_text = required(map, FIELD_EXPIRES)?;

        let expires = expires_text
            .trim()
            .parse::<i64>()
            .map_err(|_| FormError::InvalidExpiry(expires_text.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            ip: ip.to_string(),
            expires,
            expires_text: expires_text.to_string(),
            signature: signature.to_string(),
        })
    }

    /// Hidden field names and values for a form named `form`, in the order
    /// they are appended: ip, expires, name, signature.
    pub fn hidden_fields(&self, form: &str, group: &str) -> [(String, String); 4] {
        [
            (field_name(form, group, FIELD_IP), self.ip.clone()),
            (field_name(form, group, FIELD_EXPIRES), self.expires_text.clone()),
            (field_name(form, group, FIELD_NAME), self.name.clone()),
            (field_name(form, group, FIELD_SIGNATURE), self.signature.clone()),
        ]
    }
}

/// `form[group][key]`
pub fn field_name(form: &str, group: &str, key: &str) -> String {
    format!("{}[{}][{}]", form, group, key)
}

fn required<'a>(map: &'a FieldMap, key: &'static str) -> Result<&'a str, FormError> {
    map.text(key).ok_or(FormError::MissingField(key))
}
