use std::net::IpAddr;

use chrono::Duration;
use tracing::{debug, warn};

use super::attestation::Attestation;
use super::context::RequestContext;
use super::element::FormElement;
use super::fields::FieldMap;
use crate::error::FormError;
use crate::keys::KeyPair;

/// Grouping key the attestation fields are nested under by default.
pub const DEFAULT_GROUP: &str = "verification";

/// Default attestation lifetime in seconds (two hours).
pub const DEFAULT_TTL_SECS: i64 = 2 * 60 * 60;

/// Default attestation lifetime.
pub fn default_ttl() -> Duration {
    Duration::seconds(DEFAULT_TTL_SECS)
}

/// Signs forms and verifies submitted attestations with one key pair.
///
/// A signer holds no per-request state; one instance can serve concurrent
/// requests.
#[derive(Debug)]
pub struct FormSigner {
    keys: KeyPair,
}

impl FormSigner {
    pub fn new(keys: KeyPair) -> Self {
        Self { keys }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.keys
    }

    /// Sign `name` for a client at `ip` until `expires`.
    pub fn attest(&self, name: &str, ip: IpAddr, expires: i64) -> Result<Attestation, FormError> {
        let ip = ip.to_string();
        let message = Attestation::canonical_message(name, &ip, &expires.to_string());
        let signature = self
            .keys
            .sign(message.as_bytes())
            .map_err(FormError::Signature)?;
        Ok(Attestation::new(name, &ip, expires, signature))
    }

    /// Attach a signed attestation to `form` as four hidden inputs nested
    /// under `group`.
    ///
    /// The form is left untouched on error.
    ///
    /// # Errors
    ///
    /// `FormError::NotAForm` if the element is not a `<form>`,
    /// `FormError::MissingName` if it has no name, `FormError::Signature` if
    /// signing fails.
    pub fn sign_form<F, R>(
        &self,
        form: &mut F,
        request: &R,
        ttl: Duration,
        group: &str,
    ) -> Result<Attestation, FormError>
    where
        F: FormElement + ?Sized,
        R: RequestContext + ?Sized,
    {
        if !form.tag_name().eq_ignore_ascii_case("form") {
            let err = FormError::NotAForm(form.tag_name().to_string());
            warn!(reason = %err, "refusing to sign element");
            return Err(err);
        }
        let name = match form.attribute("name") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                warn!(reason = %FormError::MissingName, "refusing to sign form");
                return Err(FormError::MissingName);
            }
        };

        let expires = request.now() + ttl.num_seconds();
        let attestation = self.attest(&name, request.remote_addr(), expires)?;
        for (field, value) in attestation.hidden_fields(&name, group) {
            form.append_hidden(&field, &value);
        }

        debug!(form = %name, expires, "form signed");
        Ok(attestation)
    }

    /// Check the attestation under `group` in a form's submitted fields.
    ///
    /// `fields` is the map submitted for the form itself, e.g. the value
    /// under `contact` for a form named `contact`. Checks run in a fixed
    /// order and stop at the first failure: attestation present and a map,
    /// all fields present, not expired, IP valid and equal to the request's
    /// origin, signature valid. The signature is only checked once
    /// everything else has passed.
    pub fn check<R>(
        &self,
        fields: &FieldMap,
        group: &str,
        request: &R,
    ) -> Result<Attestation, FormError>
    where
        R: RequestContext + ?Sized,
    {
        let attestation = Attestation::parse(fields, group)?;

        let now = request.now();
        if now > attestation.expires {
            return Err(FormError::Expired {
                expires: attestation.expires,
                now,
            });
        }

        let ip: IpAddr = attestation
            .ip
            .parse()
            .map_err(|_| FormError::InvalidIp(attestation.ip.clone()))?;
        if ip != request.remote_addr() {
            return Err(FormError::IpMismatch);
        }

        match self
            .keys
            .verify(attestation.message().as_bytes(), &attestation.signature)
        {
            Ok(true) => Ok(attestation),
            Ok(false) => Err(FormError::BadSignature),
            Err(err) => Err(FormError::Signature(err)),
        }
    }

    /// [`check`](Self::check) folded into a boolean.
    ///
    /// The failure reason is logged, never returned, so callers cannot leak
    /// which check failed.
    pub fn verify<R>(&self, fields: &FieldMap, group: &str, request: &R) -> bool
    where
        R: RequestContext + ?Sized,
    {
        match self.check(fields, group, request) {
            Ok(attestation) => {
                debug!(form = %attestation.name, "form signature verified");
                true
            }
            Err(err) => {
                warn!(group, reason = %err, "form signature rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FixedRequest, HtmlForm};
    use crate::keys::testing;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> FormSigner {
        let pem = testing::pair().private_key().export(None).unwrap();
        let pair = KeyPair::from_sources(testing::pair().public_key().export(), &pem, None).unwrap();
        FormSigner::new(pair)
    }

    fn request() -> FixedRequest {
        FixedRequest::new(NOW, "10.0.0.5".parse().unwrap())
    }

    fn signed(signer: &FormSigner) -> FieldMap {
        let mut form = HtmlForm::new("contact");
        signer
            .sign_form(&mut form, &request(), default_ttl(), DEFAULT_GROUP)
            .unwrap();
        form.submitted_fields()
            .map("contact")
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_sign_appends_four_fields_in_order() {
        let signer = signer();
        let mut form = HtmlForm::new("contact");
        let attestation = signer
            .sign_form(&mut form, &request(), default_ttl(), DEFAULT_GROUP)
            .unwrap();

        let names: Vec<&str> = form
            .hidden_inputs()
            .iter()
            .map(|input| input.name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "contact[verification][ip]",
                "contact[verification][expires]",
                "contact[verification][name]",
                "contact[verification][signature]",
            ]
        );
        assert_eq!(attestation.expires, NOW + DEFAULT_TTL_SECS);
        assert_eq!(attestation.ip, "10.0.0.5");
    }

    #[test]
    fn test_sign_rejects_wrong_element() {
        let signer = signer();
        let mut div = HtmlForm::element("div").with_attribute("name", "contact");
        let result = signer.sign_form(&mut div, &request(), default_ttl(), DEFAULT_GROUP);
        assert!(matches!(result, Err(FormError::NotAForm(tag)) if tag == "div"));
        assert!(div.hidden_inputs().is_empty());
    }

    #[test]
    fn test_sign_rejects_nameless_form() {
        let signer = signer();
        let mut form = HtmlForm::element("form");
        let result = signer.sign_form(&mut form, &request(), default_ttl(), DEFAULT_GROUP);
        assert!(matches!(result, Err(FormError::MissingName)));

        let mut empty = HtmlForm::new("");
        let result = signer.sign_form(&mut empty, &request(), default_ttl(), DEFAULT_GROUP);
        assert!(matches!(result, Err(FormError::MissingName)));
        assert!(empty.hidden_inputs().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let signer = signer();
        let fields = signed(&signer);
        assert!(signer.verify(&fields, DEFAULT_GROUP, &request()));
    }

    #[test]
    fn test_expiry_boundary() {
        let signer = signer();
        let fields = signed(&signer);
        let expires = NOW + DEFAULT_TTL_SECS;

        assert!(signer.check(&fields, DEFAULT_GROUP, &request().at(expires)).is_ok());
        let result = signer.check(&fields, DEFAULT_GROUP, &request().at(expires + 1));
        assert!(matches!(result, Err(FormError::Expired { .. })));
    }

    #[test]
    fn test_ip_binding() {
        let signer = signer();
        let fields = signed(&signer);
        let other = request().from_addr("10.0.0.6".parse().unwrap());

        let result = signer.check(&fields, DEFAULT_GROUP, &other);
        assert!(matches!(result, Err(FormError::IpMismatch)));
        assert!(!signer.verify(&fields, DEFAULT_GROUP, &other));
    }

    #[test]
    fn test_invalid_ip_text() {
        let signer = signer();
        let mut fields = signed(&signer);
        set(&mut fields, "ip", "not-an-ip");

        let result = signer.check(&fields, DEFAULT_GROUP, &request());
        assert!(matches!(result, Err(FormError::InvalidIp(_))));
    }

    #[test]
    fn test_tampered_name() {
        let signer = signer();
        let mut fields = signed(&signer);
        set(&mut fields, "name", "other");

        let result = signer.check(&fields, DEFAULT_GROUP, &request());
        assert!(matches!(result, Err(FormError::BadSignature)));
    }

    #[test]
    fn test_extended_expiry_is_caught_by_signature() {
        let signer = signer();
        let mut fields = signed(&signer);
        set(&mut fields, "expires", &(NOW + 999_999).to_string());

        let result = signer.check(&fields, DEFAULT_GROUP, &request());
        assert!(matches!(result, Err(FormError::BadSignature)));
    }

    #[test]
    fn test_reformatted_expiry_is_caught_by_signature() {
        let signer = signer();
        let expires = NOW + DEFAULT_TTL_SECS;

        for text in [
            format!("+{}", expires),
            format!(" {}", expires),
            format!("0{}", expires),
            format!("{}\n", expires),
        ] {
            let mut fields = signed(&signer);
            set(&mut fields, "expires", &text);

            let result = signer.check(&fields, DEFAULT_GROUP, &request());
            assert!(
                matches!(result, Err(FormError::BadSignature)),
                "{:?} was accepted",
                text
            );
        }
    }

    #[test]
    fn test_missing_signature() {
        let signer = signer();
        let mut fields = signed(&signer);
        group_mut(&mut fields).remove("signature");

        let result = signer.check(&fields, DEFAULT_GROUP, &request());
        assert!(matches!(result, Err(FormError::MissingField("signature"))));
        assert!(!signer.verify(&fields, DEFAULT_GROUP, &request()));
    }

    #[test]
    fn test_undecodable_signature_is_not_bad_signature() {
        let signer = signer();
        let mut fields = signed(&signer);
        set(&mut fields, "signature", "%%%");

        let result = signer.check(&fields, DEFAULT_GROUP, &request());
        assert!(matches!(result, Err(FormError::Signature(_))));
    }

    #[test]
    fn test_expired_before_ip_checked() {
        let signer = signer();
        let fields = signed(&signer);
        let late_and_foreign = request()
            .at(NOW + DEFAULT_TTL_SECS + 1)
            .from_addr("10.0.0.6".parse().unwrap());

        let result = signer.check(&fields, DEFAULT_GROUP, &late_and_foreign);
        assert!(matches!(result, Err(FormError::Expired { .. })));
    }

    #[test]
    fn test_other_key_rejects() {
        let fields = signed(&signer());
        let other = FormSigner::new(
            KeyPair::from_sources(
                testing::other_pair().public_key().export(),
                &testing::other_pair().private_key().export(None).unwrap(),
                None,
            )
            .unwrap(),
        );
        let result = other.check(&fields, DEFAULT_GROUP, &request());
        assert!(matches!(result, Err(FormError::BadSignature)));
    }

    #[test]
    fn test_custom_group_and_ttl() {
        let signer = signer();
        let mut form = HtmlForm::new("login");
        signer
            .sign_form(&mut form, &request(), Duration::minutes(5), "proof")
            .unwrap();
        let fields = form.submitted_fields().map("login").cloned().unwrap();

        assert!(signer.verify(&fields, "proof", &request().at(NOW + 300)));
        assert!(!signer.verify(&fields, "proof", &request().at(NOW + 301)));
        assert!(!signer.verify(&fields, DEFAULT_GROUP, &request()));
    }

    fn group_mut(fields: &mut FieldMap) -> &mut FieldMap {
        fields
            .map_mut(DEFAULT_GROUP)
            .expect("signed form has an attestation")
    }

    fn set(fields: &mut FieldMap, key: &str, value: &str) {
        group_mut(fields).insert(key, value);
    }
}
