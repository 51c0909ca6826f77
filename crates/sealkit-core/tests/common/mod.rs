#![allow(dead_code)]

use std::path::Path;
use std::sync::OnceLock;

use sealkit_core::{KeyPair, KeyParams};

/// Small keys keep generation fast; nothing here depends on key strength.
pub const TEST_KEY_BITS: usize = 1024;

pub const KEY_PASSWORD: &str = "integration-password-123";

pub fn pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| {
        KeyPair::generate(None, &KeyParams::with_bits(TEST_KEY_BITS))
            .expect("key generation should succeed")
    })
}

pub fn other_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| {
        KeyPair::generate(None, &KeyParams::with_bits(TEST_KEY_BITS))
            .expect("key generation should succeed")
    })
}

/// Write `public.pem`, a password-locked `private.pem` and a `form.json`
/// credentials file pointing at them into `dir`.
pub fn write_credentials(dir: &Path) {
    let pair = pair();
    pair.export_to_files(
        dir.join("public.pem"),
        dir.join("private.pem"),
        Some(KEY_PASSWORD),
    )
    .expect("key export should succeed");

    let json = serde_json::json!({
        "publicKey": "public.pem",
        "privateKey": "private.pem",
        "password": KEY_PASSWORD,
    });
    std::fs::write(dir.join("form.json"), json.to_string())
        .expect("credentials write should succeed");
}
