use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sealkit_core::form::DEFAULT_GROUP;
use sealkit_core::{EnvelopeParams, HashAlgorithm, KeyParams, PrivateKeyCipher, SymmetricCipher};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SealkitConfig {
    pub envelope: EnvelopeSection,
    pub keys: KeysSection,
    pub form: FormSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeSection {
    pub cipher: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysSection {
    pub bits: Option<usize>,
    pub digest: Option<String>,
    pub private_key_cipher: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSection {
    pub credentials: Option<String>,
    pub ttl: Option<String>,
    pub group: Option<String>,
}

impl SealkitConfig {
    /// Envelope parameters with CLI overrides applied over the config.
    pub fn envelope_params(
        &self,
        cipher: Option<&str>,
        hash: Option<&str>,
    ) -> anyhow::Result<EnvelopeParams> {
        let mut params = EnvelopeParams::default();
        if let Some(cipher) = cipher.or(self.envelope.cipher.as_deref()) {
            params = params.with_cipher(cipher.parse::<SymmetricCipher>()?);
        }
        if let Some(hash) = hash.or(self.envelope.hash.as_deref()) {
            params = params.with_hash(hash.parse::<HashAlgorithm>()?);
        }
        Ok(params)
    }

    pub fn key_params(
        &self,
        bits: Option<usize>,
        private_key_cipher: Option<&str>,
    ) -> anyhow::Result<KeyParams> {
        let mut params = KeyParams::default();
        if let Some(bits) = bits.or(self.keys.bits) {
            params.bits = bits;
        }
        if let Some(cipher) = private_key_cipher.or(self.keys.private_key_cipher.as_deref()) {
            params.private_key_cipher = cipher.parse::<PrivateKeyCipher>()?;
        }
        params.digest = self.digest(None)?;
        Ok(params)
    }

    /// Signing digest: the CLI flag, then `[keys] digest`, then the default.
    pub fn digest(&self, algo: Option<&str>) -> anyhow::Result<HashAlgorithm> {
        match algo.or(self.keys.digest.as_deref()) {
            Some(name) => Ok(name.parse::<HashAlgorithm>()?),
            None => Ok(HashAlgorithm::default()),
        }
    }

    pub fn credentials(&self, flag: Option<&str>) -> anyhow::Result<PathBuf> {
        flag.or(self.form.credentials.as_deref())
            .map(PathBuf::from)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No credentials file provided. Use --credentials or set [form] credentials in the config."
                )
            })
    }

    pub fn group(&self, flag: Option<&str>) -> String {
        flag.or(self.form.group.as_deref())
            .unwrap_or(DEFAULT_GROUP)
            .to_string()
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

/// Resolve and read the config. A missing file at the default location means
/// defaults; a missing file that was asked for explicitly is an error.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<SealkitConfig> {
    if let Some(path) = explicit.filter(|value| !value.trim().is_empty()) {
        return read_config(Path::new(path));
    }
    let path = default_config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(SealkitConfig::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> anyhow::Result<SealkitConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: SealkitConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sealkit"));
        }
    }
    Ok(home_dir()?.join(".config").join("sealkit"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
