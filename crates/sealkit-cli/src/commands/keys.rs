use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use sealkit_core::{KeyPair, PrivateKey, PublicKey};

use crate::cli::{Cli, KeygenArgs};
use crate::config::SealkitConfig;
use crate::helpers::{prompt_new_password, prompt_password};

pub const PUBLIC_KEY_FILE: &str = "public.pem";
pub const PRIVATE_KEY_FILE: &str = "private.pem";

pub fn handle_keygen(cli: &Cli, config: &SealkitConfig, args: &KeygenArgs) -> anyhow::Result<()> {
    let out_dir = PathBuf::from(&args.out_dir);
    let public_path = out_dir.join(PUBLIC_KEY_FILE);
    let private_path = out_dir.join(PRIVATE_KEY_FILE);
    if !args.force {
        for path in [&public_path, &private_path] {
            if path.exists() {
                return Err(anyhow::anyhow!(
                    "{} already exists.\nHint: Pass --force to replace it.",
                    path.display()
                ));
            }
        }
    }

    let params = config.key_params(args.bits, args.key_cipher.as_deref())?;
    let password = if args.encrypt {
        Some(prompt_new_password("Private key password")?)
    } else {
        None
    };
    let password = password.as_ref().map(|value| value.expose_secret());

    std::fs::create_dir_all(&out_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create directory {}: {}", out_dir.display(), e)
    })?;

    if !cli.quiet {
        eprintln!("Generating {}-bit RSA key pair...", params.bits);
    }
    let pair = KeyPair::generate(password, &params)?;
    pair.export_to_files(&public_path, &private_path, password)?;

    if !cli.quiet {
        println!("Public key: {}", public_path.display());
        println!(
            "Private key: {}{}",
            private_path.display(),
            if password.is_some() { " (encrypted)" } else { "" }
        );
        println!("Fingerprint: {}", pair.fingerprint());
    } else {
        println!("{}", pair.fingerprint());
    }
    Ok(())
}

pub fn handle_fingerprint(key: &str) -> anyhow::Result<()> {
    let public = load_any_public_key(Path::new(key))?;
    println!("{}", public.fingerprint());
    Ok(())
}

/// Load a private key file, prompting for its password when it is locked.
pub fn load_private_key(path: &Path) -> anyhow::Result<PrivateKey> {
    let pem = read_key_file(path)?;
    if pem.contains("ENCRYPTED PRIVATE KEY") {
        let password = prompt_password("Private key password")?;
        return Ok(PrivateKey::import(&pem, Some(password.expose_secret()))?);
    }
    Ok(PrivateKey::import(&pem, None)?)
}

/// Public key of either kind of key file.
fn load_any_public_key(path: &Path) -> anyhow::Result<PublicKey> {
    let pem = read_key_file(path)?;
    if pem.contains("PRIVATE KEY-----") {
        return Ok(load_private_key(path)?.public_key()?);
    }
    Ok(PublicKey::import(&pem)?)
}

fn read_key_file(path: &Path) -> anyhow::Result<Zeroizing<String>> {
    std::fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read key {}: {}", path.display(), e))
}
