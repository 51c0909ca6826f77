//! Password prompts and command input.

use std::io::{self, IsTerminal, Read};

use dialoguer::Password;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use sealkit_core::password::validate_password;

const PASSWORD_ENV: &str = "SEALKIT_PASSWORD";

fn env_password() -> Option<SecretString> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Prompt for a password, or read it from SEALKIT_PASSWORD.
pub fn prompt_password(prompt: &str) -> anyhow::Result<SecretString> {
    if let Some(password) = env_password() {
        return Ok(password);
    }
    if !io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a new password with confirmation, or read it from
/// SEALKIT_PASSWORD. Either way it must pass the password policy.
pub fn prompt_new_password(prompt: &str) -> anyhow::Result<SecretString> {
    let password = match env_password() {
        Some(password) => password,
        None => Password::new()
            .with_prompt(prompt)
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map(SecretString::from)
            .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
    };
    validate_password(password.expose_secret())?;
    Ok(password)
}

/// Read a file, or stdin when no path is given.
pub fn read_input(file: Option<&str>) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    match file {
        Some(path) => std::fs::read(path)
            .map(Zeroizing::new)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e)),
        None => {
            let mut buffer = Zeroizing::new(Vec::new());
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
