use std::io::Write;

use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use sealkit_core::envelope;
use sealkit_core::EnvelopeOptions;

use crate::cli::EncryptArgs;
use crate::config::SealkitConfig;
use crate::helpers::{prompt_password, read_input};

pub fn handle_encrypt(config: &SealkitConfig, args: &EncryptArgs) -> anyhow::Result<()> {
    let mut options = EnvelopeOptions::NONE;
    if args.raw {
        options = options | EnvelopeOptions::RAW_DATA;
    }
    if args.zero_padding {
        options = options | EnvelopeOptions::ZERO_PADDING;
    }
    let params = config
        .envelope_params(args.cipher.as_deref(), args.hash.as_deref())?
        .with_options(options);

    let data = read_input(args.file.as_deref())?;
    let password = prompt_password("Envelope password")?;
    let sealed = envelope::encrypt(&data, password.expose_secret(), &params)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&sealed)?;
    if !args.raw {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

pub fn handle_decrypt(file: Option<&str>) -> anyhow::Result<()> {
    let input = read_input(file)?;
    let password = prompt_password("Envelope password")?;
    let plaintext = Zeroizing::new(envelope::decrypt(
        envelope_bytes(&input),
        password.expose_secret(),
    )?);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

/// Text envelopes tolerate a trailing newline; raw ones are taken verbatim.
fn envelope_bytes(input: &[u8]) -> &[u8] {
    let raw = input
        .split(|&b| b == b':')
        .next()
        .and_then(|field| std::str::from_utf8(field).ok())
        .and_then(|text| text.trim().parse::<u32>().ok())
        .is_some_and(|bits| bits & EnvelopeOptions::RAW_DATA.bits() != 0);
    if raw {
        input
    } else {
        input.trim_ascii_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_envelope_is_trimmed() {
        assert_eq!(envelope_bytes(b"0:a:b:c:ZGF0YQ==\n"), b"0:a:b:c:ZGF0YQ==");
    }

    #[test]
    fn test_raw_envelope_is_verbatim() {
        assert_eq!(envelope_bytes(b"1:a:b:c:\x00\n"), b"1:a:b:c:\x00\n");
        assert_eq!(envelope_bytes(b"3:a:b:c:\n\n"), b"3:a:b:c:\n\n");
    }
}
