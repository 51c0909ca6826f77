use std::path::Path;

use sealkit_core::PublicKey;

use crate::cli::{Cli, SignArgs, VerifyArgs};
use crate::commands::keys::load_private_key;
use crate::config::SealkitConfig;
use crate::helpers::read_input;

pub fn handle_sign(config: &SealkitConfig, args: &SignArgs) -> anyhow::Result<()> {
    let algo = config.digest(args.algo.as_deref())?;
    let key = load_private_key(Path::new(&args.private))?;
    let data = read_input(args.file.as_deref())?;
    println!("{}", key.sign_text(&data, algo)?);
    Ok(())
}

pub fn handle_verify(cli: &Cli, config: &SealkitConfig, args: &VerifyArgs) -> anyhow::Result<()> {
    let algo = config.digest(args.algo.as_deref())?;
    let key = PublicKey::import_from_file(&args.public)?;
    let data = read_input(args.file.as_deref())?;

    if key.verify_text(&data, &args.signature, algo)? {
        println!("valid");
        Ok(())
    } else {
        println!("invalid");
        if !cli.quiet {
            eprintln!("Signature does not match {} with {}", key, algo);
        }
        Err(anyhow::anyhow!("Signature verification failed"))
    }
}
