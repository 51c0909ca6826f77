use std::path::Path;

use sealkit_core::digest::{self, HashAlgorithm};

use crate::cli::{Cli, HashArgs};

pub fn handle_hash(cli: &Cli, args: &HashArgs) -> anyhow::Result<()> {
    let path = Path::new(&args.file);

    if let Some(expected) = args.check.as_deref() {
        if digest::matches_file(path, expected)? {
            if !cli.quiet {
                println!("{}: OK", args.file);
            }
            return Ok(());
        }
        println!("{}: FAILED", args.file);
        return Err(anyhow::anyhow!("Digest mismatch for {}", args.file));
    }

    let algo = match args.algo.as_deref() {
        Some(name) => name.parse::<HashAlgorithm>()?,
        None => HashAlgorithm::default(),
    };
    println!("{}  {}", digest::hash_file(path, algo)?, args.file);
    Ok(())
}
