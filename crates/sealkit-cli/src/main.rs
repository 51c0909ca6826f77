//! Sealkit CLI - Command-line front end for sealkit-core
//!
//! Key generation, envelopes, signatures and signed forms.

mod cli;
mod commands;
mod config;
mod helpers;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_completions, handle_decrypt, handle_encrypt, handle_fingerprint, handle_form_sign,
    handle_form_verify, handle_hash, handle_keygen, handle_sign, handle_verify,
};
use crate::config::load_config;

fn init_tracing(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SEALKIT_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if let Commands::Completions { shell } = &cli.command {
        return handle_completions(*shell);
    }

    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Keygen(args) => handle_keygen(&cli, &config, args),
        Commands::Fingerprint { key } => handle_fingerprint(key),
        Commands::Encrypt(args) => handle_encrypt(&config, args),
        Commands::Decrypt { file } => handle_decrypt(file.as_deref()),
        Commands::Sign(args) => handle_sign(&config, args),
        Commands::Verify(args) => handle_verify(&cli, &config, args),
        Commands::Hash(args) => handle_hash(&cli, args),
        Commands::FormSign(args) => handle_form_sign(&config, args),
        Commands::FormVerify(args) => handle_form_verify(&config, args),
        Commands::Completions { shell } => handle_completions(*shell),
    }
}
