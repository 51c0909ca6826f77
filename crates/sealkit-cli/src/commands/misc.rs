use std::io::Write;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;

pub fn handle_completions(shell: Shell) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    write_completions(shell, &mut stdout.lock())
}

/// Completion script for `shell`, named after the binary's command.
fn write_completions(shell: Shell, out: &mut impl Write) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, out);
    out.flush()?;
    Ok(())
}
