use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vast_cli::{Cli, Config, UreqTransport};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let config = Config::from_args(&cli.global)?;
    let transport = UreqTransport::new(config.timeout);
    vast_cli::run(&config, cli.command, &transport, io::stdout().lock())?;
    Ok(())
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "vast_cli=warn",
        1 => "vast_cli=info",
        _ => "vast_cli=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}
