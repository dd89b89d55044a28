use anyhow::Result;
use clap::Parser;
use shelf::cli::Cli;
use shelf::commands;
use std::process;

fn main() -> Result<()> {
    // Parse CLI arguments; usage errors exit 1 like any other failure
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    // Initialize tracing; stdout is reserved for command output
    let default_filter = if cli.verbose { "shelf=debug" } else { "shelf=warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    commands::execute(cli)
}
