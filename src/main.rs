use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use ewpsync::cli::Cli;
use ewpsync::config::SyncConfig;
use ewpsync::output::{self, Verbosity};
use ewpsync::{commands, exit_code};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        output::error(&format!("Error: {e:#}"));
        process::exit(exit_code(&e));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    init_logging(cli.verbose);
    output::set_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));

    let config = SyncConfig::from_cli(&cli)?;
    commands::sync::execute(&config)?;

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the flag-derived level
fn init_logging(verbose: bool) {
    let default = if verbose { "ewpsync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded; keep that one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
