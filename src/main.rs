//! physdemo CLI - headless runner for the physics demo suite.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use physdemo::cli::{run_cli, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run_cli(cli)
}

/// Log to stderr; `RUST_LOG` wins over the `-v` count.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "physdemo=debug",
        _ => "physdemo=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
