//! CLI argument parsing.
//!
//! Defines the command-line contract with clap derive macros. Parsing is
//! kept apart from execution so it can be tested with `try_parse_from`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::demos::DemoKind;

/// Headless runner for the physics demo suite.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "physdemo",
    author,
    version,
    about = "Educational physics demos on one simulation loop",
    long_about = "Runs the demo suite headless: synthetic animation frames drive \
                  the simulation loop until the run stops or the time budget ends."
)]
pub struct Cli {
    /// Enable verbose logging (-v debug, -vv trace)
    ///
    /// `RUST_LOG` takes precedence when set
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the demos and their default parameters
    List {
        /// Print defaults as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one demo to completion
    Run(RunArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Path to a YAML suite configuration
    #[arg(required_unless_present = "demo", conflicts_with = "demo")]
    pub config: Option<PathBuf>,

    /// Run a demo with default parameters instead of a config file
    #[arg(long, short = 'd', value_parser = parse_demo_kind)]
    pub demo: Option<DemoKind>,

    /// Host-time budget in seconds (overrides the config)
    #[arg(long)]
    pub duration: Option<f64>,

    /// Synthetic frames per second (overrides the config)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Display scale for the reported body positions (overrides the config)
    #[arg(long)]
    pub pixels_per_meter: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_demo_kind(s: &str) -> Result<DemoKind, String> {
    s.parse::<DemoKind>().map_err(|e| e.to_string())
}
