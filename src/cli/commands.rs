//! CLI command handlers.
//!
//! Each handler returns a `SimResult`; only `run_cli` turns errors into an
//! exit code.

use std::process::ExitCode;

use tracing::{debug, error, info};

use super::args::{Cli, Command, RunArgs};
use super::output::{demo_defaults, print_demo_list, print_report, RunReport};
use crate::config::SuiteConfig;
use crate::error::{SimError, SimResult};

/// Main CLI entry point.
///
/// Dispatches to the handler for the parsed subcommand.
#[must_use]
pub fn run_cli(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::List { json } => list_demos(json),
        Command::Run(args) => run_demo(&args).and_then(|report| emit(&report, args.json)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn list_demos(json: bool) -> SimResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&demo_defaults())?);
    } else {
        print_demo_list();
    }
    Ok(())
}

fn emit(report: &RunReport, json: bool) -> SimResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(report);
    }
    Ok(())
}

/// Resolve the suite configuration for a `run` invocation.
///
/// # Errors
///
/// Returns an error if the configuration file can not be loaded, the
/// overrides are out of range, or neither a file nor a demo was given.
pub fn resolve_config(args: &RunArgs) -> SimResult<SuiteConfig> {
    let mut config = match (&args.config, args.demo) {
        (Some(path), _) => {
            debug!(path = %path.display(), "loading configuration");
            SuiteConfig::load(path)?
        }
        (None, Some(kind)) => SuiteConfig::builder().demo_kind(kind).build(),
        (None, None) => return Err(SimError::config("either a config file or --demo is required")),
    };

    if let Some(duration) = args.duration {
        config.run.duration = duration;
    }
    if let Some(fps) = args.fps {
        config.run.frame_rate = fps;
    }
    if let Some(ratio) = args.pixels_per_meter {
        config.pixels_per_meter = ratio;
    }
    config.check()?;
    Ok(config)
}

/// Drive one demo headless until it stops or the time budget runs out.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the final state
/// can not be serialized.
pub fn run_demo(args: &RunArgs) -> SimResult<RunReport> {
    let config = resolve_config(args)?;
    let scale = config.pixel_scale()?;
    let mut sim = config.simulation();

    let _ = sim.start();
    let stop_reason = sim.drive(config.run.frame_interval(), config.run.duration);

    info!(
        demo = %sim.kind(),
        elapsed = sim.elapsed(),
        reason = ?stop_reason,
        "headless run complete"
    );

    Ok(RunReport {
        demo: sim.kind(),
        lifecycle: sim.lifecycle(),
        stop_reason,
        elapsed: sim.elapsed(),
        state: sim.state_json()?,
        metrics: sim.metrics(),
        pixels_per_meter: scale.pixels_per_meter(),
        bodies_px: sim.bodies().into_iter().map(|b| scale.scale_point(b)).collect(),
    })
}
