//! CLI module for physdemo.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` takes the parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Cli, Command, RunArgs};
pub use commands::{resolve_config, run_cli, run_demo};
pub use output::{format_demo_list, format_report, RunReport};
