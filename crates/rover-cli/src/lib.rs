//! Command-line front end for reading and configuring a Rover controller.

pub mod cli;
pub mod commands;
pub mod config;
pub mod report;

pub use cli::{parse_args, CliArgs, Mode, USAGE};
pub use commands::{run_apply_thresholds, run_status, run_thresholds};
pub use config::{BatteryConfig, RoverConfig};
