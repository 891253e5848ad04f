//! Command-line interface for the scaleplan benchmark planner.
//!
//! `emit` prints the plan of a built-in or file-based study, `dirs` the log
//! directories it needs, and `presets` the built-in studies.

mod commands;

pub use commands::{
    Cli, CliError, Command, CommandOutput, PlanCommand, PresetName, SeedPolicyArg, StudySource,
    render_output, run_cli,
};

#[cfg(test)]
mod tests;
