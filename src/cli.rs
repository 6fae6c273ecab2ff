//! Command-line interface for optiview.
//!
//! `optiview` with no subcommand opens the interactive three-panel surface;
//! `optiview run` performs one headless pipeline run for scripting and tests.

mod args;
mod commands;

pub use args::{Cli, Commands};
pub use commands::run;
