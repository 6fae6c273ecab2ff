//! CLI argument definitions and parsing structures

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::config::Overrides;

/// optiview - staging surface for an external code-optimizer engine
#[derive(Parser)]
#[command(name = "optiview")]
#[command(about = "Stage source code for an external optimizer and view its artifacts")]
#[command(long_about = r#"
optiview stages source text for an external transformation engine, runs the
engine as a bounded subprocess, and shows the intermediate representation and
the optimized output next to the original source.

EXAMPLES:
  # Open the interactive three-panel surface
  optiview

  # Open the surface with the source panel preloaded from a file
  optiview tui demo.src

  # One headless run, source from a file
  optiview run demo.src

  # One headless run, source from stdin, explicit engine and bound
  cat demo.src | optiview run --engine ./build/compiler --timeout-secs 30

CONFIGURATION:
  Precedence: CLI flags > OPTIVIEW_* environment > optiview.toml > defaults
  optiview.toml is discovered by searching upward from the working directory
  The engine defaults to compiler.exe (Windows) or ./compiler (elsewhere)
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Engine executable (name, relative, or absolute path)
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Workspace directory holding the exchange files
    #[arg(long, global = true)]
    pub workdir: Option<Utf8PathBuf>,

    /// Wall-clock bound for one engine invocation, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive three-panel surface (the default)
    Tui {
        /// Preload the source panel from this file
        file: Option<Utf8PathBuf>,
    },
    /// Run one transformation headlessly and print both artifacts
    Run {
        /// Source file; reads stdin when omitted
        file: Option<Utf8PathBuf>,
    },
}

impl Cli {
    /// The configuration overrides carried by the global flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            engine: self.engine.clone(),
            workdir: self.workdir.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}
