//! optiview - three-panel staging surface for an external code optimizer
//!
//! optiview stages user-supplied source text for an external transformation
//! engine, runs the engine as a bounded subprocess, and recovers the two
//! artifacts it produces (an intermediate representation and an optimized
//! form) for display next to the original source.
//!
//! The engine is an opaque collaborator: optiview talks to it only through
//! three files in the pipeline workspace (`input_code.txt` in, `tac.txt` and
//! `optimized_output.txt` out) and through its process exit status.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Open the interactive three-panel surface
//! optiview
//!
//! # One headless run: stage FILE, invoke the engine, print both artifacts
//! optiview run demo.src
//!
//! # Pipe source on stdin and point at a specific engine build
//! cat demo.src | optiview run --engine ./target/compiler
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use optiview::{EngineRunner, Pipeline, PipelineWorkspace};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), optiview::PipelineError> {
//! let workspace = PipelineWorkspace::new("/tmp/optiview-demo");
//! let runner = EngineRunner::new("./compiler", Duration::from_secs(10));
//! let outcome = Pipeline::new(workspace, runner).run("a = b + c;").await?;
//! println!("{}", outcome.intermediate.display_text());
//! # Ok(())
//! # }
//! ```
//!
//! # Exit Codes
//!
//! CLI failures map to a fixed exit code table; see [`ExitCode`].

pub mod artifacts;
pub mod atomic_write;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod ring_buffer;
pub mod staging;
pub mod tui;
pub mod workspace;

pub use artifacts::{ArtifactRead, RecoveredArtifacts};
pub use config::Config;
pub use engine::{EngineOutput, EngineRunner};
pub use error::{FailureKind, PipelineError};
pub use exit_codes::ExitCode;
pub use pipeline::{Pipeline, TransformOutcome};
pub use workspace::PipelineWorkspace;
