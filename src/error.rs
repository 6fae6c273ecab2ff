//! Error taxonomy for the optiview pipeline.
//!
//! Every failure that aborts a run is one of the [`PipelineError`] variants.
//! Unreadable output artifacts are NOT errors; they degrade to placeholder
//! text inside [`crate::artifacts::ArtifactRead`] and never abort a run.

use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// A failure that aborts the current run.
///
/// Each variant maps to exactly one [`FailureKind`] and one [`ExitCode`].
/// No variant is fatal to the process; after reporting, the pipeline is
/// ready for the next independent run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The source text was empty (or whitespace only). Rejected before any
    /// file or process I/O happens.
    #[error("no source provided: enter some code to optimize")]
    EmptyInput,

    /// The staged input file could not be written.
    #[error("failed to stage input at {path}: {source}")]
    Staging {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine executable could not be started at all.
    #[error("failed to run optimizer: {reason}")]
    Launch { reason: String },

    /// The engine did not exit within the wall-clock bound. The child
    /// process has been terminated by the time this is returned.
    #[error("optimizer timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// The engine exited non-zero. Carries the captured stderr verbatim.
    #[error("optimizer failed (exit code {exit_code}):\n{stderr}")]
    Engine { exit_code: i32, stderr: String },
}

impl PipelineError {
    /// The failure category, for programmatic handling.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyInput => FailureKind::EmptyInput,
            Self::Staging { .. } => FailureKind::StagingIo,
            Self::Launch { .. } => FailureKind::Launch,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Engine { .. } => FailureKind::EngineFailure,
        }
    }

    /// Map this error to the documented CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::EmptyInput => ExitCode::EMPTY_INPUT,
            Self::Staging { .. } => ExitCode::STAGING_IO,
            Self::Launch { .. } => ExitCode::LAUNCH_FAILURE,
            Self::Timeout { .. } => ExitCode::ENGINE_TIMEOUT,
            Self::Engine { .. } => ExitCode::ENGINE_FAILURE,
        }
    }

    /// User-facing message with an actionable suggestion where one exists.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut out = self.to_string();
        for suggestion in self.suggestions() {
            out.push_str("\n  hint: ");
            out.push_str(&suggestion);
        }
        out
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyInput => vec!["type or load some source code first".to_string()],
            Self::Staging { path, .. } => vec![format!(
                "check that the directory containing {path} exists and is writable"
            )],
            Self::Launch { .. } => vec![
                "check that the engine executable exists and is executable".to_string(),
                "set the engine location with --engine, OPTIVIEW_ENGINE, or optiview.toml"
                    .to_string(),
            ],
            Self::Timeout { .. } => {
                vec!["raise the bound with --timeout-secs if the input is large".to_string()]
            }
            Self::Engine { .. } => Vec::new(),
        }
    }
}

/// Categories of run failures, mirroring the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptyInput,
    StagingIo,
    Launch,
    Timeout,
    EngineFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty-input"),
            Self::StagingIo => write!(f, "staging-io"),
            Self::Launch => write!(f, "launch-failure"),
            Self::Timeout => write!(f, "timeout"),
            Self::EngineFailure => write!(f, "engine-failure"),
        }
    }
}
