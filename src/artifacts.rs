//! Artifact recovery: best-effort reads of the engine's output files.
//!
//! Recovery runs only after the engine reported success. Each artifact is
//! read independently; an unreadable file is data (a placeholder in the
//! display), never a pipeline failure, and never blocks the other artifact.

use camino::Utf8Path;
use tracing::warn;

use crate::workspace::PipelineWorkspace;

/// One output artifact as recovered from disk.
///
/// `Unreadable` keeps the file name and reason so tests can distinguish
/// "engine did not produce it" from "engine produced garbage"; display
/// contexts collapse both into the placeholder text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRead {
    Ok(String),
    Unreadable { file: String, reason: String },
}

impl ArtifactRead {
    /// The text to show in a panel: the content, or the placeholder.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Ok(text) => text.clone(),
            Self::Unreadable { file, .. } => format!("[Could not read {file}]"),
        }
    }

    #[must_use]
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    fn from_file(path: &Utf8Path, file: &str) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Self::Unreadable {
                    file: file.to_string(),
                    reason: e.to_string(),
                };
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => Self::Ok(text),
            Err(e) => Self::Unreadable {
                file: file.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

/// Both artifacts of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredArtifacts {
    pub intermediate: ArtifactRead,
    pub optimized: ArtifactRead,
}

/// Read both output artifacts from the workspace.
pub fn recover(workspace: &PipelineWorkspace) -> RecoveredArtifacts {
    let intermediate = ArtifactRead::from_file(&workspace.tac_path(), crate::workspace::TAC_FILE);
    let optimized =
        ArtifactRead::from_file(&workspace.optimized_path(), crate::workspace::OPTIMIZED_FILE);

    for artifact in [&intermediate, &optimized] {
        if let ArtifactRead::Unreadable { file, reason } = artifact {
            warn!(file = %file, reason = %reason, "artifact unreadable, using placeholder");
        }
    }

    RecoveredArtifacts {
        intermediate,
        optimized,
    }
}
