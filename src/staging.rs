//! Request staging: validate the source text and publish it to the engine.
//!
//! Staging is the only writer of `input_code.txt`. The engine runs strictly
//! after staging completes, so a single atomic whole-file write is all the
//! coordination the protocol needs.

use tracing::debug;

use crate::atomic_write::write_file_atomic;
use crate::error::PipelineError;
use crate::workspace::PipelineWorkspace;

/// Stage `source` into the workspace input file.
///
/// Rejects whitespace-only input with [`PipelineError::EmptyInput`] before
/// touching the filesystem. Otherwise writes the trimmed content (the policy
/// the front end has always had: surrounding whitespace is not part of the
/// request) and clears output artifacts left over from a previous run.
pub fn stage_source(workspace: &PipelineWorkspace, source: &str) -> Result<(), PipelineError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    workspace.ensure_root().map_err(|e| PipelineError::Staging {
        path: workspace.root().to_owned(),
        source: e,
    })?;

    workspace
        .clear_stale_artifacts()
        .map_err(|e| PipelineError::Staging {
            path: workspace.root().to_owned(),
            source: e,
        })?;

    let input_path = workspace.input_path();
    write_file_atomic(&input_path, trimmed).map_err(|e| PipelineError::Staging {
        path: input_path.clone(),
        source: e,
    })?;

    debug!(path = %input_path, bytes = trimmed.len(), "input staged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn temp_workspace() -> (TempDir, PipelineWorkspace) {
        let td = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
        (td, PipelineWorkspace::new(root))
    }

    #[test]
    fn test_empty_input_is_rejected_without_io() {
        let (_td, ws) = temp_workspace();

        for source in ["", "   ", "\n\t  \n"] {
            let err = stage_source(&ws, source).unwrap_err();
            assert_eq!(err.kind(), FailureKind::EmptyInput);
        }
        assert!(!ws.input_path().as_std_path().exists());
    }

    #[test]
    fn test_staged_content_equals_trimmed_source() {
        let (_td, ws) = temp_workspace();

        stage_source(&ws, "\n  a = b + c;\nd = a * 2;  \n").unwrap();

        let staged = std::fs::read_to_string(ws.input_path()).unwrap();
        assert_eq!(staged, "a = b + c;\nd = a * 2;");
    }

    #[test]
    fn test_staging_overwrites_previous_request() {
        let (_td, ws) = temp_workspace();

        stage_source(&ws, "first run").unwrap();
        stage_source(&ws, "second run").unwrap();

        let staged = std::fs::read_to_string(ws.input_path()).unwrap();
        assert_eq!(staged, "second run");
    }

    #[test]
    fn test_staging_clears_previous_artifacts() {
        let (_td, ws) = temp_workspace();
        std::fs::write(ws.tac_path(), "stale tac").unwrap();
        std::fs::write(ws.optimized_path(), "stale opt").unwrap();

        stage_source(&ws, "fresh source").unwrap();

        assert!(!ws.tac_path().as_std_path().exists());
        assert!(!ws.optimized_path().as_std_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_workspace_is_a_staging_error() {
        use std::os::unix::fs::PermissionsExt;

        let (td, ws) = temp_workspace();
        std::fs::set_permissions(td.path(), std::fs::Permissions::from_mode(0o555)).unwrap();

        let err = stage_source(&ws, "source").unwrap_err();
        assert_eq!(err.kind(), FailureKind::StagingIo);

        // Restore so TempDir cleanup can delete the directory.
        std::fs::set_permissions(td.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
