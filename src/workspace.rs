//! The pipeline workspace: the fixed-name file protocol shared with the engine.
//!
//! All data exchanged with the engine flows through three files with fixed
//! names relative to a workspace root. The root is injectable so tests can
//! point the whole pipeline at a temporary directory without touching the
//! on-disk protocol.

use camino::{Utf8Path, Utf8PathBuf};

/// File the front end stages the source text into; read by the engine.
pub const INPUT_FILE: &str = "input_code.txt";

/// Intermediate-representation file produced by the engine.
pub const TAC_FILE: &str = "tac.txt";

/// Optimized-output file produced by the engine.
pub const OPTIMIZED_FILE: &str = "optimized_output.txt";

/// Value object holding the workspace root and deriving the three fixed
/// exchange paths from it.
#[derive(Debug, Clone)]
pub struct PipelineWorkspace {
    root: Utf8PathBuf,
}

impl PipelineWorkspace {
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace rooted at the process working directory.
    #[must_use]
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn input_path(&self) -> Utf8PathBuf {
        self.root.join(INPUT_FILE)
    }

    #[must_use]
    pub fn tac_path(&self) -> Utf8PathBuf {
        self.root.join(TAC_FILE)
    }

    #[must_use]
    pub fn optimized_path(&self) -> Utf8PathBuf {
        self.root.join(OPTIMIZED_FILE)
    }

    /// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
    pub fn ensure_root(&self) -> std::io::Result<()> {
        match std::fs::create_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove output artifacts left behind by a previous run.
    ///
    /// Called at staging time so a run that reads the output files only ever
    /// sees what its own engine invocation produced. A missing file is not an
    /// error; anything else (e.g. a permission problem) is, because it would
    /// let stale artifacts masquerade as fresh ones.
    pub fn clear_stale_artifacts(&self) -> std::io::Result<()> {
        for path in [self.tac_path(), self.optimized_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_workspace() -> (TempDir, PipelineWorkspace) {
        let td = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
        let ws = PipelineWorkspace::new(root);
        (td, ws)
    }

    #[test]
    fn test_fixed_paths_derive_from_root() {
        let ws = PipelineWorkspace::new("/work");
        assert_eq!(ws.input_path(), Utf8PathBuf::from("/work/input_code.txt"));
        assert_eq!(ws.tac_path(), Utf8PathBuf::from("/work/tac.txt"));
        assert_eq!(
            ws.optimized_path(),
            Utf8PathBuf::from("/work/optimized_output.txt")
        );
    }

    #[test]
    fn test_ensure_root_is_idempotent() {
        let (_td, ws) = temp_workspace();
        ws.ensure_root().unwrap();
        ws.ensure_root().unwrap();
        assert!(ws.root().as_std_path().is_dir());
    }

    #[test]
    fn test_clear_stale_artifacts_removes_outputs_only() {
        let (_td, ws) = temp_workspace();
        std::fs::write(ws.input_path(), "source").unwrap();
        std::fs::write(ws.tac_path(), "old tac").unwrap();
        std::fs::write(ws.optimized_path(), "old opt").unwrap();

        ws.clear_stale_artifacts().unwrap();

        assert!(ws.input_path().as_std_path().exists());
        assert!(!ws.tac_path().as_std_path().exists());
        assert!(!ws.optimized_path().as_std_path().exists());
    }

    #[test]
    fn test_clear_stale_artifacts_tolerates_missing_files() {
        let (_td, ws) = temp_workspace();
        ws.clear_stale_artifacts().unwrap();
    }
}
