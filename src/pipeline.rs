//! The orchestration pipeline: staging, invocation, artifact recovery.
//!
//! One run is Staging then Invocation then Recovery. Any failure before
//! recovery aborts the run with a [`PipelineError`]; recovery itself cannot
//! fail (unreadable artifacts degrade to placeholders). Runs are independent
//! and the pipeline holds no state between them.

use std::time::Duration;
use tracing::info;

use crate::artifacts::{self, ArtifactRead};
use crate::config::Config;
use crate::engine::EngineRunner;
use crate::error::PipelineError;
use crate::staging::stage_source;
use crate::workspace::PipelineWorkspace;

/// The full pipeline over one workspace and one engine.
#[derive(Debug, Clone)]
pub struct Pipeline {
    workspace: PipelineWorkspace,
    runner: EngineRunner,
}

/// Result of one successful run: both recovered artifacts plus the
/// invocation facts the surface displays in its status line.
#[derive(Debug)]
pub struct TransformOutcome {
    pub intermediate: ArtifactRead,
    pub optimized: ArtifactRead,
    pub exit_code: i32,
    pub duration: Duration,
}

impl Pipeline {
    #[must_use]
    pub fn new(workspace: PipelineWorkspace, runner: EngineRunner) -> Self {
        Self { workspace, runner }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PipelineWorkspace::new(config.workspace_root.clone()),
            EngineRunner::from_config(config),
        )
    }

    #[must_use]
    pub fn workspace(&self) -> &PipelineWorkspace {
        &self.workspace
    }

    /// Run one transformation: stage `source`, invoke the engine, recover
    /// both artifacts.
    ///
    /// On any error the workspace is left in whatever state the failed step
    /// produced; the next run restages from scratch, so nothing needs to be
    /// cleaned up here.
    pub async fn run(&self, source: &str) -> Result<TransformOutcome, PipelineError> {
        stage_source(&self.workspace, source)?;

        let output = self.runner.invoke(&self.workspace).await?;

        let recovered = artifacts::recover(&self.workspace);
        info!(
            exit_code = output.exit_code,
            duration_ms = output.duration.as_millis() as u64,
            intermediate_ok = recovered.intermediate.is_readable(),
            optimized_ok = recovered.optimized.is_readable(),
            "run complete"
        );

        Ok(TransformOutcome {
            intermediate: recovered.intermediate,
            optimized: recovered.optimized,
            exit_code: output.exit_code,
            duration: output.duration,
        })
    }
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

    #[cfg(unix)]
    fn write_script(ws: &PipelineWorkspace, body: &str) -> Utf8PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = ws.root().join("engine.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_empty_source_never_reaches_the_engine() {
        let (_td, ws) = temp_workspace();
        // Deliberately unlaunchable; an EmptyInput failure proves the engine
        // was never consulted.
        let runner = EngineRunner::new(ws.root().join("missing"), Duration::from_secs(1));
        let pipeline = Pipeline::new(ws.clone(), runner);

        let err = pipeline.run("   \n  ").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyInput);
        assert!(!ws.input_path().as_std_path().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_returns_engine_artifacts() {
        let (_td, ws) = temp_workspace();
        let script = write_script(
            &ws,
            "printf 't1 = a + b\\n' > tac.txt\nprintf 'result = t1\\n' > optimized_output.txt",
        );
        let pipeline = Pipeline::new(ws.clone(), EngineRunner::new(script, Duration::from_secs(5)));

        let outcome = pipeline.run("result = a + b;").await.unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.intermediate, ArtifactRead::Ok("t1 = a + b\n".to_string()));
        assert_eq!(outcome.optimized, ArtifactRead::Ok("result = t1\n".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_engine_yields_placeholders_not_errors() {
        let (_td, ws) = temp_workspace();
        let script = write_script(&ws, "exit 0");
        let pipeline = Pipeline::new(ws.clone(), EngineRunner::new(script, Duration::from_secs(5)));

        let outcome = pipeline.run("x = 1;").await.unwrap();

        assert_eq!(outcome.intermediate.display_text(), "[Could not read tac.txt]");
        assert_eq!(
            outcome.optimized.display_text(),
            "[Could not read optimized_output.txt]"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_sees_the_staged_source() {
        let (_td, ws) = temp_workspace();
        let script = write_script(&ws, "cp input_code.txt tac.txt");
        let pipeline = Pipeline::new(ws.clone(), EngineRunner::new(script, Duration::from_secs(5)));

        let outcome = pipeline.run("  a = b;  ").await.unwrap();

        assert_eq!(outcome.intermediate, ArtifactRead::Ok("a = b;".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sequential_runs_do_not_leak_artifacts() {
        let (_td, ws) = temp_workspace();
        // Writes tac.txt only when the input mentions "tac".
        let script = write_script(
            &ws,
            "if grep -q tac input_code.txt; then printf 'fresh tac\\n' > tac.txt; fi",
        );
        let pipeline = Pipeline::new(ws.clone(), EngineRunner::new(script, Duration::from_secs(5)));

        let first = pipeline.run("please write tac").await.unwrap();
        assert!(first.intermediate.is_readable());

        let second = pipeline.run("write nothing this time").await.unwrap();
        assert!(!second.intermediate.is_readable());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_engine_aborts_before_recovery() {
        let (_td, ws) = temp_workspace();
        // Produces an output file and then fails; the artifacts must not be
        // surfaced.
        let script = write_script(
            &ws,
            "printf 'partial\\n' > tac.txt\necho 'bad syntax' >&2\nexit 7",
        );
        let pipeline = Pipeline::new(ws.clone(), EngineRunner::new(script, Duration::from_secs(5)));

        let err = pipeline.run("x = 1;").await.unwrap_err();
        match err {
            PipelineError::Engine { exit_code, stderr } => {
                assert_eq!(exit_code, 7);
                assert!(stderr.contains("bad syntax"));
            }
            other => panic!("expected engine failure, got {other:?}"),
        }
    }
}
