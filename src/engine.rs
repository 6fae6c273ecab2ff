//! Engine invocation: bounded subprocess execution of the external optimizer.
//!
//! The engine is invoked as `<engine> input_code.txt` with the workspace
//! root as its working directory. Stdout and stderr are captured into
//! bounded buffers, a wall-clock timeout is enforced, and on expiry the
//! child (and anything it spawned) is terminated rather than left running.

mod command_spec;
mod platform;

pub use command_spec::CommandSpec;

use camino::{Utf8Path, Utf8PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::PipelineError;
use crate::ring_buffer::CaptureBuffer;
use crate::workspace::{INPUT_FILE, PipelineWorkspace};

/// Maximum bytes retained from the engine's stdout (2 MiB).
const STDOUT_CAP_BYTES: usize = 2 * 1024 * 1024;

/// Maximum bytes retained from the engine's stderr (256 KiB).
const STDERR_CAP_BYTES: usize = 256 * 1024;

/// Runner for one engine program with a fixed invocation bound.
#[derive(Debug, Clone)]
pub struct EngineRunner {
    program: Utf8PathBuf,
    timeout: Duration,
}

/// Captured result of a successful (exit 0) engine invocation.
#[derive(Debug)]
pub struct EngineOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl EngineRunner {
    #[must_use]
    pub fn new(program: impl Into<Utf8PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.engine_program.clone(), config.timeout)
    }

    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the configured program to something spawnable.
    ///
    /// A bare name is looked up in the workspace root first (the engine
    /// normally ships next to the front end), then on PATH. A path is taken
    /// relative to the workspace root and made absolute where possible so
    /// the child's working directory cannot change what gets executed.
    fn resolve_program(&self, workspace: &PipelineWorkspace) -> Result<Utf8PathBuf, PipelineError> {
        let raw = self.program.as_str();

        if !raw.contains('/') && !raw.contains('\\') {
            let local = workspace.root().join(raw);
            if local.as_std_path().is_file() {
                return Ok(absolutize(&local));
            }
            let found = which::which(raw).map_err(|e| PipelineError::Launch {
                reason: format!("{raw}: {e}"),
            })?;
            return Ok(Utf8PathBuf::from_path_buf(found)
                .unwrap_or_else(|_| Utf8PathBuf::from(raw)));
        }

        let joined = if self.program.is_absolute() {
            self.program.clone()
        } else {
            workspace.root().join(raw)
        };
        Ok(absolutize(&joined))
    }

    /// Run the engine against the staged input, bounded by the timeout.
    ///
    /// Returns [`EngineOutput`] only for a zero exit status. Every other
    /// outcome (spawn failure, pipe I/O failure, timeout, non-zero exit)
    /// is a [`PipelineError`] and means no artifacts may be read.
    pub async fn invoke(
        &self,
        workspace: &PipelineWorkspace,
    ) -> Result<EngineOutput, PipelineError> {
        let program = self.resolve_program(workspace)?;
        debug!(program = %program, timeout_secs = self.timeout.as_secs(), "invoking engine");

        let spec = CommandSpec::new(program.as_str())
            .arg(INPUT_FILE)
            .cwd(workspace.root().as_std_path());
        let mut cmd = spec.to_tokio_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        platform::isolate_process_group(&mut cmd);

        #[cfg(windows)]
        let job = platform::create_job_object().map_err(|e| PipelineError::Launch {
            reason: format!("failed to create job object: {e}"),
        })?;

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| PipelineError::Launch {
            reason: format!("{program}: {e}"),
        })?;

        #[cfg(windows)]
        platform::assign_to_job(&job, &child).map_err(|e| PipelineError::Launch {
            reason: format!("failed to assign child to job object: {e}"),
        })?;

        let mut stdout_pipe = child.stdout.take().ok_or_else(|| PipelineError::Launch {
            reason: "failed to capture stdout".to_string(),
        })?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| PipelineError::Launch {
            reason: "failed to capture stderr".to_string(),
        })?;

        let mut stdout_buf = CaptureBuffer::new(STDOUT_CAP_BYTES);
        let mut stderr_buf = CaptureBuffer::new(STDERR_CAP_BYTES);

        let read_future = read_pipes_until_exit(
            &mut child,
            &mut stdout_pipe,
            &mut stderr_pipe,
            &mut stdout_buf,
            &mut stderr_buf,
        );

        let status = match timeout(self.timeout, read_future).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(PipelineError::Launch {
                    reason: format!("engine I/O failed: {e}"),
                });
            }
            Err(_) => {
                if let Some(pid) = child.id() {
                    platform::terminate(pid).await;
                }
                drain_pipes(
                    &mut stdout_pipe,
                    &mut stderr_pipe,
                    &mut stdout_buf,
                    &mut stderr_buf,
                )
                .await;
                // Reap the terminated child; bounded in case termination is
                // a no-op on an exotic platform.
                let _ = timeout(Duration::from_secs(2), child.wait()).await;

                warn!(timeout_secs = self.timeout.as_secs(), "engine timed out, child terminated");
                return Err(PipelineError::Timeout {
                    timeout_seconds: self.timeout.as_secs(),
                });
            }
        };

        let duration = start.elapsed();
        let stdout = stdout_buf.into_string();
        let stderr = stderr_buf.into_string();
        let exit_code = status.code().unwrap_or(-1);

        if !status.success() {
            return Err(PipelineError::Engine { exit_code, stderr });
        }

        debug!(exit_code, duration_ms = duration.as_millis() as u64, "engine exited cleanly");
        Ok(EngineOutput {
            exit_code,
            stdout,
            stderr,
            duration,
        })
    }
}

fn absolutize(path: &Utf8Path) -> Utf8PathBuf {
    #[cfg(windows)]
    {
        if let Ok(p) = dunce::canonicalize(path.as_std_path())
            && let Ok(utf8) = Utf8PathBuf::from_path_buf(p)
        {
            return utf8;
        }
        path.to_owned()
    }
    #[cfg(not(windows))]
    {
        path.canonicalize_utf8().unwrap_or_else(|_| path.to_owned())
    }
}

/// Read both pipes to EOF, then wait for the exit status.
async fn read_pipes_until_exit(
    child: &mut tokio::process::Child,
    stdout_pipe: &mut tokio::process::ChildStdout,
    stderr_pipe: &mut tokio::process::ChildStderr,
    stdout_buf: &mut CaptureBuffer,
    stderr_buf: &mut CaptureBuffer,
) -> std::io::Result<ExitStatus> {
    let mut obuf = vec![0u8; 8192];
    let mut ebuf = vec![0u8; 8192];
    let mut out_done = false;
    let mut err_done = false;

    while !(out_done && err_done) {
        tokio::select! {
            read = stdout_pipe.read(&mut obuf), if !out_done => match read? {
                0 => out_done = true,
                n => stdout_buf.write(&obuf[..n]),
            },
            read = stderr_pipe.read(&mut ebuf), if !err_done => match read? {
                0 => err_done = true,
                n => stderr_buf.write(&ebuf[..n]),
            },
        }
    }

    child.wait().await
}

/// Best-effort drain of whatever the child flushed before termination.
async fn drain_pipes(
    stdout_pipe: &mut tokio::process::ChildStdout,
    stderr_pipe: &mut tokio::process::ChildStderr,
    stdout_buf: &mut CaptureBuffer,
    stderr_buf: &mut CaptureBuffer,
) {
    let mut obuf = vec![0u8; 8192];
    let mut ebuf = vec![0u8; 8192];

    let _ = timeout(Duration::from_millis(100), async {
        loop {
            tokio::select! {
                read = stdout_pipe.read(&mut obuf) => match read {
                    Ok(0) | Err(_) => break,
                    Ok(n) => stdout_buf.write(&obuf[..n]),
                },
                read = stderr_pipe.read(&mut ebuf) => match read {
                    Ok(0) | Err(_) => {}
                    Ok(n) => stderr_buf.write(&ebuf[..n]),
                },
            }
        }
    })
    .await;
}
