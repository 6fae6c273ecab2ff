//! Platform-specific child containment and termination.
//!
//! On Unix the engine is placed in its own process group so a timeout can
//! take down the whole tree with `killpg`. On Windows the child is assigned
//! to a Job Object configured to kill its processes when the job closes.

#[cfg(unix)]
use std::time::Duration;

/// Put the child in a fresh process group before exec.
#[cfg(unix)]
pub fn isolate_process_group(cmd: &mut tokio::process::Command) {
    unsafe {
        cmd.pre_exec(|| {
            libc::setpgid(0, 0);
            Ok(())
        });
    }
}

/// Terminate the child's process group: TERM, a short grace window, KILL.
#[cfg(unix)]
pub async fn terminate(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(pid as i32);
    let _ = killpg(pgid, Signal::SIGTERM);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let _ = killpg(pgid, Signal::SIGKILL);
}

/// RAII wrapper for a Windows Job Object handle.
///
/// Closing the handle terminates every process in the job because the job is
/// created with `JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE`.
#[cfg(windows)]
pub struct JobObjectHandle {
    handle: windows::Win32::Foundation::HANDLE,
}

// SAFETY: Windows HANDLEs are opaque kernel object references usable from any
// thread.
#[cfg(windows)]
unsafe impl Send for JobObjectHandle {}

#[cfg(windows)]
impl Drop for JobObjectHandle {
    fn drop(&mut self) {
        use windows::Win32::Foundation::CloseHandle;
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// Create a Job Object that kills its processes when the handle closes.
#[cfg(windows)]
pub fn create_job_object() -> std::io::Result<JobObjectHandle> {
    use windows::Win32::System::JobObjects::{
        CreateJobObjectW, JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
        JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JobObjectExtendedLimitInformation,
        SetInformationJobObject,
    };

    unsafe {
        let job = CreateJobObjectW(None, None).map_err(std::io::Error::other)?;

        let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = std::mem::zeroed();
        info.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE;

        SetInformationJobObject(
            job,
            JobObjectExtendedLimitInformation,
            (&raw const info).cast(),
            std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
        )
        .map_err(std::io::Error::other)?;

        Ok(JobObjectHandle { handle: job })
    }
}

/// Assign a spawned child to the Job Object.
#[cfg(windows)]
pub fn assign_to_job(
    job: &JobObjectHandle,
    child: &tokio::process::Child,
) -> std::io::Result<()> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::JobObjects::AssignProcessToJobObject;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_ALL_ACCESS};

    if let Some(pid) = child.id() {
        unsafe {
            let process = OpenProcess(PROCESS_ALL_ACCESS, false, pid).map_err(std::io::Error::other)?;

            let assigned = AssignProcessToJobObject(job.handle, process);
            let _ = CloseHandle(process);
            assigned.map_err(std::io::Error::other)?;
        }
    }

    Ok(())
}

/// Terminate the child process (job-close handles any grandchildren).
#[cfg(windows)]
pub async fn terminate(pid: u32) {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_TERMINATE, TerminateProcess};

    unsafe {
        if let Ok(process) = OpenProcess(PROCESS_TERMINATE, false, pid) {
            let _ = TerminateProcess(process, 1);
            let _ = CloseHandle(process);
        }
    }

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
}

#[cfg(not(any(unix, windows)))]
pub async fn terminate(_pid: u32) {}
