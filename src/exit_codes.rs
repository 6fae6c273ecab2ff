//! Exit code constants and error mapping for optiview.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `EMPTY_INPUT` | No source provided (rejected before any I/O) |
//! | 4 | `STAGING_IO` | Could not write the staged input file |
//! | 5 | `LAUNCH_FAILURE` | Engine executable missing or unlaunchable |
//! | 10 | `ENGINE_TIMEOUT` | Engine exceeded the wall-clock bound |
//! | 70 | `ENGINE_FAILURE` | Engine exited non-zero |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants for common exit codes, or [`as_i32()`](Self::as_i32)
/// to get the numeric value for `std::process::exit()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Empty input - no source text provided, rejected before staging
    pub const EMPTY_INPUT: ExitCode = ExitCode(3);

    /// Staging I/O error - the input file could not be written
    pub const STAGING_IO: ExitCode = ExitCode(4);

    /// Launch failure - the engine executable could not be started
    pub const LAUNCH_FAILURE: ExitCode = ExitCode(5);

    /// Engine timeout - the invocation exceeded the configured bound
    pub const ENGINE_TIMEOUT: ExitCode = ExitCode(10);

    /// Engine failure - the engine exited with a non-zero status
    pub const ENGINE_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
