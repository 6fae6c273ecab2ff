//! Stub optimizer engine for development testing
//!
//! This binary mimics the external compiler's file protocol so optiview can
//! be exercised without a real engine build. It reads the staged input file
//! given as its single argument and writes `tac.txt` and
//! `optimized_output.txt` into its working directory, exactly like the real
//! collaborator.
//!
//! The real invocation contract passes only the input path, so the scenario
//! is selected out of band: `--scenario`, then `ENGINE_STUB_SCENARIO`, then
//! a `stub_control.toml` file in the working directory. The control file is
//! what concurrent tests use; it is scoped to one workspace and needs no
//! process-global state.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

const CONTROL_FILE: &str = "stub_control.toml";
const DEFAULT_TAC: &str = "t0 = a + b\nt1 = t0 * 2\nresult = t1\n";
const DEFAULT_OPTIMIZED: &str = "result = (a + b) * 2\n";

#[derive(Parser)]
#[command(name = "engine-stub")]
#[command(about = "Stub optimizer engine for testing")]
#[command(version)]
struct Args {
    /// Input file staged by the front end
    input: PathBuf,

    /// Test scenario (success, silent, sleep, fail)
    #[arg(long)]
    scenario: Option<String>,
}

/// Per-workspace knobs read from `stub_control.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StubControl {
    scenario: Option<String>,
    tac: Option<String>,
    optimized: Option<String>,
    stderr: Option<String>,
    exit_code: Option<u8>,
    sleep_secs: Option<u64>,
}

fn load_control() -> StubControl {
    let Ok(raw) = std::fs::read_to_string(CONTROL_FILE) else {
        return StubControl::default();
    };
    match toml::from_str(&raw) {
        Ok(control) => control,
        Err(e) => {
            eprintln!("engine-stub: bad {CONTROL_FILE}: {e}");
            StubControl::default()
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let control = load_control();
    let scenario = args
        .scenario
        .or_else(|| std::env::var("ENGINE_STUB_SCENARIO").ok())
        .or(control.scenario.clone())
        .unwrap_or_else(|| "success".to_string());

    match scenario.as_str() {
        "success" => run_success(&args.input, &control),
        "silent" => ExitCode::SUCCESS,
        "sleep" => run_sleep(&control),
        "fail" => run_fail(&control),
        other => {
            eprintln!("engine-stub: unknown scenario '{other}'");
            ExitCode::from(2)
        }
    }
}

/// Read the input (as the real engine would) and write both artifacts.
fn run_success(input: &PathBuf, control: &StubControl) -> ExitCode {
    if let Err(e) = std::fs::read_to_string(input) {
        eprintln!("engine-stub: cannot read {}: {e}", input.display());
        return ExitCode::from(2);
    }

    let tac = std::env::var("ENGINE_STUB_TAC")
        .ok()
        .or(control.tac.clone())
        .unwrap_or_else(|| DEFAULT_TAC.to_string());
    let optimized = std::env::var("ENGINE_STUB_OPT")
        .ok()
        .or(control.optimized.clone())
        .unwrap_or_else(|| DEFAULT_OPTIMIZED.to_string());

    if let Err(e) = std::fs::write("tac.txt", tac) {
        eprintln!("engine-stub: cannot write tac.txt: {e}");
        return ExitCode::from(3);
    }
    if let Err(e) = std::fs::write("optimized_output.txt", optimized) {
        eprintln!("engine-stub: cannot write optimized_output.txt: {e}");
        return ExitCode::from(3);
    }

    ExitCode::SUCCESS
}

/// Block long enough to trip any reasonable timeout, then leave a marker.
fn run_sleep(control: &StubControl) -> ExitCode {
    let sleep_secs = std::env::var("ENGINE_STUB_SLEEP_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(control.sleep_secs)
        .unwrap_or(30);

    thread::sleep(Duration::from_secs(sleep_secs));

    // The caller should have killed us long before this line runs.
    let _ = std::fs::write("stub_survived.txt", "still alive\n");
    ExitCode::SUCCESS
}

/// Fail the way a compiler does: diagnostics on stderr, non-zero exit.
fn run_fail(control: &StubControl) -> ExitCode {
    let message = std::env::var("ENGINE_STUB_STDERR")
        .ok()
        .or(control.stderr.clone())
        .unwrap_or_else(|| "bad syntax".to_string());
    let code = std::env::var("ENGINE_STUB_EXIT_CODE")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(control.exit_code)
        .unwrap_or(7);

    eprintln!("{message}");
    ExitCode::from(code)
}
