//! CLI command dispatch.
//!
//! Library code returns typed errors; this module is the only place they are
//! rendered for the terminal and mapped to process exit codes.

use camino::Utf8Path;
use clap::Parser;
use std::io::Read;

use crate::cli::args::{Cli, Commands};
use crate::config::Config;
use crate::exit_codes::ExitCode;
use crate::logging;
use crate::pipeline::Pipeline;
use crate::workspace::{OPTIMIZED_FILE, TAC_FILE};

/// Entry point invoked by `main`. Handles all output including errors.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let config = Config::resolve(&cli.overrides()).map_err(|e| {
        eprintln!("{e}");
        ExitCode::CLI_ARGS
    })?;

    match cli.command.unwrap_or(Commands::Tui { file: None }) {
        Commands::Tui { file } => tui_command(config, file),
        Commands::Run { file } => run_command(config, file),
    }
}

fn tui_command(config: Config, file: Option<camino::Utf8PathBuf>) -> Result<(), ExitCode> {
    let preload = file.as_deref().map(read_source_file).transpose()?;
    crate::tui::run_tui(config, preload).map_err(|e| {
        eprintln!("{e:#}");
        ExitCode::INTERNAL
    })
}

fn run_command(config: Config, file: Option<camino::Utf8PathBuf>) -> Result<(), ExitCode> {
    let source = match file.as_deref() {
        Some(path) => read_source_file(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|e| {
                eprintln!("failed to read stdin: {e}");
                ExitCode::INTERNAL
            })?;
            buf
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            eprintln!("failed to start async runtime: {e}");
            ExitCode::INTERNAL
        })?;

    let pipeline = Pipeline::from_config(&config);
    let outcome = runtime.block_on(pipeline.run(&source)).map_err(|e| {
        eprintln!("{}", e.display_for_user());
        e.to_exit_code()
    })?;

    println!("=== {TAC_FILE} ===");
    println!("{}", outcome.intermediate.display_text());
    println!("=== {OPTIMIZED_FILE} ===");
    println!("{}", outcome.optimized.display_text());

    Ok(())
}

fn read_source_file(path: &Utf8Path) -> Result<String, ExitCode> {
    std::fs::read_to_string(path).map_err(|e| {
        eprintln!("failed to read {path}: {e}");
        ExitCode::CLI_ARGS
    })
}
