//! quizrip - command-line entry point
//!
//! Usage:
//!   quizrip [OPTIONS] <INPUT> <OUTPUT_DIR>
//!
//! Reads the quiz sheet, checks that the external tools are available,
//! then builds `questions/` and `reponses/` under the output folder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;

use quizrip_core::config::{ConfigManager, Settings};
use quizrip_core::logging::{init_tracing, LogConfig, LogLevel, LogSink, RunLogger};
use quizrip_core::models::OutputLayout;
use quizrip_core::ops::ToolOps;
use quizrip_core::orchestrator::{CancelHandle, QuizRun, RunReport};
use quizrip_core::records::load_sheet;
use quizrip_core::scratch::ScratchSpace;
use quizrip_core::tools::{ToolRole, ToolRunner, Toolset};

/// Startup or run failure.
const EXIT_FATAL: u8 = 1;
/// Some entry or overlap group failed and `--strict` was given.
const EXIT_STRICT: u8 = 3;
/// Second interrupt while a run was already stopping.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "quizrip", version)]
#[command(about = "Build quiz question and answer clips from a CSV sheet")]
struct Cli {
    /// CSV sheet of quiz tracks (first row is a header).
    input: PathBuf,

    /// Output folder; `questions/` and `reponses/` are created inside.
    output_dir: PathBuf,

    /// Config file to use (created with defaults if missing).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of the run to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Exit with status 3 if any entry or overlap group failed.
    #[arg(long)]
    strict: bool,

    /// Show debug output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    init_tracing(level);
    tracing::debug!("quizrip core {}", quizrip_core::version());

    match run(&cli, level) {
        Ok(report) if cli.strict && report.has_failures() => ExitCode::from(EXIT_STRICT),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli, level: LogLevel) -> Result<RunReport> {
    let settings = load_settings(cli.config.as_deref())?;

    let tools = Toolset::locate(&settings.tools).context("Startup check failed")?;
    for role in ToolRole::all() {
        tracing::info!("{}: {}", role, tools.path(*role).display());
    }
    let sheet = load_sheet(&cli.input)
        .with_context(|| format!("Cannot load {}", cli.input.display()))?;
    tracing::info!(
        "Loaded {} entries from {} ({} skipped)",
        sheet.entries.len(),
        cli.input.display(),
        sheet.skipped.len()
    );

    let logger = Arc::new(build_logger(&settings, level)?);

    let scratch_parent = if settings.paths.temp_root.is_empty() {
        cli.output_dir.clone()
    } else {
        PathBuf::from(&settings.paths.temp_root)
    };
    let scratch = ScratchSpace::create(&scratch_parent)
        .with_context(|| format!("Cannot create scratch space in {}", scratch_parent.display()))?
        .keep_on_drop(settings.run.keep_scratch);

    let timeout = (settings.tools.timeout_secs > 0)
        .then(|| Duration::from_secs(settings.tools.timeout_secs));
    let runner = ToolRunner::new(Arc::clone(&logger)).with_timeout(timeout);
    let ops = ToolOps::new(tools, runner, scratch, settings.encoding.clone())?;

    let layout = OutputLayout::new(&cli.output_dir);
    let quiz = QuizRun::new(settings, layout, ops, Arc::clone(&logger));
    install_interrupt_handler(quiz.cancel_handle())
        .context("Failed to install interrupt handler")?;
    let mut report = quiz.run(&sheet.entries)?;
    report.skipped_records = sheet.skipped.len();

    if let Some(path) = &cli.report {
        write_report(path, &report)?;
    }
    logger.close();

    Ok(report)
}

/// Settings from `--config`, else the per-user config file, else defaults.
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let mut manager = ConfigManager::new(path);
        manager
            .load_or_create()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!("Using config {}", manager.path().display());
        return Ok(manager.into_settings());
    }

    match user_config_path() {
        Some(path) if path.exists() => {
            let mut manager = ConfigManager::new(&path);
            manager
                .load()
                .with_context(|| format!("Invalid config {}", path.display()))?;
            tracing::debug!("Using config {}", manager.path().display());
            Ok(manager.into_settings())
        }
        _ => Ok(Settings::default()),
    }
}

/// Cancel the run on Ctrl+C or SIGTERM.
///
/// The entry in progress finishes, later entries are not dispatched and
/// overlap resolution is skipped. A second interrupt exits immediately.
fn install_interrupt_handler(cancel: CancelHandle) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if let Err(e) = interrupted().await {
                    tracing::warn!("Interrupt handler stopped: {}", e);
                    return;
                }
                tracing::warn!("Interrupted, stopping after the current entry");
                cancel.cancel();

                if interrupted().await.is_ok() {
                    tracing::warn!("Interrupted again, exiting");
                    process::exit(EXIT_INTERRUPTED);
                }
            })
        })?;
    Ok(())
}

async fn interrupted() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// `<config dir>/quizrip.toml` for the current user.
fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "quizrip").map(|dirs| dirs.config_dir().join("quizrip.toml"))
}

/// Run logger printing to stdout, plus a log file if a folder is configured.
fn build_logger(settings: &Settings, level: LogLevel) -> Result<RunLogger> {
    let sink: LogSink = Box::new(|line| println!("{}", line));
    let logger =
        RunLogger::new(LogConfig::from_settings(&settings.logging, level)).with_sink(sink);

    if settings.paths.logs_folder.is_empty() {
        return Ok(logger);
    }

    let logger = logger
        .with_log_file(&settings.paths.logs_folder)
        .with_context(|| format!("Cannot open log in {}", settings.paths.logs_folder))?;
    if let Some(path) = logger.log_path() {
        tracing::info!("Run log: {}", path.display());
    }
    Ok(logger)
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Cannot write report {}", path.display()))?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn both_positionals_are_required() {
        assert!(Cli::try_parse_from(["quizrip"]).is_err());
        assert!(Cli::try_parse_from(["quizrip", "quiz.csv"]).is_err());

        let cli = Cli::try_parse_from(["quizrip", "quiz.csv", "out", "--strict", "-v"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("quiz.csv"));
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.strict && cli.verbose);
        assert!(cli.report.is_none());
    }

    #[test]
    fn interrupt_handler_installs() {
        let cancel = CancelHandle::new();
        install_interrupt_handler(cancel.clone()).unwrap();
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn explicit_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizrip.toml");

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.tools.mixer, "sox");
        assert!(path.exists());
    }
}
