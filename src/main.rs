//! solution-crash-tester CLI
//!
//! Keeps the editor open on a project, rewrites a source file and rebuilds
//! until the editor either survives enough rebuilds or crashes.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crash_tester::commands::run;
use crash_tester::{console, report, BuildTool, Interrupt, Overrides, TesterConfig};
use tracing::error;

#[derive(Parser)]
#[command(name = "solution-crash-tester")]
#[command(about = "Rebuild a project in a loop and watch the editor for interop crashes")]
struct Cli {
    /// Delay in milliseconds between rewriting the file and building
    delay_ms: Option<String>,

    /// Build tool to run: dotnet or msbuild
    build_tool: Option<String>,

    /// Number of rebuilds the editor must survive
    #[arg(long)]
    successes: Option<u32>,

    /// Seconds to let the editor start before the first rebuild
    #[arg(long)]
    startup_delay: Option<u64>,

    /// File to rewrite, relative to the project directory (default: CrashTest.cs)
    #[arg(long)]
    target_file: Option<PathBuf>,

    /// Project directory the editor and build run in (default: .)
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Editor command line (default: "godot --editor .")
    #[arg(long)]
    editor: Option<String>,

    /// Build command line, replacing the build tool preset
    #[arg(long)]
    build_command: Option<String>,

    /// Path to config file (default: ./crash-tester.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON summary of the run to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "crash_tester=debug,solution_crash_tester=debug,info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Positional arguments given as empty strings count as omitted.
fn non_empty(arg: Option<String>) -> Option<String> {
    arg.filter(|s| !s.trim().is_empty())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let delay_ms = non_empty(cli.delay_ms)
        .map(|s| {
            s.trim()
                .parse::<u64>()
                .with_context(|| format!("invalid delay '{}': expected milliseconds", s))
        })
        .transpose()?;
    let build_tool = non_empty(cli.build_tool)
        .map(|s| s.parse::<BuildTool>())
        .transpose()?;

    let overrides = Overrides {
        delay_ms,
        build_tool,
        build_command: cli.build_command,
        required_successes: cli.successes,
        startup_delay_secs: cli.startup_delay,
        target_file: cli.target_file,
        project_dir: cli.project_dir,
        editor_command: cli.editor,
    };
    let config = TesterConfig::load(cli.config.as_deref(), overrides)?;

    let interrupt = Interrupt::new();
    interrupt.install_handler()?;

    let result = match run::run(&config, &interrupt) {
        Ok(result) => result,
        Err(e) => {
            console::exited();
            return Err(e);
        }
    };

    if let Some(path) = cli.report {
        if let Err(e) = report::write_report(&path, &result) {
            error!(error = %e, "failed to write report");
        }
    }

    console::exited();

    if !result.passed() {
        std::process::exit(1);
    }
    Ok(())
}
