//! Run command implementation
//!
//! Starts the editor, then rewrites the target file and rebuilds until the
//! editor has survived enough rebuilds, a build fails, the editor dies, or
//! the operator interrupts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::build::{self, BuildReport};
use crate::config::TesterConfig;
use crate::console;
use crate::content::{self, ContentVariant};
use crate::failure::{CategorizedFailure, FailureCategory};
use crate::interrupt::Interrupt;
use crate::watched::WatchedProcess;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Survived,
    StartupExit,
    BuildFailed,
    Crashed,
    Interrupted,
}

impl Outcome {
    fn from_failure(failure: Option<&CategorizedFailure>) -> Self {
        match failure.map(|f| f.category) {
            None => Outcome::Survived,
            Some(FailureCategory::Setup) => Outcome::StartupExit,
            Some(FailureCategory::Build) => Outcome::BuildFailed,
            Some(FailureCategory::Crash) => Outcome::Crashed,
            Some(FailureCategory::Interrupted) => Outcome::Interrupted,
        }
    }
}

/// One toggle-and-rebuild cycle
#[derive(Debug, Clone, Serialize)]
pub struct Iteration {
    pub index: u32,
    pub written: ContentVariant,
    pub created: bool,
    pub build_success: bool,
    pub build_exit_code: Option<i32>,
    pub build_ms: u64,
}

/// Result of a crash test run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: Outcome,
    pub success_count: u32,
    pub required_successes: u32,
    /// Present unless the editor survived every rebuild
    pub failure: Option<CategorizedFailure>,
    pub iterations: Vec<Iteration>,
    /// Whether cleanup had to kill a still-running editor
    pub editor_killed: bool,
    pub config: TesterConfig,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Survived
    }
}

/// Progress through the rebuild loop
#[derive(Debug, Default)]
struct LoopState {
    success_count: u32,
    iterations: Vec<Iteration>,
}

impl LoopState {
    fn record(&mut self, written: ContentVariant, created: bool, report: &BuildReport) {
        self.iterations.push(Iteration {
            index: self.iterations.len() as u32 + 1,
            written,
            created,
            build_success: report.success,
            build_exit_code: report.exit_code,
            build_ms: report.duration.as_millis() as u64,
        });
    }
}

/// Run the crash test with the given config
///
/// Errors mean the run could not be carried out (editor or build could not
/// be launched, target file not writable). Every way the test itself can
/// end is reported through [`RunResult::outcome`]. The editor is killed
/// before returning in all cases.
pub fn run(config: &TesterConfig, interrupt: &Interrupt) -> Result<RunResult> {
    config.validate()?;
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();

    let mut editor = WatchedProcess::spawn(&config.editor_command, &config.project_dir)
        .context("Failed to start editor")?;
    info!(run_id = %run_id, pid = editor.id(), command = %editor.command(), "editor started");

    console::header(config);

    let mut state = LoopState::default();
    let loop_result = drive(config, interrupt, &mut editor, &mut state);

    let editor_killed = match editor.kill_if_running() {
        Ok(killed) => killed,
        Err(e) => {
            warn!(error = %e, "failed to stop editor");
            false
        }
    };
    if editor_killed {
        debug!("editor was still running at exit and has been killed");
    }

    let failure = loop_result?;
    let outcome = Outcome::from_failure(failure.as_ref());
    info!(
        run_id = %run_id,
        outcome = ?outcome,
        successes = state.success_count,
        iterations = state.iterations.len(),
        "run finished"
    );

    Ok(RunResult {
        run_id,
        started_at,
        finished_at: Utc::now(),
        outcome,
        success_count: state.success_count,
        required_successes: config.required_successes,
        failure,
        iterations: state.iterations,
        editor_killed,
        config: config.clone(),
    })
}

/// The loop proper. `Ok(None)` means the editor survived every rebuild.
fn drive(
    config: &TesterConfig,
    interrupt: &Interrupt,
    editor: &mut WatchedProcess,
    state: &mut LoopState,
) -> Result<Option<CategorizedFailure>> {
    let required = config.required_successes;
    let target = config.target_path();

    debug!(secs = config.startup_delay.as_secs_f64(), "waiting for editor startup");
    if !interrupt.sleep(config.startup_delay) {
        console::interrupted();
        return Ok(Some(CategorizedFailure::interrupted(0, required)));
    }
    if let Some(status) = editor.exit_status()? {
        console::editor_exited_during_startup();
        return Ok(Some(CategorizedFailure::editor_exited_during_startup(status)));
    }

    loop {
        if interrupt.is_set() {
            console::interrupted();
            return Ok(Some(CategorizedFailure::interrupted(state.success_count, required)));
        }

        let toggle = content::toggle_file(&target)
            .with_context(|| format!("Failed to rewrite {}", target.display()))?;
        console::toggled(&toggle);

        if !interrupt.sleep(config.delay) {
            console::interrupted();
            return Ok(Some(CategorizedFailure::interrupted(state.success_count, required)));
        }

        console::build_started();
        let report = build::run_build(&config.build_command, &config.project_dir)?;
        debug!(
            success = report.success,
            exit_code = ?report.exit_code,
            ms = report.duration.as_millis() as u64,
            "build finished"
        );

        // Ctrl+C reaches the build too, so its failure is not a real one.
        if interrupt.is_set() {
            console::interrupted();
            return Ok(Some(CategorizedFailure::interrupted(state.success_count, required)));
        }

        state.record(toggle.written, toggle.created, &report);

        if !report.success {
            console::build_failed(&report);
            return Ok(Some(CategorizedFailure::build_failed(
                report.exit_code,
                report.output(),
            )));
        }
        console::build_succeeded(report.duration);

        if let Some(status) = editor.exit_status()? {
            console::crashed();
            return Ok(Some(CategorizedFailure::editor_crashed(
                status,
                state.success_count,
            )));
        }

        state.success_count += 1;
        console::survived(state.success_count, required);

        if state.success_count >= required {
            console::passed();
            return Ok(None);
        }
        console::divider();
    }
}
