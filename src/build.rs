//! Build tool selection and invocation

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TesterError};

/// Preset build tools selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    #[default]
    Dotnet,
    Msbuild,
}

impl BuildTool {
    /// Command line for this tool, run in the project directory.
    pub fn command(self) -> Vec<String> {
        match self {
            BuildTool::Dotnet => vec!["dotnet".to_string(), "build".to_string()],
            BuildTool::Msbuild => vec!["msbuild".to_string()],
        }
    }
}

impl FromStr for BuildTool {
    type Err = TesterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dotnet" => Ok(BuildTool::Dotnet),
            "msbuild" => Ok(BuildTool::Msbuild),
            other => Err(TesterError::UnknownBuildTool(other.to_string())),
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildTool::Dotnet => write!(f, "dotnet"),
            BuildTool::Msbuild => write!(f, "msbuild"),
        }
    }
}

/// Captured result of one build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub success: bool,
    /// `None` when the build was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl BuildReport {
    /// Combined output for display after a failed build.
    pub fn output(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (true, false) => self.stderr.clone(),
            _ => self.stdout.clone(),
        }
    }
}

/// Run a build command to completion in `project_dir`.
///
/// A command that runs and exits non-zero is a failed build, not an error.
/// Errors are reserved for commands that could not be launched.
pub fn run_build(command: &[String], project_dir: &Path) -> Result<BuildReport> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| TesterError::InvalidConfig("build command is empty".to_string()))?;

    debug!(command = %command.join(" "), dir = %project_dir.display(), "running build");

    let start = Instant::now();
    let output = Command::new(program)
        .args(args)
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| TesterError::BuildSpawn {
            command: command.join(" "),
            source,
        })?;
    let duration = start.elapsed();

    Ok(BuildReport {
        success: output.status.success(),
        exit_code: output.status.code(),
        duration,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
