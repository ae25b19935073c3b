//! Failure categorization for crash test runs
//!
//! Separates the outcome that matters from the ones that only mean the run
//! could not finish:
//! - Setup: the editor never came up
//! - Build: the project stopped compiling
//! - Crash: the editor died during the rebuild loop (the bug under test)
//! - Interrupted: the operator stopped the run

use std::fmt;
use std::process::ExitStatus;

use serde::Serialize;

/// Category of failure for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCategory {
    Setup,
    Build,
    Crash,
    Interrupted,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCategory::Setup => write!(f, "Setup"),
            FailureCategory::Build => write!(f, "Build"),
            FailureCategory::Crash => write!(f, "Crash"),
            FailureCategory::Interrupted => write!(f, "Interrupted"),
        }
    }
}

/// A failure with category and details
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedFailure {
    pub category: FailureCategory,
    /// Short description of what failed
    pub message: String,
    pub details: Option<String>,
}

impl CategorizedFailure {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Editor exited before the first rebuild
    pub fn editor_exited_during_startup(status: ExitStatus) -> Self {
        Self::new(FailureCategory::Setup, "Editor exited during startup")
            .with_details(describe_status(status))
    }

    /// Build ran and reported failure
    pub fn build_failed(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        let message = match exit_code {
            Some(code) => format!("Build failed with exit code {}", code),
            None => "Build terminated by signal".to_string(),
        };
        Self::new(FailureCategory::Build, message).with_details(output)
    }

    /// Editor died after a successful rebuild
    pub fn editor_crashed(status: ExitStatus, survived: u32) -> Self {
        Self::new(
            FailureCategory::Crash,
            format!("Editor crashed after {} successful rebuilds", survived),
        )
        .with_details(describe_status(status))
    }

    /// Operator interrupted the run
    pub fn interrupted(survived: u32, required: u32) -> Self {
        Self::new(
            FailureCategory::Interrupted,
            format!("Interrupted after {}/{} rebuilds", survived, required),
        )
    }
}

impl fmt::Display for CategorizedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " - {}", details)?;
        }
        Ok(())
    }
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit code {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("killed by signal {}", signal);
        }
    }
    status.to_string()
}
