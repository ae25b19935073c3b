//! JSON run summaries

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::commands::run::RunResult;

/// Write `result` as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, result: &RunResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(result).context("failed to serialize run report")?;
    fs::write(path, json).with_context(|| format!("failed to write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run::{Iteration, Outcome};
    use crate::config::TesterConfig;
    use crate::content::ContentVariant;
    use crate::failure::CategorizedFailure;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_result() -> RunResult {
        RunResult {
            run_id: "run-1".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: Outcome::BuildFailed,
            success_count: 1,
            required_successes: 30,
            failure: Some(CategorizedFailure::build_failed(Some(1), "error CS1002")),
            iterations: vec![Iteration {
                index: 1,
                written: ContentVariant::One,
                created: true,
                build_success: true,
                build_exit_code: Some(0),
                build_ms: 1200,
            }],
            editor_killed: true,
            config: TesterConfig::default(),
        }
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports/nested/run.json");

        write_report(&path, &sample_result()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"], "build_failed");
        assert_eq!(value["success_count"], 1);
        assert_eq!(value["failure"]["category"], "build");
        assert_eq!(value["iterations"][0]["written"], "one");
        assert_eq!(value["config"]["build_tool"], "dotnet");
        assert_eq!(value["config"]["build_command"][1], "build");
    }
}
