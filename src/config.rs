use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::build::BuildTool;

pub const DEFAULT_REQUIRED_SUCCESSES: u32 = 30;
pub const DEFAULT_STARTUP_DELAY_SECS: u64 = 10;
pub const DEFAULT_TARGET_FILE: &str = "CrashTest.cs";
const DEFAULT_EDITOR_COMMAND: &[&str] = &["godot", "--editor", "."];
const LOCAL_CONFIG_FILE: &str = "crash-tester.toml";

/// Fully resolved tester configuration.
#[derive(Debug, Clone, Serialize)]
pub struct TesterConfig {
    /// Pause between rewriting the target file and starting the build.
    pub delay: Duration,
    pub build_tool: BuildTool,
    /// Command actually run for each build. Either the preset of `build_tool`
    /// or an explicit override.
    pub build_command: Vec<String>,
    pub required_successes: u32,
    /// Time the editor gets to start before the first rebuild.
    pub startup_delay: Duration,
    pub target_file: PathBuf,
    pub project_dir: PathBuf,
    pub editor_command: Vec<String>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            build_tool: BuildTool::default(),
            build_command: BuildTool::default().command(),
            required_successes: DEFAULT_REQUIRED_SUCCESSES,
            startup_delay: Duration::from_secs(DEFAULT_STARTUP_DELAY_SECS),
            target_file: PathBuf::from(DEFAULT_TARGET_FILE),
            project_dir: PathBuf::from("."),
            editor_command: DEFAULT_EDITOR_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Values given on the command line. These win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub delay_ms: Option<u64>,
    pub build_tool: Option<BuildTool>,
    pub build_command: Option<String>,
    pub required_successes: Option<u32>,
    pub startup_delay_secs: Option<u64>,
    pub target_file: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub editor_command: Option<String>,
}

/// Raw TOML file structure for `crash-tester.toml`.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    delay_ms: Option<u64>,
    build_tool: Option<BuildTool>,
    build_command: Option<Vec<String>>,
    required_successes: Option<u32>,
    startup_delay_secs: Option<u64>,
    target_file: Option<PathBuf>,
    project_dir: Option<PathBuf>,
    editor_command: Option<Vec<String>>,
}

/// Config file locations tried when none is given explicitly.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("solution-crash-tester").join("config.toml"));
    }
    paths
}

impl TesterConfig {
    /// Load configuration from file, environment and command line.
    ///
    /// Priority: command line, then `CRASH_TESTER_*` environment variables,
    /// then the config file, then built-in defaults. An explicit
    /// `config_path` must exist; default locations are skipped when absent.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file_config = match config_path {
            Some(path) => read_config_file(path)?,
            None => match default_config_paths().into_iter().find(|p| p.exists()) {
                Some(path) => read_config_file(&path)?,
                None => ConfigFile::default(),
            },
        };

        Self::resolve(file_config, overrides, |key| std::env::var(key).ok())
    }

    /// Merge the three sources. `env` looks up environment variables.
    fn resolve(
        file: ConfigFile,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = Self::default();

        let delay_ms = match overrides.delay_ms {
            Some(ms) => Some(ms),
            None => parse_env(&env, "CRASH_TESTER_DELAY_MS")?,
        }
        .or(file.delay_ms);

        let build_tool = match overrides.build_tool {
            Some(tool) => Some(tool),
            None => parse_env(&env, "CRASH_TESTER_BUILD_TOOL")?,
        }
        .or(file.build_tool)
        .unwrap_or(defaults.build_tool);

        let build_command = overrides
            .build_command
            .or_else(|| env("CRASH_TESTER_BUILD_COMMAND"))
            .map(|s| split_command(&s))
            .or(file.build_command)
            .unwrap_or_else(|| build_tool.command());

        let required_successes = match overrides.required_successes {
            Some(n) => Some(n),
            None => parse_env(&env, "CRASH_TESTER_SUCCESSES")?,
        }
        .or(file.required_successes)
        .unwrap_or(defaults.required_successes);

        let startup_delay = match overrides.startup_delay_secs {
            Some(secs) => Some(secs),
            None => parse_env(&env, "CRASH_TESTER_STARTUP_DELAY")?,
        }
        .or(file.startup_delay_secs)
        .map(Duration::from_secs)
        .unwrap_or(defaults.startup_delay);

        let editor_command = overrides
            .editor_command
            .or_else(|| env("CRASH_TESTER_EDITOR"))
            .map(|s| split_command(&s))
            .or(file.editor_command)
            .unwrap_or(defaults.editor_command);

        let config = Self {
            delay: delay_ms.map(Duration::from_millis).unwrap_or(defaults.delay),
            build_tool,
            build_command,
            required_successes,
            startup_delay,
            target_file: overrides
                .target_file
                .or(file.target_file)
                .unwrap_or(defaults.target_file),
            project_dir: overrides
                .project_dir
                .or(file.project_dir)
                .unwrap_or(defaults.project_dir),
            editor_command,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.required_successes == 0 {
            bail!("required_successes must be at least 1");
        }
        if self.editor_command.is_empty() {
            bail!("editor_command is required (set --editor or CRASH_TESTER_EDITOR)");
        }
        if self.build_command.is_empty() {
            bail!("build_command must not be empty");
        }
        if self.target_file.as_os_str().is_empty() {
            bail!("target_file must not be empty");
        }
        Ok(())
    }

    /// Path of the file rewritten on every iteration.
    pub fn target_path(&self) -> PathBuf {
        self.project_dir.join(&self.target_file)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ConfigFile>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn parse_env<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {}='{}': {}", key, raw, e)),
        _ => Ok(None),
    }
}

fn split_command(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
