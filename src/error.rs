use std::path::PathBuf;

use thiserror::Error;

/// Error types for crash tester operations.
#[derive(Error, Debug)]
pub enum TesterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown build tool '{0}'. Valid values: dotnet, msbuild")]
    UnknownBuildTool(String),

    #[error("Failed to launch editor '{command}': {source}")]
    EditorSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch build '{command}': {source}")]
    BuildSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to poll editor process: {0}")]
    Poll(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TesterError>;
