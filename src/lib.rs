//! solution-crash-tester library
//!
//! Rebuilds a project over and over while an editor has it open, to catch
//! interop/marshalling faults that only show up across assembly reloads.

pub mod build;
pub mod commands;
pub mod config;
pub mod console;
pub mod content;
pub mod error;
pub mod failure;
pub mod interrupt;
pub mod report;
pub mod watched;

pub use build::BuildTool;
pub use commands::run::{Outcome, RunResult};
pub use config::{Overrides, TesterConfig};
pub use error::TesterError;
pub use failure::{CategorizedFailure, FailureCategory};
pub use interrupt::Interrupt;
