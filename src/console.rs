//! Progress lines printed to stdout while the loop runs

use std::time::Duration;

use colored::Colorize;

use crate::build::BuildReport;
use crate::config::TesterConfig;
use crate::content::Toggle;

pub fn divider() {
    println!("{}", "---------------------------------".bright_black());
}

pub fn header(config: &TesterConfig) {
    println!(
        "{} Build CLI: {}",
        format!(
            "Solution Crash Tester (Delay: {} ms, Required Successes: {}):",
            config.delay.as_millis(),
            config.required_successes
        )
        .bright_green(),
        config.build_command.join(" ")
    );
    println!("{}", "  Press Ctrl+C to exit".bright_green());
    divider();
}

pub fn toggled(toggle: &Toggle) {
    if toggle.created {
        println!("{}", "  Target file doesn't exist, creating new file".blue());
    }
    println!("{}", format!("  Changing Content to {}", toggle.written).blue());
}

pub fn build_started() {
    println!("{}", "  Running Build:".bright_blue());
}

pub fn build_succeeded(duration: Duration) {
    println!(
        "{}",
        format!("    Success ({:.2} s)", duration.as_secs_f64()).blue()
    );
}

pub fn build_failed(report: &BuildReport) {
    println!("{}", "    Build Failed:".red());
    println!("{}", report.output().bright_black());
}

pub fn survived(count: u32, required: u32) {
    println!(
        "{}",
        format!("  Survived ({}/{}) rebuilds.", count, required).blue()
    );
}

pub fn editor_exited_during_startup() {
    println!(
        "{}",
        "FAIL: Editor exited before the first rebuild. Check the editor command.".red()
    );
}

pub fn crashed() {
    println!(
        "{}",
        "FAIL: Editor crashed. A marshalling bug exists in the project".red()
    );
}

pub fn passed() {
    println!("{}", "SUCCESS: Editor survived the rebuilds.".bright_green());
}

pub fn interrupted() {
    println!("{}", "Interrupted.".yellow());
}

pub fn exited() {
    println!("{}", "Exited...".bright_green());
}
