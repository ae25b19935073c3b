//! Integration tests for the rebuild loop, with shell commands standing in
//! for the editor and the build tool.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crash_tester::commands::run::run;
use crash_tester::{FailureCategory, Interrupt, Outcome, TesterConfig};
use tempfile::TempDir;

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

fn config(dir: &Path, editor: &str, build: &str, required: u32) -> TesterConfig {
    TesterConfig {
        delay: Duration::ZERO,
        startup_delay: Duration::ZERO,
        required_successes: required,
        project_dir: dir.to_path_buf(),
        editor_command: sh(editor),
        build_command: sh(build),
        ..TesterConfig::default()
    }
}

#[test]
fn each_build_sees_the_freshly_written_variant() {
    let temp = TempDir::new().unwrap();
    let build = "grep -o 'public void [A-Za-z]*' CrashTest.cs >> builds.log";
    let config = config(temp.path(), "sleep 30", build, 4);

    let result = run(&config, &Interrupt::new()).unwrap();

    assert!(result.passed());
    let log = fs::read_to_string(temp.path().join("builds.log")).unwrap();
    let methods: Vec<_> = log.lines().collect();
    assert_eq!(
        methods,
        vec![
            "public void Test",
            "public void TestTwo",
            "public void Test",
            "public void TestTwo"
        ]
    );
}

#[test]
fn existing_variant_two_continues_with_one() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("CrashTest.cs"),
        crash_tester::content::ContentVariant::Two.text(),
    )
    .unwrap();
    let config = config(temp.path(), "sleep 30", "true", 1);

    let result = run(&config, &Interrupt::new()).unwrap();

    assert!(result.passed());
    assert!(!result.iterations[0].created);
    assert_eq!(
        fs::read_to_string(temp.path().join("CrashTest.cs")).unwrap(),
        crash_tester::content::ContentVariant::One.text()
    );
}

#[test]
fn delay_is_applied_before_every_build() {
    let temp = TempDir::new().unwrap();
    let mut config = config(temp.path(), "sleep 30", "true", 3);
    config.delay = Duration::from_millis(100);

    let start = Instant::now();
    let result = run(&config, &Interrupt::new()).unwrap();

    assert!(result.passed());
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[test]
fn interrupt_during_loop_stops_with_partial_count() {
    let temp = TempDir::new().unwrap();
    // Each build takes a while; the interrupt lands part way through.
    let config = config(temp.path(), "sleep 30", "sleep 0.2", 1000);
    let interrupt = Interrupt::new();
    let remote = interrupt.clone();
    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(700));
        remote.trigger();
    });

    let result = run(&config, &interrupt).unwrap();
    trigger.join().unwrap();

    assert_eq!(result.outcome, Outcome::Interrupted);
    assert!(result.success_count < 1000);
    assert!(result.editor_killed);
    assert_eq!(
        result.failure.unwrap().category,
        FailureCategory::Interrupted
    );
}

#[test]
fn huge_startup_delay_is_interruptible() {
    let temp = TempDir::new().unwrap();
    let mut config = config(temp.path(), "sleep 30", "true", 1);
    config.startup_delay = Duration::from_secs(u64::MAX);
    let interrupt = Interrupt::new();
    interrupt.trigger();

    let result = run(&config, &interrupt).unwrap();

    assert_eq!(result.outcome, Outcome::Interrupted);
    assert!(result.editor_killed);
}

#[test]
fn unwritable_target_is_an_error() {
    let temp = TempDir::new().unwrap();
    let mut config = config(temp.path(), "sleep 30", "true", 1);
    config.target_file = "missing-dir/CrashTest.cs".into();

    let err = run(&config, &Interrupt::new()).unwrap_err();
    assert!(err.to_string().contains("Failed to rewrite"));
}
