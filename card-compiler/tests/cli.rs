//! Runs the `card-compiler` binary and checks exit codes and output streams.

use std::process::{Command, Output};

const ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_MODEL",
    "COS_SECRET_ID",
    "COS_SECRET_KEY",
    "COS_BUCKET",
    "COS_REGION",
    "COS_ENDPOINT",
];

fn run(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_card-compiler"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.args(args).output().expect("run card-compiler")
}

#[test]
fn no_command_prints_help_and_succeeds() {
    let output = run(&[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("compile"));
}

#[test]
fn help_flag_succeeds() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn compile_without_image_is_usage_error() {
    let output = run(&["compile"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("required"));
}

#[test]
fn unreadable_image_fails_before_storage_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("nonexistent.png");
    let output = run(&["compile", image.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: failed to compile card"));
    assert!(stderr.contains("failed to decode image"));
    assert!(!stderr.contains("object storage not configured"));
}
