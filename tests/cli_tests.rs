//! CLI integration tests
//!
//! Runs the built `trainlog-server` binary against scratch directories.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_trainlog(args: &[&str], working_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trainlog-server"))
        .args(args)
        .arg("--no-color")
        .current_dir(working_dir)
        .env_remove("JWT_SECRET")
        .env_remove("TURSO_DATABASE_URL")
        .env_remove("TURSO_AUTH_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute trainlog-server")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn initialized_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let output = run_trainlog(&["init"], dir.path());
    assert!(output.status.success(), "init failed: {:?}", output);
    dir
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_trainlog(&["--help"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["init", "config", "clear-db", "seed"] {
        assert!(text.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_version() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_trainlog(&["--version"], dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("trainlog-server"));
}

// =============================================================================
// init
// =============================================================================

#[test]
fn test_init_creates_project_files() {
    let dir = initialized_dir();

    assert!(dir.path().join("trainlog.toml").is_file());
    assert!(dir.path().join(".env.example").is_file());
    assert!(dir.path().join(".gitignore").is_file());
    assert!(dir.path().join("data").is_dir());
    assert!(dir.path().join("data/blobs").is_dir());
}

#[test]
fn test_init_custom_port_lands_in_config() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_trainlog(&["init", "--port", "4100"], dir.path());
    assert!(output.status.success());

    let content = fs::read_to_string(dir.path().join("trainlog.toml")).expect("read");
    assert!(content.contains("4100"));
}

#[test]
fn test_init_keeps_existing_config_without_force() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("trainlog.toml"), "# mine\n").expect("write");

    let output = run_trainlog(&["init"], dir.path());
    assert!(output.status.success());

    let content = fs::read_to_string(dir.path().join("trainlog.toml")).expect("read");
    assert_eq!(content, "# mine\n");
}

// =============================================================================
// config
// =============================================================================

#[test]
fn test_config_shows_effective_values() {
    let dir = initialized_dir();
    let output = run_trainlog(&["config"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("127.0.0.1:3000"));
    assert!(text.contains("trainlog.db"));
}

#[test]
fn test_config_validate_requires_secret() {
    let dir = initialized_dir();

    let missing = run_trainlog(&["config", "--validate"], dir.path());
    assert!(!missing.status.success());

    let present = Command::new(env!("CARGO_BIN_EXE_trainlog-server"))
        .args(["config", "--validate", "--no-color"])
        .current_dir(dir.path())
        .env("JWT_SECRET", "cli-test-secret-that-is-long-enough-to-pass")
        .output()
        .expect("Failed to execute trainlog-server");
    assert!(present.status.success(), "{:?}", present);
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_trainlog(&["config"], dir.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("trainlog.toml"));
}

// =============================================================================
// seed / clear-db
// =============================================================================

#[test]
fn test_seed_then_clear() {
    let dir = initialized_dir();

    let seeded = run_trainlog(
        &["seed", "--users", "2", "--animals", "3", "--logs", "4"],
        dir.path(),
    );
    assert!(seeded.status.success(), "{:?}", seeded);
    assert!(stdout(&seeded).contains("training_logs"));
    assert!(dir.path().join("data/trainlog.db").is_file());

    let cleared = run_trainlog(&["clear-db", "--yes"], dir.path());
    assert!(cleared.status.success(), "{:?}", cleared);
    assert!(stdout(&cleared).contains("Cleared"));
}

#[test]
fn test_seed_rejects_orphans() {
    let dir = initialized_dir();

    let output = run_trainlog(&["seed", "--users", "0", "--animals", "1"], dir.path());
    assert!(!output.status.success());
}
