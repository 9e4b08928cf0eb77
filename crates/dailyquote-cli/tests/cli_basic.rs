//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const DATASET: &str = r#"[
    {"id": 1, "message": "First quote"},
    {"id": 2, "message": "Second quote"},
    {"id": 3, "message": "Third quote"}
]"#;

struct Sandbox {
    home: TempDir,
    dataset: PathBuf,
}

impl Sandbox {
    /// Fresh data dir with a three-quote dataset and a UTC calendar.
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let dataset = home.path().join("quotes.json");
        std::fs::write(&dataset, DATASET).unwrap();
        let sandbox = Self { home, dataset };
        sandbox.run_success(&["config", "set", "dataset.source", sandbox.dataset.to_str().unwrap()]);
        sandbox.run_success(&["config", "set", "unlock.utc_offset_minutes", "0"]);
        sandbox
    }

    fn path(&self) -> &Path {
        self.home.path()
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_dailyquote"))
            .args(args)
            .env("DAILYQUOTE_HOME", self.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    fn run_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {args:?} failed: {stderr}");
        stdout
    }
}

#[test]
fn test_today_unlocks_once_per_day() {
    let sb = Sandbox::new();

    let first = sb.run_success(&["today", "--now", "2024-01-01T09:00:00Z"]);
    assert!(first.contains("Welcome!"));
    assert!(first.contains("Today's Quote... (#1)"));
    assert!(first.contains("First quote"));

    let again = sb.run_success(&["today", "--now", "2024-01-01T20:00:00Z"]);
    assert!(again.contains("come back tomorrow"));
    assert!(again.contains("Today's Quote... (#1)"));
    assert!(!again.contains("Welcome!"));

    let next = sb.run_success(&["today", "--now", "2024-01-02T00:01:00Z"]);
    assert!(next.contains("Today's Quote... (#2)"));
    assert!(next.contains("Unlocked Quotes..."));
}

#[test]
fn test_today_json_output() {
    let sb = Sandbox::new();
    let out = sb.run_success(&["today", "--json", "--now", "2024-01-01T09:00:00Z"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["type"], "reveal_new");
    assert_eq!(value["quote"]["id"], 1);
    assert_eq!(value["total"], 3);
}

#[test]
fn test_all_unlocked_after_every_day() {
    let sb = Sandbox::new();
    for day in 1..=3 {
        sb.run_success(&["today", "--now", &format!("2024-01-0{day}T09:00:00Z")]);
    }
    let out = sb.run_success(&["today", "--now", "2024-01-04T09:00:00Z"]);
    assert!(out.contains("You have viewed all 3 quotes!"));
}

#[test]
fn test_missing_dataset_fails_and_stays_uninitialized() {
    let sb = Sandbox::new();
    let missing = sb.path().join("missing.json");
    let (_, stderr, code) = sb.run(&[
        "today",
        "--dataset",
        missing.to_str().unwrap(),
        "--now",
        "2024-01-01T09:00:00Z",
    ]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let status = sb.run_success(&["status", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(value["state"], "uninitialized");
    assert_eq!(value["unlocked"], 0);
}

#[test]
fn test_status_reports_next_unlock() {
    let sb = Sandbox::new();
    sb.run_success(&["today", "--now", "2024-01-01T09:00:00Z"]);
    let out = sb.run_success(&["status", "--json", "--now", "2024-01-01T10:00:00Z"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["state"], "same_day");
    assert_eq!(value["total"], 3);
    assert_eq!(value["unlocked"], 1);
    assert_eq!(value["next_unlock_at"], "2024-01-02T00:00:00Z");
}

#[test]
fn test_status_ignores_invalid_dataset_source() {
    let sb = Sandbox::new();
    sb.run_success(&["today", "--now", "2024-01-01T09:00:00Z"]);
    sb.run_success(&["config", "set", "dataset.source", "http://"]);

    let out = sb.run_success(&["status", "--json", "--now", "2024-01-02T09:00:00Z"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["state"], "fresh_day");
    assert_eq!(value["unlocked"], 1);
}

#[test]
fn test_list_and_export() {
    let sb = Sandbox::new();
    let empty = sb.run_success(&["list"]);
    assert!(empty.contains("No quotes unlocked yet"));

    sb.run_success(&["today", "--now", "2024-01-01T09:00:00Z"]);
    sb.run_success(&["today", "--now", "2024-01-02T09:00:00Z"]);

    let listed = sb.run_success(&["list", "--json"]);
    let quotes: Vec<serde_json::Value> = serde_json::from_str(&listed).unwrap();
    assert_eq!(quotes.len(), 2);

    let target = sb.path().join("quotes.md");
    sb.run_success(&["export", target.to_str().unwrap(), "--format", "markdown"]);
    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written, "# Unlocked Quotes\n\n1. First quote\n2. Second quote\n");
}

#[test]
fn test_reset_requires_confirmation() {
    let sb = Sandbox::new();
    sb.run_success(&["today", "--now", "2024-01-01T09:00:00Z"]);

    let (_, stderr, code) = sb.run(&["reset"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--yes"));

    sb.run_success(&["reset", "--yes"]);
    let out = sb.run_success(&["today", "--now", "2024-01-01T10:00:00Z"]);
    assert!(out.contains("Today's Quote... (#1)"));
}

#[test]
fn test_config_get_set() {
    let sb = Sandbox::new();
    assert_eq!(sb.run_success(&["config", "get", "unlock.utc_offset_minutes"]).trim(), "0");

    sb.run_success(&["config", "set", "display.show_unlocked", "false"]);
    assert_eq!(sb.run_success(&["config", "get", "display.show_unlocked"]).trim(), "false");

    let (_, stderr, code) = sb.run(&["config", "get", "display.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}
