use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn scan(extra: &[&str]) -> assert_cmd::assert::Assert {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.js"), "eval(x);\n").unwrap();
    Command::cargo_bin("taintmap")
        .unwrap()
        .env("TAINTMAP_CONFIG", tmp.path().join("absent.toml"))
        .env_remove("RUST_LOG")
        .args(extra)
        .args(["scan", "--format", "json"])
        .arg(tmp.path())
        .assert()
}

#[test]
fn info_logs_go_to_stderr() {
    scan(&[]).success().stderr(
        contains("Scan started")
            .and(contains("Patterns loaded"))
            .and(contains("File scanned").not()),
    );
}

#[test]
fn debug_flag_enables_per_file_logs() {
    scan(&["--debug"])
        .success()
        .stderr(contains("Debug mode enabled").and(contains("File scanned")));
}

#[test]
fn quiet_silences_logs() {
    scan(&["--quiet", "--debug"])
        .success()
        .stderr(predicates::str::is_empty());
}
