//! Integration tests for the batch editor CLI.
//!
//! These tests run the actual binary, feed commands on stdin and check the
//! replies and the files left on disk.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Temp data dir holding a copy of a fixture under the same name.
fn data_dir_with(fixture: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        Path::new("tests/data").join(fixture),
        dir.path().join(fixture),
    )
    .unwrap();
    dir
}

fn editor(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("batch-editor").unwrap();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .arg("--lock-config")
        .arg(dir.path().join("lock_config.json"));
    cmd
}

#[test]
fn test_intro_and_quit() {
    let dir = tempfile::tempdir().unwrap();
    editor(&dir)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to the data manager"))
        .stdout(predicate::str::contains("No file is loaded"))
        .stdout(predicate::str::contains("Exiting the program."));
}

#[test]
fn test_get_field_after_load() {
    let dir = data_dir_with("valid_usd.txt");
    editor(&dir)
        .write_stdin("load valid_usd.txt\nget_field transaction amount 1\nget_field footer total_counter\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("File 'valid_usd.txt' loaded successfully."))
        .stdout(predicate::str::contains("000000100.00"))
        .stdout(predicate::str::contains("000001"));
}

#[test]
fn test_file_argument_loads_on_startup() {
    let dir = data_dir_with("valid_eur_three.txt");
    editor(&dir)
        .arg("valid_eur_three.txt")
        .write_stdin("get_field transaction currency 3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded successfully"))
        .stdout(predicate::str::contains("EUR"));
}

#[test]
fn test_add_transaction_updates_file() {
    let dir = data_dir_with("valid_usd.txt");
    editor(&dir)
        .write_stdin("load valid_usd.txt\nadd_transaction 50\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added transaction 000002"));

    let saved = fs::read_to_string(dir.path().join("valid_usd.txt")).unwrap();
    let last = saved.lines().last().unwrap();
    assert!(last.starts_with("03000002000000150.00"));
    assert_eq!(last.len(), 120);
}

#[test]
fn test_invalid_currency_is_reported() {
    let dir = data_dir_with("invalid_currency.txt");
    editor(&dir)
        .write_stdin("load invalid_currency.txt\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid currency in the first transaction"));
}

#[test]
fn test_short_line_is_reported() {
    let dir = data_dir_with("short_line.txt");
    editor(&dir)
        .write_stdin("load short_line.txt\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Each line must be exactly 120 characters long"));
}

#[test]
fn test_lock_persists_between_runs() {
    let dir = data_dir_with("valid_usd.txt");
    editor(&dir)
        .write_stdin("lock header name\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("is now locked"));

    let original = fs::read_to_string(dir.path().join("valid_usd.txt")).unwrap();
    editor(&dir)
        .write_stdin("load valid_usd.txt\nset_field header name Jane\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("locked and cannot be modified"));
    assert_eq!(
        fs::read_to_string(dir.path().join("valid_usd.txt")).unwrap(),
        original
    );
}

#[test]
fn test_malformed_lock_config_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lock_config.json"), "[1, 2").unwrap();
    editor(&dir)
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid lock configuration"));
}
