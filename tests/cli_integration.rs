//! CLI integration tests for wattlog
//!
//! These tests drive the binary end-to-end against a throwaway database,
//! covering the meter and reading lifecycle and the consumption report.

use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance pointed at a test database
fn wattlog_cmd(db: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("wattlog"));
    cmd.env("WATTLOG_DB", db);
    cmd
}

/// Create a temporary directory holding the test database
fn setup_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("wattlog.db");
    (dir, db)
}

/// Create the MainMeter scenario: 42 ct/kWh, readings 1000 and 1100
fn setup_main_meter(db: &Path) {
    wattlog_cmd(db)
        .args(["meter", "add", "MainMeter", "--price", "42"])
        .assert()
        .success();
    wattlog_cmd(db)
        .args(["reading", "add", "MainMeter", "1000", "--at", "2023-01-01"])
        .assert()
        .success();
    wattlog_cmd(db)
        .args(["reading", "add", "MainMeter", "1100", "--at", "2023-02-01"])
        .assert()
        .success();
}

// =============================================================================
// Meter Tests
// =============================================================================

#[test]
fn test_meter_add_creates_meter() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "Main", "--price", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created meter 1: Main"));

    wattlog_cmd(&db)
        .args(["meter", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Main"));
}

#[test]
fn test_meter_add_rejects_blank_name() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "  ", "--price", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("blank"));
}

#[test]
fn test_meter_add_rejects_non_positive_price() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "Main", "--price", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn test_meter_edit_updates_in_place() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "Main", "--price", "42"])
        .assert()
        .success();

    wattlog_cmd(&db)
        .args(["meter", "edit", "Main", "--name", "Cellar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cellar"));

    // Still exactly one meter, renamed
    let output = wattlog_cmd(&db)
        .args(["meter", "list", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let meters: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(meters.as_array().unwrap().len(), 1);
    assert_eq!(meters[0]["name"], "Cellar");
    assert_eq!(meters[0]["id"], 1);
}

#[test]
fn test_meter_rm_requires_force_with_readings() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    wattlog_cmd(&db)
        .args(["meter", "rm", "MainMeter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    wattlog_cmd(&db)
        .args(["meter", "rm", "MainMeter", "--force"])
        .assert()
        .success();

    // The meter and all of its readings are gone
    let output = wattlog_cmd(&db)
        .args(["meter", "list", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let meters: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(meters.as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_meter_fails() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "show", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No meter matches"));
}

// =============================================================================
// Reading Tests
// =============================================================================

#[test]
fn test_reading_add_reports_assigned_id() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "Main", "--price", "42"])
        .assert()
        .success();

    let output = wattlog_cmd(&db)
        .args([
            "reading", "add", "Main", "1000", "--at", "2023-01-01", "--format", "json",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let reading: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(reading["id"], 1);
    assert_eq!(reading["value"], 1000);
}

#[test]
fn test_reading_add_rejects_negative_value() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "Main", "--price", "42"])
        .assert()
        .success();

    wattlog_cmd(&db)
        .args(["reading", "add", "Main", "--", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("negative"));
}

#[test]
fn test_reading_edit_changes_value() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    wattlog_cmd(&db)
        .args(["reading", "edit", "MainMeter", "2", "--value", "1050"])
        .assert()
        .success();

    wattlog_cmd(&db)
        .args(["meter", "show", "MainMeter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1050 kWh"));
}

#[test]
fn test_reading_rm_removes_exactly_that_reading() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    wattlog_cmd(&db)
        .args(["reading", "rm", "MainMeter", "1"])
        .assert()
        .success();

    let show = wattlog_cmd(&db)
        .args(["meter", "show", "MainMeter"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&show.get_output().stdout);
    assert!(!stdout.contains("1000 kWh"));
    assert!(stdout.contains("1100 kWh"));
}

// =============================================================================
// Consumption Tests
// =============================================================================

#[test]
fn test_consumption_for_latest_reading() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    wattlog_cmd(&db)
        .args(["consumption", "MainMeter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Consumption: 100 kWh"))
        .stdout(predicate::str::contains("0.42"))
        .stdout(predicate::str::contains("42.00"));
}

#[test]
fn test_consumption_for_first_reading_is_zero() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    let output = wattlog_cmd(&db)
        .args(["consumption", "MainMeter", "1", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let derived: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(derived["delta"], 0);
    assert_eq!(derived["cost"], 0.0);
    // The first reading resolves to itself
    assert_eq!(derived["previous_id"], 1);
}

#[test]
fn test_consumption_json_matches_scenario() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    let output = wattlog_cmd(&db)
        .args(["consumption", "MainMeter", "2", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let derived: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(derived["delta"], 100);
    assert_eq!(derived["unit_price"], 0.42);
    assert!((derived["cost"].as_f64().unwrap() - 42.0).abs() < 1e-9);
    assert_eq!(derived["previous_id"], 1);
}

#[test]
fn test_consumption_without_readings_fails() {
    let (_dir, db) = setup_db();

    wattlog_cmd(&db)
        .args(["meter", "add", "Empty", "--price", "42"])
        .assert()
        .success();

    wattlog_cmd(&db)
        .args(["consumption", "Empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no readings"));
}

// =============================================================================
// Overview Tests
// =============================================================================

#[test]
fn test_tree_shows_meters_and_readings() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    wattlog_cmd(&db)
        .args(["tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MainMeter"))
        .stdout(predicate::str::contains("1000 kWh"))
        .stdout(predicate::str::contains("1100 kWh"));
}

#[test]
fn test_tree_json_nests_readings() {
    let (_dir, db) = setup_db();
    setup_main_meter(&db);

    let output = wattlog_cmd(&db).args(["tree", "--format", "json"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let meters: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(meters.as_array().unwrap().len(), 1);
    let readings = meters[0]["readings"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[1]["delta"], 100);
}
