//! CLI Integration Tests
//!
//! Tests the CLI binary directly using assert_cmd to exercise main.rs code paths.

// Skip CLI tests during coverage builds
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_fixture(path: &Path) {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.merge_range(0, 0, 1, 0, "Region", &Format::new()).unwrap();
    sheet.write_string(1, 1, "Sales").unwrap();
    sheet.write_string(2, 0, "North").unwrap();
    sheet.write_number(2, 1, 100.0).unwrap();
    book.save(path).unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// ═══════════════════════════════════════════════════════════════════════════
// USAGE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_without_argument_exits_1_silently() {
    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheet-flatten"))
        .stdout(predicate::str::contains("merged"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheet-flatten"));
}

// ═══════════════════════════════════════════════════════════════════════════
// PROCESSING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_processes_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("sales.xlsx");
    write_fixture(&input);

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("sales_unmerged.xlsx"))
        .stdout(predicate::str::contains("Flattened table saved"))
        .stdout(predicate::str::contains("North"));

    let names = file_names(temp_dir.path());
    assert_eq!(names.len(), 3, "unexpected files: {:?}", names);
    assert!(names.contains(&"sales_unmerged.xlsx".to_string()));

    let pattern = Regex::new(r"^sales_処理済_\d{8}-\d{6}\.xlsx$").unwrap();
    assert!(names.iter().any(|n| pattern.is_match(n)), "files: {:?}", names);
}

#[test]
fn test_cli_discard_intermediate() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("sales.xlsx");
    write_fixture(&input);

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .arg("--discard-intermediate")
        .assert()
        .success();

    let names = file_names(temp_dir.path());
    assert_eq!(names.len(), 2, "unexpected files: {:?}", names);
    assert!(!names.contains(&"sales_unmerged.xlsx".to_string()));
}

#[test]
fn test_cli_preview_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("sales.xlsx");
    write_fixture(&input);

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .args(["--preview-rows", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("North").not());
}

#[test]
fn test_cli_preview_rows_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("sales.xlsx");
    write_fixture(&input);

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .env("SHEET_FLATTEN_PREVIEW_ROWS", "0")
        .assert()
        .success()
        .stdout(predicate::str::contains("North").not());
}

#[test]
fn test_cli_verbose() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("sales.xlsx");
    write_fixture(&input);

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 merged range(s) dissolved"));
}

// ═══════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(temp_dir.path().join("absent.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("data.csv");
    fs::write(&input, "a,b\n").unwrap();

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported spreadsheet extension"));
}

#[test]
fn test_cli_header_only_sheet_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("one.xlsx");
    let mut book = Workbook::new();
    book.add_worksheet().write_string(0, 0, "only").unwrap();
    book.save(&input).unwrap();

    let mut cmd = Command::cargo_bin("sheet-flatten").unwrap();
    cmd.arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no rows"));
}
