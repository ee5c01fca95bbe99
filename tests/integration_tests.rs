//! Integration tests for the stocktake CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a stocktake command
fn stocktake() -> Command {
    Command::cargo_bin("stocktake").unwrap()
}

/// Write a CSV fixture into a temp dir and return (dir, path)
fn write_csv(name: &str, contents: &str) -> (TempDir, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    fs::write(&path, contents).unwrap();
    (tmp, path)
}

const VALID_CSV: &str = "\
Serial Number,Asset Tag,Item,Project Ref\n\
SN-001,TAG-001,Laptop,PRJ-1\n\
SN-002,TAG-002,Monitor,PRJ-1\n";

const INVALID_CSV: &str = "\
Serial Number,Asset Tag,Item,Project Ref\n\
SN-001,TAG-001,Laptop,PRJ-1\n\
,,Monitor,PRJ-1\n";

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    stocktake()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inventory assets"));
}

#[test]
fn test_version_displays() {
    stocktake()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stocktake"));
}

#[test]
fn test_unknown_command_fails() {
    stocktake().arg("unknown-command").assert().failure();
}

// ============================================================================
// Template and Fields
// ============================================================================

#[test]
fn test_template_prints_canonical_headers() {
    stocktake()
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "serial_number,tag_id,project_reference_num",
        ))
        .stdout(predicate::str::contains("peripheral_name,serial_code"));
}

#[test]
fn test_template_headers_only_omits_example() {
    stocktake()
        .args(["template", "--headers-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SN-0001").not());
}

#[test]
fn test_fields_lists_vocabulary() {
    stocktake()
        .arg("fields")
        .assert()
        .success()
        .stdout(predicate::str::contains("serial_number"))
        .stdout(predicate::str::contains("customer_reference_number"));
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_passes_clean_file() {
    let (_tmp, path) = write_csv("assets.csv", VALID_CSV);
    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("All records valid"));
}

#[test]
fn test_check_fails_on_missing_required_values() {
    let (_tmp, path) = write_csv("assets.csv", INVALID_CSV);
    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid record"));
}

#[test]
fn test_check_fails_when_required_column_absent() {
    let (_tmp, path) = write_csv("assets.csv", "Serial Number,Asset Tag,Item\nS1,T1,Laptop\n");
    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("project_reference_num"));
}

#[test]
fn test_check_reports_unrecognized_columns() {
    let (_tmp, path) = write_csv(
        "assets.csv",
        "Serial Number,Asset Tag,Item,Project Ref,Mystery\nS1,T1,Laptop,P1,x\n",
    );
    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mystery"));
}

#[test]
fn test_check_exports_failed_records() {
    let (tmp, path) = write_csv("assets.csv", INVALID_CSV);
    let failed = tmp.path().join("failed.csv");

    stocktake()
        .arg("check")
        .arg(&path)
        .arg("--export-failed")
        .arg(&failed)
        .assert()
        .failure();

    let contents = fs::read_to_string(&failed).unwrap();
    assert!(contents.lines().next().unwrap().ends_with(",errors"));
    assert!(contents.contains("Missing required field"));
    // Only the failing row is exported
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn test_check_consolidates_duplicate_rows() {
    let csv = "\
Serial Number,Asset Tag,Item,Project Ref,Peripheral,Serial Code\n\
SN-001,TAG-001,Laptop,PRJ-1,Mouse,M1\n\
SN-001,TAG-001,Laptop,PRJ-1,Keyboard,K1\n";
    let (_tmp, path) = write_csv("assets.csv", csv);

    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 unique asset"));
}

#[test]
fn test_check_empty_file_is_an_error() {
    let (_tmp, path) = write_csv("assets.csv", "Serial Number,Asset Tag\n");
    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data rows"));
}

#[test]
fn test_check_rejects_unsupported_extension() {
    let (_tmp, path) = write_csv("assets.pdf", VALID_CSV);
    stocktake()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

// ============================================================================
// Import (dry-run; the pre-check degrades gracefully when unreachable)
// ============================================================================

#[test]
fn test_import_dry_run_glides_through_clean_file() {
    let (_tmp, path) = write_csv("assets.csv", VALID_CSV);
    stocktake()
        .arg("import")
        .arg(&path)
        .args(["--dry-run", "--yes", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));
}

#[test]
fn test_import_yes_cancels_when_required_column_missing() {
    let (_tmp, path) = write_csv("assets.csv", "Serial Number,Asset Tag,Item\nS1,T1,Laptop\n");
    stocktake()
        .arg("import")
        .arg(&path)
        .args(["--dry-run", "--yes", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cancelled"));
}

#[test]
fn test_import_api_url_from_environment() {
    let (_tmp, path) = write_csv("assets.csv", VALID_CSV);
    stocktake()
        .arg("import")
        .arg(&path)
        .args(["--dry-run", "--yes"])
        .env("STOCKTAKE_API_URL", "http://127.0.0.1:9")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));
}

#[test]
fn test_import_limit_caps_processed_rows() {
    let (_tmp, path) = write_csv("assets.csv", VALID_CSV);
    stocktake()
        .arg("import")
        .arg(&path)
        .args(["--dry-run", "--yes", "--limit", "1", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:      1"));
}

#[test]
fn test_import_missing_file_fails() {
    stocktake()
        .args(["import", "/nonexistent/assets.csv", "--yes", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_import_dry_run_exports_failed_records() {
    let (tmp, path) = write_csv("assets.csv", INVALID_CSV);
    let failed = tmp.path().join("failed.csv");

    stocktake()
        .arg("import")
        .arg(&path)
        .args(["--dry-run", "--yes", "--api-url", "http://127.0.0.1:9"])
        .arg("--export-failed")
        .arg(&failed)
        .assert()
        .success();

    assert!(failed.exists());
    let contents = fs::read_to_string(&failed).unwrap();
    assert!(contents.contains("Missing required field"));
}
