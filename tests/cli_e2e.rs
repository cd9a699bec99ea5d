//! End-to-end CLI tests for pagedesk.
//!
//! These tests run the actual pagedesk binary and verify:
//! - Command-line interface behavior
//! - Output format and content
//! - Error handling and messages
//! - Integration between all components
//!
//! # Test Organization
//!
//! Tests are organized by command:
//! - `test_account_*` - Account command tests
//! - `test_page_*` - Page command tests
//! - `test_bin_*` - Recycle bin tests
//! - `test_backup_*` - Backup and restore tests
//! - `test_cli_*` - General CLI tests (flags, help, version)

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

/// Log a test event with timestamp
macro_rules! test_log {
    ($($arg:tt)*) => {
        let timestamp = chrono::Utc::now().format("%H:%M:%S%.3f");
        eprintln!("[TEST {}] {}", timestamp, format!($($arg)*));
    };
}

/// Get the pagedesk command ready for testing
fn pagedesk_cmd(db_path: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("pagedesk");
    cmd.arg("--db").arg(db_path);
    cmd
}

/// Create a fresh database directory and path
fn fresh_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    (dir, db_path)
}

/// Add one account and return nothing; panics on failure
fn add_account(db_path: &Path, profile_id: &str, name: &str) {
    pagedesk_cmd(db_path)
        .args(["account", "add", profile_id, name])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account added"));
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_cli_help() {
    test_log!("Starting test_cli_help");
    let start = Instant::now();

    let mut cmd = cargo_bin_cmd!("pagedesk");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pagedesk"))
        .stdout(predicate::str::contains("Usage"));

    test_log!("test_cli_help completed in {:?}", start.elapsed());
}

#[test]
fn test_cli_version() {
    test_log!("Starting test_cli_version");
    let start = Instant::now();

    let mut cmd = cargo_bin_cmd!("pagedesk");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pagedesk"));

    test_log!("test_cli_version completed in {:?}", start.elapsed());
}

#[test]
fn test_cli_invalid_command() {
    test_log!("Starting test_cli_invalid_command");
    let start = Instant::now();

    let mut cmd = cargo_bin_cmd!("pagedesk");
    cmd.arg("nonexistent_command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error").or(predicate::str::contains("unrecognized")));

    test_log!("test_cli_invalid_command completed in {:?}", start.elapsed());
}

// =============================================================================
// Account Command Tests
// =============================================================================

#[test]
fn test_account_add_and_list() {
    test_log!("Starting test_account_add_and_list");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    pagedesk_cmd(&db_path)
        .args(["account", "add", "FB-001", "cooking with sara", "--category", "food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account added"));

    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FB-001"))
        .stdout(predicate::str::contains("Cooking With Sara"))
        .stdout(predicate::str::contains("Food"));

    test_log!("test_account_add_and_list completed in {:?}", start.elapsed());
}

#[test]
fn test_account_add_duplicate_fails() {
    test_log!("Starting test_account_add_duplicate_fails");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "first");

    pagedesk_cmd(&db_path)
        .args(["account", "add", "FB-001", "second"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    test_log!(
        "test_account_add_duplicate_fails completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_account_edit_and_show() {
    test_log!("Starting test_account_edit_and_show");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "original name");

    pagedesk_cmd(&db_path)
        .args(["account", "edit", "1", "--category", "gaming", "--proxy", "10.0.0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    pagedesk_cmd(&db_path)
        .args(["account", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Original Name"))
        .stdout(predicate::str::contains("Gaming"))
        .stdout(predicate::str::contains("10.0.0.1"))
        .stdout(predicate::str::contains("Details Updated"));

    test_log!("test_account_edit_and_show completed in {:?}", start.elapsed());
}

#[test]
fn test_account_edit_without_flags_fails() {
    test_log!("Starting test_account_edit_without_flags_fails");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "name");

    pagedesk_cmd(&db_path)
        .args(["account", "edit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to change"));

    test_log!(
        "test_account_edit_without_flags_fails completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_account_import_skips_duplicates() {
    test_log!("Starting test_account_import_skips_duplicates");
    let start = Instant::now();

    let (dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "existing");

    let csv_path = dir.path().join("import.csv");
    fs::write(
        &csv_path,
        "profile_id,account_name,account_category\n\
         FB-001,shadow,\n\
         FB-002,fresh one,travel\n",
    )
    .expect("Failed to write import csv");

    pagedesk_cmd(&db_path)
        .args(["account", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 of 2"));

    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fresh One"))
        .stdout(predicate::str::contains("Existing"));

    test_log!(
        "test_account_import_skips_duplicates completed in {:?}",
        start.elapsed()
    );
}

// =============================================================================
// Page Command Tests
// =============================================================================

#[test]
fn test_page_add_and_list() {
    test_log!("Starting test_page_add_and_list");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "owner");

    pagedesk_cmd(&db_path)
        .args(["page", "add", "daily recipes", "--account", "fb-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Page added"));

    pagedesk_cmd(&db_path)
        .args(["page", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily Recipes"))
        .stdout(predicate::str::contains("FB-001"));

    test_log!("test_page_add_and_list completed in {:?}", start.elapsed());
}

#[test]
fn test_page_add_unknown_account_fails() {
    test_log!("Starting test_page_add_unknown_account_fails");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    pagedesk_cmd(&db_path)
        .args(["page", "add", "orphan", "--account", "FB-404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no account with profile id"));

    test_log!(
        "test_page_add_unknown_account_fails completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_page_use_folder_deduplicates() {
    test_log!("Starting test_page_use_folder_deduplicates");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "owner");
    pagedesk_cmd(&db_path)
        .args(["page", "add", "my page", "--account", "FB-001"])
        .assert()
        .success();

    pagedesk_cmd(&db_path)
        .args(["page", "use-folder", "1", "batch-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded folder 'batch-01'"));

    pagedesk_cmd(&db_path)
        .args(["page", "use-folder", "1", "batch-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already recorded"));

    pagedesk_cmd(&db_path)
        .args(["page", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("batch-01").count(1));

    test_log!(
        "test_page_use_folder_deduplicates completed in {:?}",
        start.elapsed()
    );
}

// =============================================================================
// Bulk Edit Tests
// =============================================================================

#[test]
fn test_bulk_edit_applies_jsonl_updates() {
    test_log!("Starting test_bulk_edit_applies_jsonl_updates");
    let start = Instant::now();

    let (dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");
    add_account(&db_path, "FB-002", "beta");

    let jsonl_path = dir.path().join("updates.jsonl");
    fs::write(
        &jsonl_path,
        "{\"account_id\": 1, \"account_category\": \"gaming\"}\n\
         {\"account_id\": 2, \"proxy\": \"1.2.3.4\"}\n",
    )
    .expect("Failed to write updates file");

    pagedesk_cmd(&db_path)
        .args(["bulk-edit", "account"])
        .arg(&jsonl_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 2 records"));

    pagedesk_cmd(&db_path)
        .args(["account", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gaming"))
        .stdout(predicate::str::contains("Bulk Updated"));

    test_log!(
        "test_bulk_edit_applies_jsonl_updates completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_bulk_edit_unknown_id_rolls_back() {
    test_log!("Starting test_bulk_edit_unknown_id_rolls_back");
    let start = Instant::now();

    let (dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");

    let jsonl_path = dir.path().join("updates.jsonl");
    fs::write(
        &jsonl_path,
        "{\"account_id\": 1, \"account_category\": \"gaming\"}\n\
         {\"account_id\": 999, \"account_category\": \"ghost\"}\n",
    )
    .expect("Failed to write updates file");

    pagedesk_cmd(&db_path)
        .args(["bulk-edit", "account"])
        .arg(&jsonl_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    // The first line's update must not have been kept.
    pagedesk_cmd(&db_path)
        .args(["account", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gaming").not());

    test_log!(
        "test_bulk_edit_unknown_id_rolls_back completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_quick_edit_many_ids() {
    test_log!("Starting test_quick_edit_many_ids");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");
    add_account(&db_path, "FB-002", "beta");

    pagedesk_cmd(&db_path)
        .args(["quick-edit", "account", "account_category", "travel", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 2 records"));

    pagedesk_cmd(&db_path)
        .args(["account", "show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Travel"))
        .stdout(predicate::str::contains("Quick Updated"));

    test_log!("test_quick_edit_many_ids completed in {:?}", start.elapsed());
}

#[test]
fn test_quick_edit_unknown_column_fails() {
    test_log!("Starting test_quick_edit_unknown_column_fails");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");

    pagedesk_cmd(&db_path)
        .args(["quick-edit", "account", "password", "x", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown account column"));

    test_log!(
        "test_quick_edit_unknown_column_fails completed in {:?}",
        start.elapsed()
    );
}

// =============================================================================
// Recycle Bin Tests
// =============================================================================

#[test]
fn test_bin_delete_restore_cycle() {
    test_log!("Starting test_bin_delete_restore_cycle");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");

    pagedesk_cmd(&db_path)
        .args(["delete", "account", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recycle bin"));

    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No accounts found"));

    pagedesk_cmd(&db_path)
        .args(["bin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FB-001"));

    pagedesk_cmd(&db_path)
        .args(["bin", "restore", "account", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1"));

    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha"))
        .stdout(predicate::str::contains("Restored"));

    test_log!(
        "test_bin_delete_restore_cycle completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_bin_purge_requires_confirmation() {
    test_log!("Starting test_bin_purge_requires_confirmation");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");
    pagedesk_cmd(&db_path)
        .args(["page", "add", "my page", "--account", "FB-001"])
        .assert()
        .success();

    // Without --yes nothing is deleted, the warning names the cascade.
    pagedesk_cmd(&db_path)
        .args(["bin", "purge", "--account", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 linked page(s)"))
        .stdout(predicate::str::contains("--yes"));

    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FB-001"));

    // With --yes the account and its page are gone.
    pagedesk_cmd(&db_path)
        .args(["bin", "purge", "--account", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Permanently deleted"));

    pagedesk_cmd(&db_path)
        .args(["page", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pages found"));

    test_log!(
        "test_bin_purge_requires_confirmation completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_delete_unknown_id_fails() {
    test_log!("Starting test_delete_unknown_id_fails");
    let start = Instant::now();

    let (_dir, db_path) = fresh_db();
    pagedesk_cmd(&db_path)
        .args(["delete", "account", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    test_log!("test_delete_unknown_id_fails completed in {:?}", start.elapsed());
}

// =============================================================================
// Backup and Restore Tests
// =============================================================================

#[test]
fn test_backup_restore_round_trip() {
    test_log!("Starting test_backup_restore_round_trip");
    let start = Instant::now();

    let (dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");
    pagedesk_cmd(&db_path)
        .args(["page", "add", "my page", "--account", "FB-001"])
        .assert()
        .success();

    let base = dir.path().join("backup");
    pagedesk_cmd(&db_path)
        .args(["backup"])
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("backup_accounts.csv"))
        .stdout(predicate::str::contains("backup_pages.csv"));

    // Diverge, then restore over it.
    add_account(&db_path, "FB-999", "straggler");

    // Restore without --yes only warns.
    pagedesk_cmd(&db_path)
        .args(["restore"])
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));

    pagedesk_cmd(&db_path)
        .args(["restore"])
        .arg(&base)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete"));

    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FB-001"))
        .stdout(predicate::str::contains("FB-999").not());

    pagedesk_cmd(&db_path)
        .args(["page", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("My Page"));

    test_log!(
        "test_backup_restore_round_trip completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_backup_defaults_to_configured_directory() {
    test_log!("Starting test_backup_defaults_to_configured_directory");
    let start = Instant::now();

    let (dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");

    let backup_dir = dir.path().join("backups");
    pagedesk_cmd(&db_path)
        .args(["backup"])
        .env("PAGEDESK_BACKUP_DIR", &backup_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup written"));

    let written: Vec<_> = std::fs::read_dir(&backup_dir)
        .expect("backup directory should exist")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written.len(), 2);
    assert!(written.iter().any(|n| n.ends_with("_accounts.csv")));
    assert!(written.iter().any(|n| n.ends_with("_pages.csv")));

    // Without a path or a configured directory the command refuses.
    pagedesk_cmd(&db_path)
        .args(["backup"])
        .env_remove("PAGEDESK_BACKUP_DIR")
        .assert()
        .failure()
        .stderr(predicate::str::contains("backup_dir"));

    test_log!(
        "test_backup_defaults_to_configured_directory completed in {:?}",
        start.elapsed()
    );
}

#[test]
fn test_restore_missing_backup_fails() {
    test_log!("Starting test_restore_missing_backup_fails");
    let start = Instant::now();

    let (dir, db_path) = fresh_db();
    add_account(&db_path, "FB-001", "alpha");

    pagedesk_cmd(&db_path)
        .args(["restore"])
        .arg(dir.path().join("nope"))
        .arg("--yes")
        .assert()
        .failure();

    // The database was not wiped.
    pagedesk_cmd(&db_path)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FB-001"));

    test_log!(
        "test_restore_missing_backup_fails completed in {:?}",
        start.elapsed()
    );
}

// =============================================================================
// Completions Tests
// =============================================================================

#[test]
fn test_completions_bash() {
    test_log!("Starting test_completions_bash");
    let start = Instant::now();

    let mut cmd = cargo_bin_cmd!("pagedesk");
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pagedesk"));

    test_log!("test_completions_bash completed in {:?}", start.elapsed());
}
