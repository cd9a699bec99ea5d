//! CSV backup and restore.
//!
//! A backup is a pair of files derived from one base path: writing to
//! `team.csv` produces `team_accounts.csv` and `team_pages.csv`. Restore
//! reads the same pair and hands both tables to
//! [`Storage::wipe_and_restore`], which validates headers before any
//! data is touched.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::model::{ItemKind, RestoreTable};
use crate::storage::Storage;

/// Derive the paired file paths from a base path. A `.csv` extension or
/// an existing `_accounts.csv` suffix on the base is stripped first, so
/// pointing restore at the accounts file itself also works.
pub fn backup_paths(base: &Path) -> (PathBuf, PathBuf) {
    let base_str = base.to_string_lossy();
    let stem = base_str
        .strip_suffix("_accounts.csv")
        .or_else(|| base_str.strip_suffix("_pages.csv"))
        .or_else(|| base_str.strip_suffix(".csv"))
        .unwrap_or(&base_str);
    (
        PathBuf::from(format!("{stem}_accounts.csv")),
        PathBuf::from(format!("{stem}_pages.csv")),
    )
}

/// Export all active records to the paired CSV files.
pub fn write_backup(storage: &Storage, base: &Path) -> Result<(PathBuf, PathBuf)> {
    let (accounts_path, pages_path) = backup_paths(base);
    write_table(&accounts_path, &storage.export_rows(ItemKind::Account)?)?;
    write_table(&pages_path, &storage.export_rows(ItemKind::Page)?)?;
    info!(
        accounts = %accounts_path.display(),
        pages = %pages_path.display(),
        "Backup written"
    );
    Ok((accounts_path, pages_path))
}

fn write_table(path: &Path, table: &RestoreTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the paired CSV files back into restore tables.
pub fn read_backup(base: &Path) -> Result<(RestoreTable, RestoreTable)> {
    let (accounts_path, pages_path) = backup_paths(base);
    Ok((read_table(&accounts_path)?, read_table(&pages_path)?))
}

fn read_table(path: &Path) -> Result<RestoreTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RestoreTable { headers, rows })
}

/// Wipe the database and replace its contents from a backup pair.
pub fn restore_backup(storage: &mut Storage, base: &Path) -> Result<()> {
    let (accounts, pages) = read_backup(base)?;
    storage.wipe_and_restore(&accounts, &pages)
}
