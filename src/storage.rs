//! `SQLite` storage and record lifecycle rules for accounts and pages.
//!
//! This module is the sole authority for validating, normalizing, and
//! committing mutations, and for the soft-delete / restore / hard-delete
//! pipeline. Accounts own pages; permanently deleting an account cascades to
//! its pages at the schema level, while soft delete deliberately does not.

use crate::error::{PagedeskError, Result};
use crate::model::{
    Account, AccountEdit, AccountField, AccountFilter, AccountUpdate, BulkPageRow, DATE_FORMAT,
    DeletedItem, FieldValue, ImportRecord, ItemKind, NewAccount, NewPage, Page, PageField,
    PageFilter, PageListing, PageUpdate, RestoreTable, Status,
};
use crate::normalize::normalize;
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, Transaction, params, params_from_iter};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info};

const SCHEMA_VERSION: i32 = 1;

/// Column order used for reads, exports, and restore validation.
pub const ACCOUNT_COLUMNS: [&str; 11] = [
    "account_id",
    "profile_id",
    "account_name",
    "uid",
    "account_category",
    "status",
    "monetization",
    "proxy",
    "proxy_location",
    "is_deleted",
    "note",
];

pub const PAGE_COLUMNS: [&str; 22] = [
    "page_id",
    "page_name",
    "uid_page_id",
    "category",
    "content_folder",
    "used_folders",
    "video_schedule_date",
    "video_posts_per_day",
    "reels_schedule_date",
    "reels_posts_per_day",
    "photo_schedule_date",
    "photo_posts_per_day",
    "note",
    "status",
    "monetization",
    "is_deleted",
    "linked_account_id",
    "video_folder",
    "reels_folder",
    "photo_folder",
    "followers",
    "last_interaction",
];

const ACCOUNT_SEARCH_COLUMNS: [&str; 9] = [
    "profile_id",
    "account_name",
    "uid",
    "account_category",
    "status",
    "monetization",
    "proxy",
    "proxy_location",
    "note",
];

const PAGE_SEARCH_COLUMNS: [&str; 8] = [
    "a.profile_id",
    "p.page_name",
    "p.uid_page_id",
    "p.category",
    "p.note",
    "p.followers",
    "p.last_interaction",
    "a.account_name",
];

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
}

fn parse_folder_list(value: Option<String>) -> Vec<String> {
    // Legacy rows may hold an empty string instead of a JSON array.
    value
        .filter(|s| !s.is_empty())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

const fn empty_to_null(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Title-case text values destined for a title-cased column; other value
/// kinds pass through unchanged.
fn normalized_value(field_is_title_cased: bool, value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) if field_is_title_cased => FieldValue::Text(normalize(s)),
        other => other.clone(),
    }
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

/// `SQLite` storage manager.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref()).map_err(|e| {
            error!("Database connection error: {e}");
            PagedeskError::Connection {
                path: db_path.as_ref().to_path_buf(),
            }
        })?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be initialized.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    // =========================================================================
    // Schema
    // =========================================================================

    fn migrate(&self) -> Result<()> {
        let current_version = self.get_schema_version();

        if current_version < SCHEMA_VERSION {
            info!(
                "Migrating database from version {} to {}",
                current_version, SCHEMA_VERSION
            );
            self.create_schema()?;
            self.ensure_late_columns()?;
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> i32 {
        let result: rusqlite::Result<i32> = self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| {
                let value: String = row.get(0)?;
                Ok(value.parse().unwrap_or(0))
            },
        );

        // Missing meta table means a pre-versioning or fresh database.
        result.unwrap_or_default()
    }

    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![version.to_string()],
        )?;
        Ok(())
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS accounts (
                account_id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id TEXT NOT NULL UNIQUE,
                account_name TEXT NOT NULL,
                uid TEXT UNIQUE,
                account_category TEXT,
                status TEXT,
                monetization TEXT,
                proxy TEXT,
                proxy_location TEXT,
                is_deleted INTEGER DEFAULT 0,
                note TEXT DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS pages (
                page_id INTEGER PRIMARY KEY AUTOINCREMENT,
                page_name TEXT NOT NULL,
                uid_page_id TEXT,
                category TEXT,
                content_folder TEXT,
                used_folders TEXT,
                video_schedule_date TEXT,
                video_posts_per_day INTEGER,
                reels_schedule_date TEXT,
                reels_posts_per_day INTEGER,
                photo_schedule_date TEXT,
                photo_posts_per_day INTEGER,
                note TEXT,
                status TEXT,
                monetization TEXT,
                is_deleted INTEGER DEFAULT 0,
                linked_account_id INTEGER NOT NULL,
                video_folder TEXT,
                reels_folder TEXT,
                photo_folder TEXT,
                followers TEXT,
                last_interaction TEXT,
                FOREIGN KEY (linked_account_id) REFERENCES accounts (account_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_profile_id ON accounts (profile_id);
            CREATE INDEX IF NOT EXISTS idx_pages_linked_account_id ON pages (linked_account_id);
            ",
        )?;

        Ok(())
    }

    /// Add columns that older databases predate. `CREATE TABLE IF NOT EXISTS`
    /// leaves an existing table untouched, so these are patched in here.
    fn ensure_late_columns(&self) -> Result<()> {
        let account_columns = self.table_columns("accounts")?;
        if !account_columns.iter().any(|c| c == "note") {
            self.conn
                .execute("ALTER TABLE accounts ADD COLUMN note TEXT DEFAULT ''", [])?;
        }

        let page_columns = self.table_columns("pages")?;
        for column in [
            "video_folder",
            "reels_folder",
            "photo_folder",
            "followers",
            "last_interaction",
        ] {
            if !page_columns.iter().any(|c| c == column) {
                self.conn
                    .execute(&format!("ALTER TABLE pages ADD COLUMN {column} TEXT"), [])?;
            }
        }

        Ok(())
    }

    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Create an account. Fails with a `Duplicate` error when the profile id
    /// or a non-empty uid already exists, before anything is inserted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when profile id or name is empty, `Duplicate` on
    /// a uniqueness collision, or `Storage` on database failure.
    pub fn create_account(&self, new: &NewAccount) -> Result<i64> {
        let profile_id = new.profile_id.trim();
        let name = normalize(&new.account_name);
        if profile_id.is_empty() || name.is_empty() {
            return Err(PagedeskError::validation(
                "profile id and account name are required",
            ));
        }

        let uid = new.uid.trim();
        if let Some(field) = self.check_duplicate(profile_id, uid)? {
            return Err(PagedeskError::Duplicate { field });
        }

        let category = normalize(&new.account_category);
        self.conn.execute(
            "INSERT INTO accounts (profile_id, account_name, uid, account_category, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile_id,
                name,
                empty_to_null(uid),
                category,
                Status::Created.as_str()
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(account_id = id, profile_id, "account created");
        Ok(id)
    }

    /// Probe for uniqueness collisions ahead of an insert. Returns the name
    /// of the colliding field, if any. Comparison is case-sensitive, exactly
    /// as the storage constraints are; empty uids are never checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn check_duplicate(&self, profile_id: &str, uid: &str) -> Result<Option<&'static str>> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM accounts WHERE profile_id = ?1")?;
        if stmt.exists(params![profile_id])? {
            return Ok(Some("Profile ID"));
        }

        if !uid.is_empty() {
            let mut stmt = self.conn.prepare("SELECT 1 FROM accounts WHERE uid = ?1")?;
            if stmt.exists(params![uid])? {
                return Ok(Some("UID"));
            }
        }

        Ok(None)
    }

    /// Create a page linked to an existing account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the name is empty or `NotFound` when the
    /// linked account does not exist.
    pub fn create_page(&self, new: &NewPage) -> Result<i64> {
        let name = normalize(&new.page_name);
        if name.is_empty() {
            return Err(PagedeskError::validation("page name is required"));
        }
        if !self.account_exists(new.linked_account_id)? {
            return Err(PagedeskError::not_found("Account", new.linked_account_id));
        }

        let category = normalize(&new.category);
        self.conn.execute(
            "INSERT INTO pages (page_name, uid_page_id, category, monetization, linked_account_id, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                new.uid_page_id,
                category,
                new.monetization,
                new.linked_account_id,
                Status::Created.as_str()
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(page_id = id, account_id = new.linked_account_id, "page created");
        Ok(id)
    }

    fn account_exists(&self, account_id: i64) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM accounts WHERE account_id = ?1")?;
        Ok(stmt.exists(params![account_id])?)
    }

    /// Create many pages at once. Profile ids are resolved case-insensitively
    /// against non-deleted accounts; rows that resolve to nothing are dropped.
    /// All resolved rows are inserted in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoValidRows` when nothing resolves, or `Storage` on failure
    /// (the whole batch rolls back).
    pub fn bulk_create_pages(&mut self, rows: &[BulkPageRow]) -> Result<usize> {
        let by_profile: HashMap<String, i64> = self
            .accounts_brief()?
            .into_iter()
            .map(|(id, profile_id, _)| (profile_id.to_uppercase(), id))
            .collect();

        let resolved: Vec<(String, String, String, i64)> = rows
            .iter()
            .filter_map(|row| {
                by_profile
                    .get(&row.profile_id.trim().to_uppercase())
                    .map(|&account_id| {
                        (
                            normalize(&row.page_name),
                            row.uid_page_id.trim().to_string(),
                            normalize(&row.category),
                            account_id,
                        )
                    })
            })
            .collect();

        if resolved.is_empty() {
            return Err(PagedeskError::no_valid_rows(
                "no accounts found for the given profile ids",
            ));
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO pages (page_name, uid_page_id, category, linked_account_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (name, uid_page_id, category, account_id) in &resolved {
                stmt.execute(params![
                    name,
                    uid_page_id,
                    category,
                    account_id,
                    Status::Created.as_str()
                ])?;
            }
        }
        tx.commit()?;

        info!(count = resolved.len(), "bulk page add committed");
        Ok(resolved.len())
    }

    /// Import account records with insert-or-ignore semantics: a record
    /// colliding with an existing profile id or uid is skipped, not an error.
    /// Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns `NoValidRows` when no record carries both a profile id and a
    /// name, or `Storage` on failure (the whole batch rolls back).
    pub fn bulk_import_accounts(&mut self, records: &[ImportRecord]) -> Result<usize> {
        let processed: Vec<&ImportRecord> = records
            .iter()
            .filter(|r| !r.profile_id.trim().is_empty() && !r.account_name.trim().is_empty())
            .collect();

        if processed.is_empty() {
            return Err(PagedeskError::no_valid_rows("no records to import"));
        }

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO accounts
                 (profile_id, account_name, uid, account_category, proxy, proxy_location, monetization, status, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for record in &processed {
                let uid = record.uid.trim();
                inserted += stmt.execute(params![
                    record.profile_id.trim(),
                    normalize(&record.account_name),
                    empty_to_null(uid),
                    normalize(&record.account_category),
                    record.proxy.trim(),
                    record.proxy_location.trim(),
                    record.monetization.trim(),
                    Status::Imported.as_str(),
                    record.note.trim(),
                ])?;
            }
        }
        tx.commit()?;

        info!(
            inserted,
            skipped = processed.len() - inserted,
            "account import committed"
        );
        Ok(inserted)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replace the editable detail fields of an account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the name is empty, `NotFound` for an unknown
    /// id, or `Storage` on database failure.
    pub fn update_account(&self, account_id: i64, edit: &AccountEdit) -> Result<()> {
        let name = normalize(&edit.account_name);
        if name.is_empty() {
            return Err(PagedeskError::validation("account name is required"));
        }
        let category = normalize(&edit.account_category);

        let changed = self.conn.execute(
            "UPDATE accounts
             SET account_name = ?1, account_category = ?2, monetization = ?3,
                 proxy = ?4, proxy_location = ?5, note = ?6, status = ?7
             WHERE account_id = ?8",
            params![
                name,
                category,
                edit.monetization,
                edit.proxy,
                edit.proxy_location,
                edit.note,
                Status::DetailsUpdated.as_str(),
                account_id
            ],
        )?;

        if changed == 0 {
            return Err(PagedeskError::not_found("Account", account_id));
        }
        Ok(())
    }

    /// Apply a batch of partial account updates inside one transaction.
    /// Entries with zero changed fields are skipped; an entry targeting a
    /// nonexistent account aborts and rolls back the entire batch.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Storage`; in both cases nothing is committed.
    pub fn bulk_update_accounts_partial(&mut self, updates: &[AccountUpdate]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut applied = 0;

        for update in updates {
            if update.fields.is_empty() {
                continue;
            }
            let changed = apply_partial_update(
                &tx,
                "accounts",
                "account_id",
                update.account_id,
                &update
                    .fields
                    .iter()
                    .map(|(field, value)| {
                        (
                            field.column(),
                            normalized_value(field.is_title_cased(), value),
                        )
                    })
                    .collect::<Vec<_>>(),
                Status::BulkUpdated,
            )?;
            if changed == 0 {
                return Err(PagedeskError::not_found("Account", update.account_id));
            }
            applied += 1;
        }

        tx.commit()?;
        info!(applied, "bulk account update committed");
        Ok(applied)
    }

    /// Apply a batch of partial page updates inside one transaction, with the
    /// same all-or-nothing contract as the account variant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Storage`; in both cases nothing is committed.
    pub fn bulk_update_pages_partial(&mut self, updates: &[PageUpdate]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut applied = 0;

        for update in updates {
            if update.fields.is_empty() {
                continue;
            }
            let changed = apply_partial_update(
                &tx,
                "pages",
                "page_id",
                update.page_id,
                &update
                    .fields
                    .iter()
                    .map(|(field, value)| {
                        (
                            field.column(),
                            normalized_value(field.is_title_cased(), value),
                        )
                    })
                    .collect::<Vec<_>>(),
                Status::BulkUpdated,
            )?;
            if changed == 0 {
                return Err(PagedeskError::not_found("Page", update.page_id));
            }
            applied += 1;
        }

        tx.commit()?;
        info!(applied, "bulk page update committed");
        Ok(applied)
    }

    /// Update an arbitrary subset of page fields, including any combination
    /// of the three content-schedule triples.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty field set, `NotFound` for an unknown
    /// id, or `Storage` on database failure.
    pub fn update_page(&self, page_id: i64, fields: &[(PageField, FieldValue)]) -> Result<()> {
        if fields.is_empty() {
            return Err(PagedeskError::validation("no fields to update"));
        }

        let prepared: Vec<(&'static str, FieldValue)> = fields
            .iter()
            .map(|(field, value)| {
                (
                    field.column(),
                    normalized_value(field.is_title_cased(), value),
                )
            })
            .collect();

        let changed = apply_partial_update(
            &self.conn,
            "pages",
            "page_id",
            page_id,
            &prepared,
            Status::DetailsUpdated,
        )?;
        if changed == 0 {
            return Err(PagedeskError::not_found("Page", page_id));
        }
        Ok(())
    }

    /// Apply one field/value pair to many accounts in a single statement.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty id set or `Storage` on failure.
    pub fn quick_edit_accounts(
        &self,
        ids: &[i64],
        field: AccountField,
        value: &FieldValue,
    ) -> Result<usize> {
        self.quick_edit(
            "accounts",
            "account_id",
            ids,
            field.column(),
            normalized_value(field.is_title_cased(), value),
        )
    }

    /// Apply one field/value pair to many pages in a single statement.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty id set or `Storage` on failure.
    pub fn quick_edit_pages(
        &self,
        ids: &[i64],
        field: PageField,
        value: &FieldValue,
    ) -> Result<usize> {
        self.quick_edit(
            "pages",
            "page_id",
            ids,
            field.column(),
            normalized_value(field.is_title_cased(), value),
        )
    }

    fn quick_edit(
        &self,
        table: &str,
        id_column: &str,
        ids: &[i64],
        column: &str,
        value: FieldValue,
    ) -> Result<usize> {
        if ids.is_empty() {
            return Err(PagedeskError::validation("no ids given"));
        }

        let placeholders = (0..ids.len())
            .map(|i| format!("?{}", i + 3))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "UPDATE {table} SET {column} = ?1, status = ?2 WHERE {id_column} IN ({placeholders})"
        );

        let status = Status::QuickUpdated.as_str();
        let mut bound: Vec<&dyn ToSql> = vec![&value, &status];
        for id in ids {
            bound.push(id);
        }

        let changed = self.conn.execute(&sql, bound.as_slice())?;
        debug!(table, column, changed, "quick edit applied");
        Ok(changed)
    }

    /// Overwrite a record's note.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or `Storage` on failure.
    pub fn update_note(&self, kind: ItemKind, id: i64, note: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET note = ?1, status = ?2 WHERE {} = ?3",
            kind.table(),
            kind.id_column()
        );
        let changed = self
            .conn
            .execute(&sql, params![note, Status::NoteSaved.as_str(), id])?;
        if changed == 0 {
            return Err(PagedeskError::not_found(kind.label(), id));
        }
        Ok(())
    }

    /// Record a folder as used by a page, skipping paths already present.
    /// Returns whether the folder was appended.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown page or `Storage` on failure.
    pub fn append_used_folder(&self, page_id: i64, folder: &str) -> Result<bool> {
        let stored: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT used_folders FROM pages WHERE page_id = ?1",
                params![page_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(stored) = stored else {
            return Err(PagedeskError::not_found("Page", page_id));
        };

        let mut folders = parse_folder_list(stored);
        if folders.iter().any(|f| f == folder) {
            return Ok(false);
        }
        folders.push(folder.to_string());

        self.conn.execute(
            "UPDATE pages SET used_folders = ?1, status = ?2 WHERE page_id = ?3",
            params![
                serde_json::to_string(&folders)?,
                Status::DetailsUpdated.as_str(),
                page_id
            ],
        )?;
        Ok(true)
    }

    // =========================================================================
    // Soft delete / restore / permanent delete
    // =========================================================================

    /// Mark a record deleted without touching related records: soft-deleting
    /// an account leaves its pages active.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or `Storage` on failure.
    pub fn soft_delete(&self, kind: ItemKind, id: i64) -> Result<()> {
        self.set_deleted_flag(kind, id, true, Status::Deleted)
    }

    /// Bring a soft-deleted record back; every field except `status` and the
    /// flag is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or `Storage` on failure.
    pub fn restore(&self, kind: ItemKind, id: i64) -> Result<()> {
        self.set_deleted_flag(kind, id, false, Status::Restored)
    }

    fn set_deleted_flag(&self, kind: ItemKind, id: i64, deleted: bool, status: Status) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET is_deleted = ?1, status = ?2 WHERE {} = ?3",
            kind.table(),
            kind.id_column()
        );
        let changed = self
            .conn
            .execute(&sql, params![i32::from(deleted), status.as_str(), id])?;
        if changed == 0 {
            return Err(PagedeskError::not_found(kind.label(), id));
        }
        info!(kind = kind.label(), id, status = status.as_str(), "lifecycle flag updated");
        Ok(())
    }

    /// All soft-deleted accounts and pages, tagged by kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_deleted(&self) -> Result<Vec<DeletedItem>> {
        let mut items = Vec::new();

        let mut stmt = self.conn.prepare(
            "SELECT account_id, profile_id, account_name FROM accounts WHERE is_deleted = 1",
        )?;
        let accounts = stmt.query_map([], |row| {
            Ok(DeletedItem {
                kind: ItemKind::Account,
                id: row.get(0)?,
                display_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                detail: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        for item in accounts {
            items.push(item?);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT page_id, page_name FROM pages WHERE is_deleted = 1")?;
        let pages = stmt.query_map([], |row| {
            Ok(DeletedItem {
                kind: ItemKind::Page,
                id: row.get(0)?,
                display_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                detail: String::new(),
            })
        })?;
        for item in pages {
            items.push(item?);
        }

        Ok(items)
    }

    /// Count pages (deleted or not) linked to any of the given accounts,
    /// for warning before a permanent delete cascades.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_dependent_pages(&self, account_ids: &[i64]) -> Result<i64> {
        if account_ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; account_ids.len()].join(",");
        let sql =
            format!("SELECT COUNT(*) FROM pages WHERE linked_account_id IN ({placeholders})");
        let count = self
            .conn
            .query_row(&sql, params_from_iter(account_ids.iter()), |row| row.get(0))?;
        Ok(count)
    }

    /// Physically remove records in one transaction. Deleting an account
    /// cascades to its pages at the schema level regardless of their own
    /// soft-delete state.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on failure; nothing is committed in that case.
    pub fn permanently_delete(&mut self, items: &[(ItemKind, i64)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (kind, id) in items {
            // A selected page may already be gone via an account cascade
            // earlier in the same batch, so zero-row deletes are fine here.
            let sql = format!("DELETE FROM {} WHERE {} = ?1", kind.table(), kind.id_column());
            tx.execute(&sql, params![id])?;
        }
        tx.commit()?;
        info!(count = items.len(), "permanent delete committed");
        Ok(())
    }

    // =========================================================================
    // Restore from backup
    // =========================================================================

    /// Wipe all data and reload it from backup tables, inside one
    /// transaction: pages and accounts are deleted, identity counters reset,
    /// then accounts and pages re-inserted in that order so foreign keys
    /// resolve. Any failure leaves prior data intact.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for unknown restore columns or ragged rows, or
    /// `Storage` on database failure.
    pub fn wipe_and_restore(
        &mut self,
        accounts: &RestoreTable,
        pages: &RestoreTable,
    ) -> Result<()> {
        validate_restore_headers("accounts", &ACCOUNT_COLUMNS, accounts)?;
        validate_restore_headers("pages", &PAGE_COLUMNS, pages)?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pages", [])?;
        tx.execute("DELETE FROM accounts", [])?;

        // sqlite_sequence only exists once an AUTOINCREMENT insert happened.
        let has_sequence: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 'sqlite_sequence')",
            [],
            |row| row.get(0),
        )?;
        if has_sequence {
            tx.execute(
                "DELETE FROM sqlite_sequence WHERE name IN ('accounts', 'pages')",
                [],
            )?;
        }

        insert_restore_rows(&tx, "accounts", accounts)?;
        insert_restore_rows(&tx, "pages", pages)?;
        tx.commit()?;

        info!(
            accounts = accounts.rows.len(),
            pages = pages.rows.len(),
            "restore committed"
        );
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Non-deleted accounts matching the filter, ordered by profile id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>> {
        let mut sql = format!(
            "SELECT {} FROM accounts WHERE is_deleted = 0",
            ACCOUNT_COLUMNS.join(", ")
        );
        let mut bound: Vec<Box<dyn ToSql>> = Vec::new();

        push_account_filter(&mut sql, &mut bound, filter);
        sql.push_str(" ORDER BY profile_id");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            bound.push(Box::new(i64::try_from(limit).unwrap_or(i64::MAX)));
            bound.push(Box::new(i64::try_from(filter.offset).unwrap_or(0)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound.iter()), account_from_row)?;
        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    /// Count of non-deleted accounts matching the filter (for pagination).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_accounts(&self, filter: &AccountFilter) -> Result<i64> {
        let mut sql = "SELECT COUNT(*) FROM accounts WHERE is_deleted = 0".to_string();
        let mut bound: Vec<Box<dyn ToSql>> = Vec::new();
        push_account_filter(&mut sql, &mut bound, filter);

        let count = self
            .conn
            .query_row(&sql, params_from_iter(bound.iter()), |row| row.get(0))?;
        Ok(count)
    }

    /// Non-deleted pages joined to their non-deleted owning account, ordered
    /// by profile id then page name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_pages(&self, filter: &PageFilter) -> Result<Vec<PageListing>> {
        let page_columns = PAGE_COLUMNS
            .iter()
            .map(|c| format!("p.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "SELECT {page_columns}, a.profile_id, a.account_name
             FROM pages p JOIN accounts a ON p.linked_account_id = a.account_id
             WHERE p.is_deleted = 0 AND a.is_deleted = 0"
        );
        let mut bound: Vec<Box<dyn ToSql>> = Vec::new();

        if !filter.search.is_empty() {
            let clause = PAGE_SEARCH_COLUMNS
                .iter()
                .map(|c| format!("{c} LIKE ?"))
                .collect::<Vec<_>>()
                .join(" OR ");
            sql.push_str(&format!(" AND ({clause})"));
            let term = format!("%{}%", filter.search);
            for _ in PAGE_SEARCH_COLUMNS {
                bound.push(Box::new(term.clone()));
            }
        }
        if let Some(category) = &filter.category {
            sql.push_str(" AND p.category = ?");
            bound.push(Box::new(category.clone()));
        }
        sql.push_str(" ORDER BY a.profile_id, p.page_name");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound.iter()), |row| {
            Ok(PageListing {
                page: page_from_row(row)?,
                profile_id: row.get::<_, Option<String>>(22)?.unwrap_or_default(),
                account_name: row.get::<_, Option<String>>(23)?.unwrap_or_default(),
            })
        })?;
        let mut listings = Vec::new();
        for listing in rows {
            listings.push(listing?);
        }
        Ok(listings)
    }

    /// Fetch one account by id, including soft-deleted rows (the edit path
    /// needs them).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or `Storage` on failure.
    pub fn account_details(&self, account_id: i64) -> Result<Account> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE account_id = ?1",
            ACCOUNT_COLUMNS.join(", ")
        );
        self.conn
            .query_row(&sql, params![account_id], account_from_row)
            .optional()?
            .ok_or(PagedeskError::not_found("Account", account_id))
    }

    /// Fetch one page by id, including soft-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or `Storage` on failure.
    pub fn page_details(&self, page_id: i64) -> Result<Page> {
        let sql = format!(
            "SELECT {} FROM pages WHERE page_id = ?1",
            PAGE_COLUMNS.join(", ")
        );
        self.conn
            .query_row(&sql, params![page_id], page_from_row)
            .optional()?
            .ok_or(PagedeskError::not_found("Page", page_id))
    }

    /// `(account_id, profile_id, account_name)` of non-deleted accounts,
    /// ordered by profile id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn accounts_brief(&self) -> Result<Vec<(i64, String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_id, profile_id, account_name FROM accounts
             WHERE is_deleted = 0 ORDER BY profile_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ))
        })?;
        let mut brief = Vec::new();
        for row in rows {
            brief.push(row?);
        }
        Ok(brief)
    }

    /// Distinct non-empty account categories among non-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn unique_account_categories(&self) -> Result<Vec<String>> {
        self.distinct_values(
            "SELECT DISTINCT account_category FROM accounts
             WHERE account_category IS NOT NULL AND account_category != '' AND is_deleted = 0
             ORDER BY account_category",
        )
    }

    /// Distinct non-empty page categories among non-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn unique_page_categories(&self) -> Result<Vec<String>> {
        self.distinct_values(
            "SELECT DISTINCT category FROM pages
             WHERE category IS NOT NULL AND category != '' AND is_deleted = 0
             ORDER BY category",
        )
    }

    fn distinct_values(&self, sql: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut values = Vec::new();
        for value in rows {
            values.push(value?);
        }
        Ok(values)
    }

    /// Headers plus non-deleted rows of one table, stringified for CSV
    /// export.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn export_rows(&self, kind: ItemKind) -> Result<RestoreTable> {
        let columns: &[&str] = match kind {
            ItemKind::Account => &ACCOUNT_COLUMNS,
            ItemKind::Page => &PAGE_COLUMNS,
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE is_deleted = 0",
            columns.join(", "),
            kind.table()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(value_to_string(row.get_ref(i)?));
            }
            Ok(values)
        })?;

        let mut table = RestoreTable {
            headers: columns.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        };
        for row in rows {
            table.rows.push(row?);
        }
        Ok(table)
    }
}

/// Build and execute an UPDATE whose SET list comes only from validated
/// per-entity field enums, never from caller strings.
fn apply_partial_update(
    conn: &Connection,
    table: &str,
    id_column: &str,
    id: i64,
    fields: &[(&'static str, FieldValue)],
    status: Status,
) -> Result<usize> {
    let assignments = fields
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {table} SET {assignments}, status = ?{} WHERE {id_column} = ?{}",
        fields.len() + 1,
        fields.len() + 2
    );

    let status = status.as_str();
    let mut bound: Vec<&dyn ToSql> = fields.iter().map(|(_, v)| v as &dyn ToSql).collect();
    bound.push(&status);
    bound.push(&id);

    Ok(conn.execute(&sql, bound.as_slice())?)
}

fn push_account_filter(sql: &mut String, bound: &mut Vec<Box<dyn ToSql>>, filter: &AccountFilter) {
    if !filter.search.is_empty() {
        let clause = ACCOUNT_SEARCH_COLUMNS
            .iter()
            .map(|c| format!("{c} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        sql.push_str(&format!(" AND ({clause})"));
        let term = format!("%{}%", filter.search);
        for _ in ACCOUNT_SEARCH_COLUMNS {
            bound.push(Box::new(term.clone()));
        }
    }
    if let Some(category) = &filter.category {
        sql.push_str(" AND account_category = ?");
        bound.push(Box::new(category.clone()));
    }
}

fn validate_restore_headers(
    table: &str,
    allowed: &[&str],
    data: &RestoreTable,
) -> Result<()> {
    if data.rows.is_empty() {
        return Ok(());
    }
    if data.headers.is_empty() {
        return Err(PagedeskError::validation(format!(
            "{table} restore data has rows but no header"
        )));
    }
    for header in &data.headers {
        if !allowed.contains(&header.as_str()) {
            return Err(PagedeskError::validation(format!(
                "unknown column '{header}' in {table} restore data"
            )));
        }
    }
    Ok(())
}

/// Columns whose empty backup cells must be restored as NULL: uid so that
/// repeated empty uids stay clear of the UNIQUE constraint, the rest so the
/// integer and date columns keep their affinity instead of holding empty text.
const RESTORE_NULL_COLUMNS: [&str; 7] = [
    "uid",
    "video_schedule_date",
    "video_posts_per_day",
    "reels_schedule_date",
    "reels_posts_per_day",
    "photo_schedule_date",
    "photo_posts_per_day",
];

fn insert_restore_rows(tx: &Transaction, table: &str, data: &RestoreTable) -> Result<()> {
    if data.rows.is_empty() {
        return Ok(());
    }

    let columns = data.headers.join(", ");
    let placeholders = (1..=data.headers.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders})"
    ))?;

    for row in &data.rows {
        if row.len() != data.headers.len() {
            return Err(PagedeskError::validation(format!(
                "{table} restore row has {} values for {} columns",
                row.len(),
                data.headers.len()
            )));
        }
        let values: Vec<Option<&str>> = row
            .iter()
            .zip(&data.headers)
            .map(|(value, header)| {
                if value.is_empty() && RESTORE_NULL_COLUMNS.contains(&header.as_str()) {
                    None
                } else {
                    Some(value.as_str())
                }
            })
            .collect();
        stmt.execute(params_from_iter(values.iter()))?;
    }

    Ok(())
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        profile_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        account_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        uid: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        account_category: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        monetization: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        proxy: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        proxy_location: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        is_deleted: row.get::<_, i64>(9)? != 0,
        note: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        page_id: row.get(0)?,
        page_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        uid_page_id: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        content_folder: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        used_folders: parse_folder_list(row.get(5)?),
        video_schedule_date: parse_date(row.get(6)?),
        video_posts_per_day: row.get(7)?,
        reels_schedule_date: parse_date(row.get(8)?),
        reels_posts_per_day: row.get(9)?,
        photo_schedule_date: parse_date(row.get(10)?),
        photo_posts_per_day: row.get(11)?,
        note: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
        monetization: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
        is_deleted: row.get::<_, i64>(15)? != 0,
        linked_account_id: row.get(16)?,
        video_folder: row.get::<_, Option<String>>(17)?.unwrap_or_default(),
        reels_folder: row.get::<_, Option<String>>(18)?.unwrap_or_default(),
        photo_folder: row.get::<_, Option<String>>(19)?.unwrap_or_default(),
        followers: row.get::<_, Option<String>>(20)?.unwrap_or_default(),
        last_interaction: row.get::<_, Option<String>>(21)?.unwrap_or_default(),
    })
}
