//! pagedesk - account and page lifecycle management
//!
//! This library provides the core functionality for managing social
//! content accounts and their pages in a local `SQLite` database:
//! creation, editing, bulk updates, a recycle bin, and CSV backups.
//!
//! # Modules
//!
//! - [`backup`] - Paired CSV export and wipe-and-restore
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Layered configuration (file, env, CLI)
//! - [`error`] - Custom error types with rich context
//! - [`model`] - Accounts, pages, field enums and update batches
//! - [`normalize`] - Trim and title-case normalization for names
//! - [`parser`] - Bulk-input file parsing (CSV and JSONL)
//! - [`storage`] - `SQLite` storage layer

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod storage;

pub use cli::*;
pub use error::{PagedeskError, Result};
pub use model::*;
pub use storage::Storage;

/// Default database filename
pub const DEFAULT_DB_NAME: &str = "pagedesk.db";

/// Standard width for content dividers in CLI output
pub const CONTENT_DIVIDER_WIDTH: usize = 60;

/// Get the default data directory for pagedesk
#[must_use]
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pagedesk")
}

/// Get the default database path
#[must_use]
pub fn default_db_path() -> std::path::PathBuf {
    default_data_dir().join(DEFAULT_DB_NAME)
}

/// Format an integer with thousands separators.
#[must_use]
pub fn format_number(value: i64) -> String {
    let abs = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(abs.len() + abs.len() / 3);

    for (idx, ch) in abs.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut formatted: String = out.chars().rev().collect();
    if value < 0 {
        formatted.insert(0, '-');
    }
    formatted
}
