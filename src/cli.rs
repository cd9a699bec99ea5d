//! CLI definitions for pagedesk.
//!
//! Uses clap for argument parsing with derive macros.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::ItemKind;

/// pagedesk - account and page lifecycle manager
#[derive(Parser, Debug)]
#[command(name = "pagedesk")]
#[command(version)]
#[command(about = "Manage social content accounts and pages in a local SQLite database")]
#[command(long_about = r#"
pagedesk - a command-line manager for social content accounts and the
pages that belong to them, stored in a single local SQLite file.

Features:
  - Account and page records with trim + Title Case normalization
  - Bulk CSV import (duplicates skipped) and bulk page creation
  - Partial bulk edits from JSONL, applied all-or-nothing
  - A recycle bin: soft delete, restore, and permanent purge
  - Paired CSV backups with full wipe-and-restore

Quick start:
  1. Add an account: pagedesk account add FB-001 "my account"
  2. Add a page:     pagedesk page add "my page" --account FB-001
  3. List accounts:  pagedesk account list
"#)]
pub struct Cli {
    /// Path to the database file
    #[arg(long, env = "PAGEDESK_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Be verbose (show debug info)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Be quiet (suppress non-error output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage accounts
    #[command(subcommand)]
    Account(AccountCmd),

    /// Manage pages
    #[command(subcommand)]
    Page(PageCmd),

    /// Apply partial updates from a JSONL file, all-or-nothing
    BulkEdit(BulkEditArgs),

    /// Set one field to one value across many records
    QuickEdit(QuickEditArgs),

    /// Move records to the recycle bin
    Delete(DeleteArgs),

    /// Inspect and manage the recycle bin
    #[command(subcommand)]
    Bin(BinCmd),

    /// Export all active records to a pair of CSV files
    Backup(BackupArgs),

    /// Replace the whole database from a backup pair
    Restore(RestoreArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Subcommand, Debug)]
pub enum AccountCmd {
    /// Add a new account
    Add(AccountAddArgs),

    /// Edit an account's details
    Edit(AccountEditArgs),

    /// Overwrite an account's note
    Note(NoteArgs),

    /// List accounts
    List(AccountListArgs),

    /// Show one account in full
    Show(ShowArgs),

    /// Import accounts from a CSV file (existing ids are skipped)
    Import(ImportArgs),
}

#[derive(Subcommand, Debug)]
pub enum PageCmd {
    /// Add a new page under an account
    Add(PageAddArgs),

    /// Add many pages from a CSV file
    BulkAdd(BulkAddArgs),

    /// Edit a page's details
    Edit(PageEditArgs),

    /// Overwrite a page's note
    Note(NoteArgs),

    /// List pages with their owning accounts
    List(PageListArgs),

    /// Show one page in full
    Show(ShowArgs),

    /// Record a content folder as used by a page
    UseFolder(UseFolderArgs),
}

#[derive(Subcommand, Debug)]
pub enum BinCmd {
    /// List everything in the recycle bin
    List,

    /// Restore records from the recycle bin
    Restore(BinRestoreArgs),

    /// Permanently delete records (cascades to linked pages)
    Purge(PurgeArgs),
}

#[derive(Args, Debug)]
pub struct AccountAddArgs {
    /// Externally-assigned profile id (must be unique)
    pub profile_id: String,

    /// Account name
    pub name: String,

    /// Platform user id (unique when non-empty)
    #[arg(long, default_value = "")]
    pub uid: String,

    /// Account category
    #[arg(long, short = 'c', default_value = "")]
    pub category: String,
}

#[derive(Args, Debug)]
pub struct AccountEditArgs {
    /// Account id
    pub id: i64,

    /// New account name
    #[arg(long)]
    pub name: Option<String>,

    /// New category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// New monetization status
    #[arg(long)]
    pub monetization: Option<String>,

    /// New proxy address
    #[arg(long)]
    pub proxy: Option<String>,

    /// New proxy location
    #[arg(long)]
    pub proxy_location: Option<String>,

    /// New note text
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Record id
    pub id: i64,

    /// Note text (replaces any existing note)
    pub text: String,
}

#[derive(Args, Debug)]
pub struct AccountListArgs {
    /// Substring to match against name, ids, category, proxy or note
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// Only show accounts in this category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Maximum number of rows
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Skip first N rows (for pagination)
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Record id
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file with account rows
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PageAddArgs {
    /// Page name
    pub name: String,

    /// Profile id of the owning account
    #[arg(long, short = 'a')]
    pub account: String,

    /// Platform page id
    #[arg(long, default_value = "")]
    pub uid_page_id: String,

    /// Page category
    #[arg(long, short = 'c', default_value = "")]
    pub category: String,

    /// Monetization status
    #[arg(long, default_value = "")]
    pub monetization: String,
}

#[derive(Args, Debug)]
pub struct BulkAddArgs {
    /// CSV file with page rows (needs profile_id and page_name columns)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PageEditArgs {
    /// Page id
    pub id: i64,

    /// New page name
    #[arg(long)]
    pub name: Option<String>,

    /// New platform page id
    #[arg(long)]
    pub uid_page_id: Option<String>,

    /// New category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// New monetization status
    #[arg(long)]
    pub monetization: Option<String>,

    /// Relink the page to another account id
    #[arg(long)]
    pub account_id: Option<i64>,

    /// Current content folder
    #[arg(long)]
    pub content_folder: Option<String>,

    /// Video schedule date (YYYY-MM-DD)
    #[arg(long)]
    pub video_date: Option<NaiveDate>,

    /// Videos posted per day
    #[arg(long)]
    pub video_per_day: Option<i64>,

    /// Video content folder
    #[arg(long)]
    pub video_folder: Option<String>,

    /// Reels schedule date (YYYY-MM-DD)
    #[arg(long)]
    pub reels_date: Option<NaiveDate>,

    /// Reels posted per day
    #[arg(long)]
    pub reels_per_day: Option<i64>,

    /// Reels content folder
    #[arg(long)]
    pub reels_folder: Option<String>,

    /// Photo schedule date (YYYY-MM-DD)
    #[arg(long)]
    pub photo_date: Option<NaiveDate>,

    /// Photos posted per day
    #[arg(long)]
    pub photo_per_day: Option<i64>,

    /// Photo content folder
    #[arg(long)]
    pub photo_folder: Option<String>,

    /// Follower count note
    #[arg(long)]
    pub followers: Option<String>,

    /// Last interaction note
    #[arg(long)]
    pub last_interaction: Option<String>,
}

#[derive(Args, Debug)]
pub struct PageListArgs {
    /// Substring to match against page or account fields
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// Only show pages in this category
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct UseFolderArgs {
    /// Page id
    pub id: i64,

    /// Folder name to record
    pub folder: String,
}

#[derive(Args, Debug)]
pub struct BulkEditArgs {
    /// Which kind of record the file updates
    pub kind: KindArg,

    /// JSONL file, one update object per line
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct QuickEditArgs {
    /// Which kind of record to update
    pub kind: KindArg,

    /// Column to set
    pub field: String,

    /// Value to set it to
    pub value: String,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Which kind of record to delete
    pub kind: KindArg,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct BinRestoreArgs {
    /// Which kind of record to restore
    pub kind: KindArg,

    /// Record ids
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Account ids to purge
    #[arg(long = "account")]
    pub accounts: Vec<i64>,

    /// Page ids to purge
    #[arg(long = "page")]
    pub pages: Vec<i64>,

    /// Confirm without prompting
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Base path; `<base>_accounts.csv` and `<base>_pages.csv` are written.
    /// Defaults to a timestamped base under the configured backup directory.
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Base path of the backup pair
    pub path: PathBuf,

    /// Confirm the wipe without prompting
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Account,
    Page,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Account => Self::Account,
            KindArg::Page => Self::Page,
        }
    }
}
