//! Data models for accounts and pages.
//!
//! Accounts own pages through `linked_account_id`; both carry a soft-delete
//! flag and a fixed lifecycle status tag. Partial updates are expressed with
//! closed per-entity field enums so column names never come from caller
//! strings.

use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::{Deserialize, Serialize};

/// Date format used for schedule columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The two record kinds managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    Account,
    Page,
}

impl ItemKind {
    /// Table holding records of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Page => "pages",
        }
    }

    /// Primary-key column for this kind.
    #[must_use]
    pub const fn id_column(self) -> &'static str {
        match self {
            Self::Account => "account_id",
            Self::Page => "page_id",
        }
    }

    /// Human-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Page => "Page",
        }
    }
}

/// Fixed lifecycle-action tags. Every mutating operation overwrites the
/// record's `status` column with the tag for that operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Created,
    Imported,
    DetailsUpdated,
    BulkUpdated,
    QuickUpdated,
    NoteSaved,
    Deleted,
    Restored,
}

impl Status {
    /// Canonical stored form of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Imported => "Imported",
            Self::DetailsUpdated => "Details Updated",
            Self::BulkUpdated => "Bulk Updated",
            Self::QuickUpdated => "Quick Updated",
            Self::NoteSaved => "Note Saved",
            Self::Deleted => "Deleted",
            Self::Restored => "Restored",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account row.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_id: i64,
    pub profile_id: String,
    pub account_name: String,
    pub uid: String,
    pub account_category: String,
    pub status: String,
    pub monetization: String,
    pub proxy: String,
    pub proxy_location: String,
    pub is_deleted: bool,
    pub note: String,
}

/// A stored page row.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub page_id: i64,
    pub page_name: String,
    pub uid_page_id: String,
    pub category: String,
    pub content_folder: String,
    pub used_folders: Vec<String>,
    pub video_schedule_date: Option<NaiveDate>,
    pub video_posts_per_day: Option<i64>,
    pub reels_schedule_date: Option<NaiveDate>,
    pub reels_posts_per_day: Option<i64>,
    pub photo_schedule_date: Option<NaiveDate>,
    pub photo_posts_per_day: Option<i64>,
    pub note: String,
    pub status: String,
    pub monetization: String,
    pub is_deleted: bool,
    pub linked_account_id: i64,
    pub video_folder: String,
    pub reels_folder: String,
    pub photo_folder: String,
    pub followers: String,
    pub last_interaction: String,
}

/// A page row joined with its owning account, as shown in page listings.
#[derive(Debug, Clone, Serialize)]
pub struct PageListing {
    pub page: Page,
    pub profile_id: String,
    pub account_name: String,
}

/// A soft-deleted record, tagged by kind, for recycle-bin presentation.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedItem {
    pub kind: ItemKind,
    pub id: i64,
    pub display_name: String,
    pub detail: String,
}

// =============================================================================
// Field enums for partial updates
// =============================================================================

/// Caller-updatable account columns. Dynamic `SET` lists are built only from
/// this enum, never from caller-supplied identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Name,
    Category,
    Uid,
    Monetization,
    Proxy,
    ProxyLocation,
    Note,
}

impl AccountField {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Category,
        Self::Uid,
        Self::Monetization,
        Self::Proxy,
        Self::ProxyLocation,
        Self::Note,
    ];

    /// Column name in the `accounts` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "account_name",
            Self::Category => "account_category",
            Self::Uid => "uid",
            Self::Monetization => "monetization",
            Self::Proxy => "proxy",
            Self::ProxyLocation => "proxy_location",
            Self::Note => "note",
        }
    }

    /// Whether writes to this field are trimmed and title-cased.
    #[must_use]
    pub const fn is_title_cased(self) -> bool {
        matches!(self, Self::Name | Self::Category)
    }

    /// Resolve a column name to a field, rejecting unknown identifiers.
    #[must_use]
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }
}

/// Caller-updatable page columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageField {
    Name,
    UidPageId,
    Category,
    ContentFolder,
    UsedFolders,
    VideoScheduleDate,
    VideoPostsPerDay,
    ReelsScheduleDate,
    ReelsPostsPerDay,
    PhotoScheduleDate,
    PhotoPostsPerDay,
    Note,
    Monetization,
    LinkedAccountId,
    VideoFolder,
    ReelsFolder,
    PhotoFolder,
    Followers,
    LastInteraction,
}

impl PageField {
    pub const ALL: [Self; 19] = [
        Self::Name,
        Self::UidPageId,
        Self::Category,
        Self::ContentFolder,
        Self::UsedFolders,
        Self::VideoScheduleDate,
        Self::VideoPostsPerDay,
        Self::ReelsScheduleDate,
        Self::ReelsPostsPerDay,
        Self::PhotoScheduleDate,
        Self::PhotoPostsPerDay,
        Self::Note,
        Self::Monetization,
        Self::LinkedAccountId,
        Self::VideoFolder,
        Self::ReelsFolder,
        Self::PhotoFolder,
        Self::Followers,
        Self::LastInteraction,
    ];

    /// Column name in the `pages` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "page_name",
            Self::UidPageId => "uid_page_id",
            Self::Category => "category",
            Self::ContentFolder => "content_folder",
            Self::UsedFolders => "used_folders",
            Self::VideoScheduleDate => "video_schedule_date",
            Self::VideoPostsPerDay => "video_posts_per_day",
            Self::ReelsScheduleDate => "reels_schedule_date",
            Self::ReelsPostsPerDay => "reels_posts_per_day",
            Self::PhotoScheduleDate => "photo_schedule_date",
            Self::PhotoPostsPerDay => "photo_posts_per_day",
            Self::Note => "note",
            Self::Monetization => "monetization",
            Self::LinkedAccountId => "linked_account_id",
            Self::VideoFolder => "video_folder",
            Self::ReelsFolder => "reels_folder",
            Self::PhotoFolder => "photo_folder",
            Self::Followers => "followers",
            Self::LastInteraction => "last_interaction",
        }
    }

    /// Whether writes to this field are trimmed and title-cased.
    #[must_use]
    pub const fn is_title_cased(self) -> bool {
        matches!(self, Self::Name | Self::Category)
    }

    /// Resolve a column name to a field, rejecting unknown identifiers.
    #[must_use]
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }
}

/// A typed value for a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Date(NaiveDate),
    /// Serialized to a JSON array on write (used-folders column).
    List(Vec<String>),
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            Self::Int(i) => Ok(ToSqlOutput::from(*i)),
            Self::Date(d) => Ok(ToSqlOutput::from(d.format(DATE_FORMAT).to_string())),
            Self::List(items) => serde_json::to_string(items)
                .map(ToSqlOutput::from)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e))),
        }
    }
}

/// One entry of a bulk partial update: the target account and only the
/// fields that changed.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub account_id: i64,
    pub fields: Vec<(AccountField, FieldValue)>,
}

/// One entry of a bulk partial update for pages.
#[derive(Debug, Clone)]
pub struct PageUpdate {
    pub page_id: i64,
    pub fields: Vec<(PageField, FieldValue)>,
}

// =============================================================================
// Input records
// =============================================================================

/// Input for creating a single account.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub profile_id: String,
    pub account_name: String,
    pub uid: String,
    pub account_category: String,
}

/// Input for creating a single page.
#[derive(Debug, Clone, Default)]
pub struct NewPage {
    pub page_name: String,
    pub uid_page_id: String,
    pub category: String,
    pub monetization: String,
    pub linked_account_id: i64,
}

/// One row of a bulk page-add file; `profile_id` is resolved to an account
/// case-insensitively, unresolvable rows are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BulkPageRow {
    pub profile_id: String,
    pub page_name: String,
    pub uid_page_id: String,
    pub category: String,
}

/// One record of an account import. Records missing `profile_id` or
/// `account_name` are dropped; collisions with existing profile ids or uids
/// are skipped, not errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportRecord {
    pub profile_id: String,
    pub account_name: String,
    pub uid: String,
    pub account_category: String,
    pub proxy: String,
    pub proxy_location: String,
    pub monetization: String,
    pub note: String,
}

/// Full replacement of the editable account detail fields.
#[derive(Debug, Clone, Default)]
pub struct AccountEdit {
    pub account_name: String,
    pub account_category: String,
    pub monetization: String,
    pub proxy: String,
    pub proxy_location: String,
    pub note: String,
}

/// Filter for account listings.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub search: String,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Filter for page listings.
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub search: String,
    pub category: Option<String>,
}

/// A parsed backup table: header row plus data rows, as read from a
/// restore file. Column names are validated against the schema before any
/// SQL is built from them.
#[derive(Debug, Clone, Default)]
pub struct RestoreTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_match_stored_labels() {
        assert_eq!(Status::Created.as_str(), "Created");
        assert_eq!(Status::DetailsUpdated.as_str(), "Details Updated");
        assert_eq!(Status::BulkUpdated.as_str(), "Bulk Updated");
        assert_eq!(Status::QuickUpdated.as_str(), "Quick Updated");
        assert_eq!(Status::NoteSaved.as_str(), "Note Saved");
    }

    #[test]
    fn account_field_round_trips_through_column_names() {
        for field in AccountField::ALL {
            assert_eq!(AccountField::from_column(field.column()), Some(field));
        }
        assert_eq!(AccountField::from_column("account_id"), None);
        assert_eq!(AccountField::from_column("evil; DROP TABLE"), None);
    }

    #[test]
    fn page_field_round_trips_through_column_names() {
        for field in PageField::ALL {
            assert_eq!(PageField::from_column(field.column()), Some(field));
        }
        assert_eq!(PageField::from_column("is_deleted"), None);
    }

    #[test]
    fn title_cased_fields() {
        assert!(AccountField::Name.is_title_cased());
        assert!(AccountField::Category.is_title_cased());
        assert!(!AccountField::Proxy.is_title_cased());
        assert!(PageField::Name.is_title_cased());
        assert!(!PageField::UidPageId.is_title_cased());
    }

    #[test]
    fn field_value_list_serializes_to_json() {
        let value = FieldValue::List(vec!["a".into(), "b".into()]);
        let out = value.to_sql().unwrap();
        let expected = ToSqlOutput::from(r#"["a","b"]"#.to_string());
        assert_eq!(out, expected);
    }

    #[test]
    fn item_kind_tables() {
        assert_eq!(ItemKind::Account.table(), "accounts");
        assert_eq!(ItemKind::Page.id_column(), "page_id");
        assert_eq!(ItemKind::Page.label(), "Page");
    }
}
