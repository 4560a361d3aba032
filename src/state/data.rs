/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the record store, the platform services and the UI layer.

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::fmt;
use std::path::Path;

/// Opaque handle to an image resource (a file path on desktop).
///
/// A `Location` is never empty: constructing one from an empty string
/// yields `None`, so "no image" is always an explicit `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    /// Wrap a handle, rejecting the empty string
    pub fn new(handle: impl Into<String>) -> Option<Self> {
        let handle = handle.into();
        if handle.is_empty() {
            None
        } else {
            Some(Self(handle))
        }
    }

    /// Build a location from a filesystem path
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::new(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for Location {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for Location {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let handle = String::column_result(value)?;
        Location::new(handle).ok_or(FromSqlError::InvalidType)
    }
}

/// Represents a single saved edit in the record store
#[derive(Debug, Clone, PartialEq)]
pub struct EditedImage {
    /// Unique database ID, assigned on insert
    pub id: i64,
    /// Where the source image lived when the edit was made
    pub original: Location,
    /// The final edited image
    pub edited: Location,
    /// Store-assigned creation time (UTC)
    pub timestamp: NaiveDateTime,
}
