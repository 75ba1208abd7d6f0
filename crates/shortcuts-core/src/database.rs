//! Read-only access to the Shortcuts library database.
//!
//! The database is owned by the Shortcuts app; this module never writes to it.
//! A fresh connection is opened for each query so a long-running server never
//! holds the file open between tool calls.

use crate::error::{Result, ShortcutsError};
use crate::plist::cocoa_date;
use crate::types::{FolderInfo, ShortcutRow};
use crate::value::iso8601;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SHORTCUT_COLUMNS: &str = "Z_PK, ZNAME, ZACTIONCOUNT, ZMODIFICATIONDATE, ZWORKFLOWID";

/// The slice of the database the action catalog needs.
pub trait ShortcutLibrary: Send + Sync {
    /// Every named shortcut. `folder` is accepted for forward compatibility
    /// but the current schema has no folder relationship to filter on.
    fn all_shortcuts(&self, folder: Option<&str>) -> Result<Vec<ShortcutRow>>;

    /// The stored action blob for a shortcut, if it has one.
    fn shortcut_actions(&self, pk: i64) -> Result<Option<Vec<u8>>>;
}

#[derive(Debug, Clone)]
pub struct ShortcutDb {
    path: PathBuf,
}

impl ShortcutDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    pub fn shortcut_by_name(&self, name: &str) -> Result<Option<ShortcutRow>> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                &format!("SELECT {SHORTCUT_COLUMNS} FROM ZSHORTCUT WHERE ZNAME = ?1 LIMIT 1"),
                params![name],
                shortcut_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Like [`ShortcutDb::shortcut_by_name`] but a missing shortcut is an error.
    pub fn require_shortcut(&self, name: &str) -> Result<ShortcutRow> {
        self.shortcut_by_name(name)?
            .ok_or_else(|| ShortcutsError::ShortcutNotFound(name.to_string()))
    }

    /// Shortcuts whose name contains `query` (SQLite `LIKE`, so ASCII
    /// case-insensitive).
    pub fn search_by_name(&self, query: &str) -> Result<Vec<ShortcutRow>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SHORTCUT_COLUMNS} FROM ZSHORTCUT \
             WHERE ZNAME LIKE ?1 ORDER BY ZNAME COLLATE NOCASE"
        ))?;
        let rows = stmt
            .query_map(params![format!("%{query}%")], shortcut_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Collections known to the library. Counts are not derivable from the
    /// schema and are always zero.
    pub fn folders(&self) -> Result<Vec<FolderInfo>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT COALESCE(ZTEMPORARYSYNCFOLDERNAME, ZIDENTIFIER) AS name \
             FROM ZCOLLECTION WHERE ZIDENTIFIER IS NOT NULL \
             ORDER BY name COLLATE NOCASE",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let folders = names
            .into_iter()
            .flatten()
            .filter(|name| !name.is_empty())
            .map(|name| FolderInfo {
                name,
                shortcut_count: 0,
            })
            .collect();
        Ok(folders)
    }
}

impl ShortcutLibrary for ShortcutDb {
    fn all_shortcuts(&self, _folder: Option<&str>) -> Result<Vec<ShortcutRow>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SHORTCUT_COLUMNS} FROM ZSHORTCUT \
             WHERE ZNAME IS NOT NULL ORDER BY ZNAME COLLATE NOCASE"
        ))?;
        let rows = stmt
            .query_map([], shortcut_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn shortcut_actions(&self, pk: i64) -> Result<Option<Vec<u8>>> {
        let conn = self.connect()?;
        let data = conn
            .query_row(
                "SELECT ZDATA FROM ZSHORTCUTACTIONS WHERE ZSHORTCUT = ?1 LIMIT 1",
                params![pk],
                |row| {
                    Ok(match row.get_ref(0)? {
                        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Some(bytes.to_vec()),
                        _ => None,
                    })
                },
            )
            .optional()?;
        Ok(data.flatten())
    }
}

// ---------------------------------------------------------------------------
// Row normalisation
// ---------------------------------------------------------------------------

fn shortcut_from_row(row: &Row<'_>) -> rusqlite::Result<ShortcutRow> {
    Ok(ShortcutRow {
        pk: row.get(0)?,
        name: row.get(1)?,
        action_count: number_from(row.get_ref(2)?).map(|n| n as i64),
        modified_at: cocoa_date_from(row.get_ref(3)?),
        workflow_id: normalize_uuid(row.get_ref(4)?),
        folder: None,
    })
}

fn number_from(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(n) => Some(n as f64),
        ValueRef::Real(r) if r.is_finite() => Some(r),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite()),
        _ => None,
    }
}

/// `ZMODIFICATIONDATE` is seconds since the Cocoa epoch.
fn cocoa_date_from(value: ValueRef<'_>) -> Option<String> {
    number_from(value)
        .and_then(cocoa_date)
        .map(|at| iso8601(&at))
}

fn normalize_uuid(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(r) => Some(r.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => match uuid::Uuid::from_slice(bytes) {
            Ok(id) => Some(id.hyphenated().to_string()),
            Err(_) => String::from_utf8(bytes.to_vec()).ok(),
        },
    }
}
