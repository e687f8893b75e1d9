//! Journal repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist one journal row per logged note.
//! - Serialize the opaque extraction payload to a JSON text column.
//!
//! # Invariants
//! - `append` must call `NewJournalEntry::validate()` before SQL mutations.
//! - Rows are never updated or deleted; `timestamp` is storage-assigned.

use crate::model::journal::{JournalEntry, JournalEntryId, NewJournalEntry};
use crate::repo::deliverable_repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row};

/// Repository interface for the append-only journal.
pub trait JournalRepository {
    /// Appends one row and returns the store-assigned id.
    fn append(&self, entry: &NewJournalEntry) -> RepoResult<JournalEntryId>;
    /// Returns all rows for one project in insertion order.
    fn list_by_project(&self, project_name: &str) -> RepoResult<Vec<JournalEntry>>;
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn append(&self, entry: &NewJournalEntry) -> RepoResult<JournalEntryId> {
        entry.validate()?;

        let metadata_text = match entry.metadata.as_ref() {
            Some(value) => Some(serde_json::to_string(value).map_err(|err| {
                RepoError::InvalidData(format!("journal metadata does not serialize: {err}"))
            })?),
            None => None,
        };

        self.conn.execute(
            "INSERT INTO journal (
                project_name,
                entry_type,
                raw_note,
                tags,
                metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.project_name.as_str(),
                entry.entry_type.as_str(),
                entry.raw_note.as_str(),
                entry.tags.as_deref(),
                metadata_text.as_deref(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "event=journal_append module=repo status=ok id={id} project={} type={}",
            entry.project_name, entry.entry_type
        );
        Ok(id)
    }

    fn list_by_project(&self, project_name: &str) -> RepoResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, project_name, entry_type, raw_note, tags, metadata
             FROM journal
             WHERE project_name = ?1
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([project_name])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_journal_row(row)?);
        }

        Ok(entries)
    }
}

fn parse_journal_row(row: &Row<'_>) -> RepoResult<JournalEntry> {
    let metadata = match row.get::<_, Option<String>>("metadata")? {
        Some(text) => Some(serde_json::from_str(&text).map_err(|err| {
            RepoError::InvalidData(format!("invalid metadata JSON in journal row: {err}"))
        })?),
        None => None,
    };

    Ok(JournalEntry {
        id: row.get("id")?,
        timestamp: row.get("timestamp")?,
        project_name: row.get("project_name")?,
        entry_type: row.get("entry_type")?,
        raw_note: row.get("raw_note")?,
        tags: row.get("tags")?,
        metadata,
    })
}
