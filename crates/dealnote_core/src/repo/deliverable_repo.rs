//! Deliverable repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide append-only persistence for deliverable rows.
//! - Own the lookup operations backing dependency resolution and the
//!   schedule views.
//!
//! # Invariants
//! - `insert` must call `NewDeliverable::validate()` before SQL mutations.
//! - `find_by_description` matches case-sensitively, scoped to one project,
//!   ordered by insertion (`id ASC`).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::deliverable::{
    Deliverable, DeliverableId, DeliverableValidationError, NewDeliverable,
};
use crate::model::journal::JournalValidationError;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DELIVERABLE_SELECT_SQL: &str = "SELECT
    id,
    project_name,
    description,
    due_date,
    owner,
    depends_on_id
FROM deliverables";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(DeliverableValidationError),
    JournalValidation(JournalValidationError),
    Db(DbError),
    NotFound(DeliverableId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::JournalValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "deliverable not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted row: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::JournalValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DeliverableValidationError> for RepoError {
    fn from(value: DeliverableValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<JournalValidationError> for RepoError {
    fn from(value: JournalValidationError) -> Self {
        Self::JournalValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Candidate row returned by description matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionMatch {
    pub id: DeliverableId,
    pub description: String,
}

/// Repository interface for deliverable persistence and lookups.
pub trait DeliverableRepository {
    /// Appends one row and returns the store-assigned id.
    fn insert(&self, row: &NewDeliverable) -> RepoResult<DeliverableId>;
    /// Gets one row by id.
    fn get(&self, id: DeliverableId) -> RepoResult<Option<Deliverable>>;
    /// Returns rows in `project_name` whose description contains `needle`
    /// (case-sensitive), in insertion order.
    fn find_by_description(
        &self,
        project_name: &str,
        needle: &str,
    ) -> RepoResult<Vec<DescriptionMatch>>;
    /// Returns all rows for one project in storage order.
    fn list_by_project(&self, project_name: &str) -> RepoResult<Vec<Deliverable>>;
    /// Returns every project name with at least one deliverable.
    fn list_distinct_projects(&self) -> RepoResult<BTreeSet<String>>;
}

/// SQLite-backed deliverable repository.
pub struct SqliteDeliverableRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeliverableRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DeliverableRepository for SqliteDeliverableRepository<'_> {
    fn insert(&self, row: &NewDeliverable) -> RepoResult<DeliverableId> {
        row.validate()?;

        self.conn.execute(
            "INSERT INTO deliverables (
                project_name,
                description,
                due_date,
                owner,
                depends_on_id
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                row.project_name.as_str(),
                row.description.as_str(),
                row.due_date.as_deref(),
                row.owner.as_deref(),
                row.depends_on_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "event=deliverable_insert module=repo status=ok id={id} project={} linked={}",
            row.project_name,
            row.depends_on_id.is_some()
        );
        Ok(id)
    }

    fn get(&self, id: DeliverableId) -> RepoResult<Option<Deliverable>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DELIVERABLE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_deliverable_row(row)?));
        }

        Ok(None)
    }

    fn find_by_description(
        &self,
        project_name: &str,
        needle: &str,
    ) -> RepoResult<Vec<DescriptionMatch>> {
        // instr() keeps the containment check case-sensitive; LIKE would
        // fold ASCII case and widen matches beyond the contract.
        let mut stmt = self.conn.prepare(
            "SELECT id, description
             FROM deliverables
             WHERE project_name = ?1
               AND instr(description, ?2) > 0
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query(params![project_name, needle])?;
        let mut matches = Vec::new();
        while let Some(row) = rows.next()? {
            matches.push(DescriptionMatch {
                id: row.get("id")?,
                description: row.get("description")?,
            });
        }

        Ok(matches)
    }

    fn list_by_project(&self, project_name: &str) -> RepoResult<Vec<Deliverable>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DELIVERABLE_SELECT_SQL} WHERE project_name = ?1 ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([project_name])?;
        let mut deliverables = Vec::new();
        while let Some(row) = rows.next()? {
            deliverables.push(parse_deliverable_row(row)?);
        }

        Ok(deliverables)
    }

    fn list_distinct_projects(&self) -> RepoResult<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT project_name FROM deliverables;")?;

        let mut rows = stmt.query([])?;
        let mut projects = BTreeSet::new();
        while let Some(row) = rows.next()? {
            projects.insert(row.get::<_, String>(0)?);
        }

        Ok(projects)
    }
}

fn parse_deliverable_row(row: &Row<'_>) -> RepoResult<Deliverable> {
    let deliverable = Deliverable {
        id: row.get("id")?,
        project_name: row.get("project_name")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        owner: row.get("owner")?,
        depends_on_id: row.get("depends_on_id")?,
    };

    if deliverable.description.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty description in deliverables row {}",
            deliverable.id
        )));
    }

    Ok(deliverable)
}
