//! Deliverable domain model.
//!
//! # Responsibility
//! - Define the persisted deliverable record and its insert shape.
//! - Guard the blank-field rejections required before SQL mutations.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.
//! - `depends_on_id` is a weak reference: it must name an existing row or
//!   be `None`. The resolver enforces this before insert; the store does
//!   not revalidate it.
//! - A placeholder deliverable carries no due date, owner or dependency.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable store-assigned identifier for a deliverable row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type DeliverableId = i64;

/// Persisted deliverable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    /// Store-assigned row id, unique and monotonically increasing.
    pub id: DeliverableId,
    /// Owning project/deal name. Not unique on its own.
    pub project_name: String,
    /// Free-text task description used for dependency matching.
    pub description: String,
    /// ISO 8601 `YYYY-MM-DD` due date. `None` means undated.
    pub due_date: Option<String>,
    /// Responsible agent, when one was named.
    pub owner: Option<String>,
    /// Weak back-reference to another deliverable's `id`.
    pub depends_on_id: Option<DeliverableId>,
}

/// Insert shape for a deliverable; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeliverable {
    pub project_name: String,
    pub description: String,
    pub due_date: Option<String>,
    pub owner: Option<String>,
    pub depends_on_id: Option<DeliverableId>,
}

/// Validation failure for deliverable insert shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverableValidationError {
    /// `project_name` is empty after trimming.
    BlankProjectName,
    /// `description` is empty after trimming.
    BlankDescription,
}

impl Display for DeliverableValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankProjectName => write!(f, "deliverable project name must not be blank"),
            Self::BlankDescription => write!(f, "deliverable description must not be blank"),
        }
    }
}

impl Error for DeliverableValidationError {}

impl NewDeliverable {
    /// Creates a fully specified insert shape.
    pub fn new(
        project_name: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<String>,
        owner: Option<String>,
        depends_on_id: Option<DeliverableId>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            description: description.into(),
            due_date,
            owner,
            depends_on_id,
        }
    }

    /// Creates the minimal shape used when auto-creating a missing
    /// dependency: no due date, no owner, no dependency link.
    pub fn placeholder(
        project_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(project_name, description, None, None, None)
    }

    /// Rejects blank identifying fields before any storage mutation.
    pub fn validate(&self) -> Result<(), DeliverableValidationError> {
        if self.project_name.trim().is_empty() {
            return Err(DeliverableValidationError::BlankProjectName);
        }
        if self.description.trim().is_empty() {
            return Err(DeliverableValidationError::BlankDescription);
        }
        Ok(())
    }
}
