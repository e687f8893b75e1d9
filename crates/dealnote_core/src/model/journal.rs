//! Journal entry domain model and inline tag handling.
//!
//! # Responsibility
//! - Define the persisted journal record and its insert shape.
//! - Split inline `#tag` tokens out of raw note bodies.
//!
//! # Invariants
//! - Journal rows are created once per logged note, never mutated.
//! - `timestamp` is assigned at insert and increases with insertion order.
//! - Stored tags are lowercase, deduplicated and comma-joined.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static INLINE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(\w+)").expect("valid inline tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable store-assigned identifier for a journal row.
pub type JournalEntryId = i64;

/// Persisted journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Store-assigned row id.
    pub id: JournalEntryId,
    /// Insert timestamp assigned by storage (`CURRENT_TIMESTAMP`).
    pub timestamp: String,
    /// Owning project/deal name.
    pub project_name: String,
    /// Entry category, e.g. `Meeting` or `Legal`.
    pub entry_type: String,
    /// Note body with inline tags already stripped.
    pub raw_note: String,
    /// Comma-joined lowercase tags, when any were captured.
    pub tags: Option<String>,
    /// Opaque structured payload returned by extraction.
    pub metadata: Option<serde_json::Value>,
}

/// Insert shape for a journal row; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournalEntry {
    pub project_name: String,
    pub entry_type: String,
    pub raw_note: String,
    pub tags: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Validation failure for journal insert shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalValidationError {
    /// `project_name` is empty after trimming.
    BlankProjectName,
}

impl Display for JournalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankProjectName => write!(f, "journal project name must not be blank"),
        }
    }
}

impl Error for JournalValidationError {}

impl NewJournalEntry {
    pub fn new(
        project_name: impl Into<String>,
        entry_type: impl Into<String>,
        raw_note: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            entry_type: entry_type.into(),
            raw_note: raw_note.into(),
            tags: None,
            metadata: None,
        }
    }

    /// Rejects blank project names before any storage mutation.
    pub fn validate(&self) -> Result<(), JournalValidationError> {
        if self.project_name.trim().is_empty() {
            return Err(JournalValidationError::BlankProjectName);
        }
        Ok(())
    }
}

/// Splits inline `#tag` tokens out of a note body.
///
/// Returns the cleaned body (tags removed, whitespace normalized) and the
/// sorted unique lowercase tag names. An empty tag set yields `None` so
/// storage keeps an absent column rather than an empty string.
pub fn split_inline_tags(note: &str) -> (String, Option<String>) {
    let mut tags = BTreeSet::new();
    for captures in INLINE_TAG_RE.captures_iter(note) {
        if let Some(tag) = captures.get(1) {
            tags.insert(tag.as_str().to_lowercase());
        }
    }

    let stripped = INLINE_TAG_RE.replace_all(note, "");
    let cleaned = WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string();

    let joined = if tags.is_empty() {
        None
    } else {
        Some(tags.into_iter().collect::<Vec<_>>().join(","))
    };

    (cleaned, joined)
}
