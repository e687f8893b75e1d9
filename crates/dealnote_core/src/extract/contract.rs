//! Text-to-structure extraction interface and payload shapes.
//!
//! # Responsibility
//! - Define `Extractor`, the collaborator contract for note parsing.
//! - Decode the structured payload, tolerating missing and short lists.
//!
//! # Invariants
//! - The four deliverable lists are positionally aligned but may have
//!   unequal lengths; callers zip them defensively.
//! - Extraction failure never aborts journaling of the raw note.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structured record produced by extraction for one journal entry.
///
/// Accepts the legacy wire names `deal_name` and `agents` as aliases so
/// payloads produced against the original schema still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntry {
    #[serde(alias = "deal_name")]
    pub project_name: String,
    #[serde(default)]
    pub entry_type: String,
    /// Free-form summary of the note.
    #[serde(default)]
    pub notes: String,
    /// Task descriptions, one deliverable each.
    #[serde(default)]
    pub deliverables: Vec<String>,
    /// ISO 8601 due dates, positionally aligned with `deliverables`.
    #[serde(default)]
    pub dates: Vec<String>,
    /// Responsible agents, positionally aligned with `deliverables`.
    #[serde(default, alias = "agents")]
    pub owners: Vec<String>,
    /// Dependency descriptions, positionally aligned with `deliverables`.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ExtractedEntry {
    /// Decodes a collaborator JSON payload.
    pub fn from_json_str(payload: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(payload)
            .map_err(|err| ExtractError::Decode(format!("payload is not a valid record: {err}")))
    }
}

/// Collaborator failure taxonomy.
#[derive(Debug)]
pub enum ExtractError {
    /// The collaborator could not be reached or refused the request.
    Unavailable(String),
    /// The collaborator answered with a payload outside the contract.
    Decode(String),
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "extraction unavailable: {message}"),
            Self::Decode(message) => write!(f, "extraction payload rejected: {message}"),
        }
    }
}

impl Error for ExtractError {}

/// Text-to-structure collaborator consumed by the ingest flow.
pub trait Extractor {
    fn extract(&self, raw_text: &str) -> Result<ExtractedEntry, ExtractError>;
}
