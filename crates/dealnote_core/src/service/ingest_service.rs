//! Entry ingestion use-case service.
//!
//! # Responsibility
//! - Journal one logged note and materialize its extracted deliverables.
//! - Zip the positionally aligned task/date/owner/dependency lists.
//!
//! # Invariants
//! - Blank project names are rejected before any store mutation.
//! - Tasks are processed in input order; a later task may resolve against
//!   an earlier task of the same batch.
//! - No transaction spans a batch; an interrupted batch keeps its prefix.

use crate::model::deliverable::NewDeliverable;
use crate::model::journal::{JournalEntryId, NewJournalEntry};
use crate::repo::deliverable_repo::{DeliverableRepository, RepoError};
use crate::repo::journal_repo::JournalRepository;
use crate::resolve::dependency::{DecisionProvider, DependencyResolver};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for ingest use-cases.
#[derive(Debug)]
pub enum IngestError {
    /// Project name is empty after trimming; nothing was written.
    BlankProjectName,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankProjectName => write!(f, "project name must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::BlankProjectName => None,
        }
    }
}

impl From<RepoError> for IngestError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result envelope for one ingested batch.
///
/// `created` counts deliverables materialized from the task list;
/// placeholder rows auto-created during resolution are reported through
/// `warnings` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    pub created: usize,
    pub warnings: Vec<String>,
}

/// Full "log one note" request: journal fields plus the positionally
/// aligned deliverable lists from extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEntryRequest {
    pub project_name: String,
    pub entry_type: String,
    pub raw_note: String,
    pub tags: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub tasks: Vec<String>,
    pub dates: Vec<String>,
    pub owners: Vec<String>,
    pub dependency_descs: Vec<String>,
}

/// Result envelope for [`IngestService::record_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub entry_id: JournalEntryId,
    pub created: usize,
    pub warnings: Vec<String>,
}

/// Ingest service facade over repository implementations.
pub struct IngestService<R, J, D>
where
    R: DeliverableRepository,
    J: JournalRepository,
    D: DecisionProvider,
{
    deliverables: R,
    journal: J,
    decisions: D,
}

impl<R, J, D> IngestService<R, J, D>
where
    R: DeliverableRepository,
    J: JournalRepository,
    D: DecisionProvider,
{
    pub fn new(deliverables: R, journal: J, decisions: D) -> Self {
        Self {
            deliverables,
            journal,
            decisions,
        }
    }

    /// Materializes one deliverable per task from positionally aligned
    /// lists of potentially unequal length.
    ///
    /// # Contract
    /// - Index `i` takes `dates[i]`/`owners[i]`/`dependency_descs[i]` when
    ///   present, else undated/unassigned/no dependency.
    /// - Each task resolves its dependency before its own insert, so later
    ///   tasks can reference earlier tasks of the same batch.
    pub fn ingest(
        &self,
        project_name: &str,
        tasks: &[String],
        dates: &[String],
        owners: &[String],
        dependency_descs: &[String],
    ) -> Result<IngestOutcome, IngestError> {
        if project_name.trim().is_empty() {
            return Err(IngestError::BlankProjectName);
        }

        let resolver = DependencyResolver::new(&self.deliverables, &self.decisions);
        let mut outcome = IngestOutcome::default();

        for (index, task) in tasks.iter().enumerate() {
            let due_date = dates
                .get(index)
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            let owner = owners
                .get(index)
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string);
            let depends_on_desc = dependency_descs.get(index).map(String::as_str);

            let resolution = resolver.resolve(project_name, depends_on_desc)?;
            outcome
                .warnings
                .extend(resolution.warnings.iter().map(ToString::to_string));

            let row = NewDeliverable::new(
                project_name,
                task.clone(),
                due_date,
                owner,
                resolution.depends_on_id,
            );
            self.deliverables.insert(&row)?;
            outcome.created += 1;
        }

        info!(
            "event=ingest module=service status=ok project={project_name} created={} warnings={}",
            outcome.created,
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    /// Journals one note, then ingests its extracted deliverables.
    ///
    /// Extraction failure is handled by the caller: it passes empty lists
    /// and the raw note still lands in the journal.
    pub fn record_entry(&self, request: &RecordEntryRequest) -> Result<RecordOutcome, IngestError> {
        if request.project_name.trim().is_empty() {
            return Err(IngestError::BlankProjectName);
        }

        let mut entry = NewJournalEntry::new(
            request.project_name.clone(),
            request.entry_type.clone(),
            request.raw_note.clone(),
        );
        entry.tags = request.tags.clone();
        entry.metadata = request.metadata.clone();
        let entry_id = self.journal.append(&entry)?;

        let ingested = self.ingest(
            &request.project_name,
            &request.tasks,
            &request.dates,
            &request.owners,
            &request.dependency_descs,
        )?;

        Ok(RecordOutcome {
            entry_id,
            created: ingested.created,
            warnings: ingested.warnings,
        })
    }
}
