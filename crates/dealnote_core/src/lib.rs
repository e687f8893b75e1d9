//! Core domain logic for DealNote.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod extract;
pub mod logging;
pub mod model;
pub mod repo;
pub mod resolve;
pub mod service;

pub use extract::contract::{ExtractError, ExtractedEntry, Extractor};
pub use logging::{default_log_level, init_logging};
pub use model::deliverable::{
    Deliverable, DeliverableId, DeliverableValidationError, NewDeliverable,
};
pub use model::journal::{
    split_inline_tags, JournalEntry, JournalEntryId, JournalValidationError, NewJournalEntry,
};
pub use repo::deliverable_repo::{
    DeliverableRepository, DescriptionMatch, RepoError, RepoResult, SqliteDeliverableRepository,
};
pub use repo::journal_repo::{JournalRepository, SqliteJournalRepository};
pub use resolve::dependency::{
    AlwaysApprove, AlwaysDecline, DecisionProvider, DependencyResolver, Resolution,
    ResolutionWarning, TieBreak,
};
pub use service::ingest_service::{
    IngestError, IngestOutcome, IngestService, RecordEntryRequest, RecordOutcome,
};
pub use service::schedule_service::{
    ScheduleRow, ScheduleService, ScheduleTable, NO_DATE_LABEL, UNKNOWN_DEPENDENCY_LABEL,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
