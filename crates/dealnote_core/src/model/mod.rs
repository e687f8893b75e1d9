//! Domain model for journal entries and deliverables.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repository layer.
//! - Validate insert shapes before any storage mutation.
//!
//! # Invariants
//! - Row identifiers are store-assigned and immutable after insert.
//! - Both tables are append-only; there is no update or delete shape.

pub mod deliverable;
pub mod journal;
