//! Dependency resolution entry points.
//!
//! # Responsibility
//! - Convert free-text dependency descriptions into concrete row links.
//! - Keep the human-decision capability behind an injectable interface.
//!
//! # Invariants
//! - Resolution never fails the enclosing ingest on a missing dependency;
//!   it degrades to an unlinked deliverable with a warning.

pub mod dependency;
