//! Extraction collaborator contract.
//!
//! # Responsibility
//! - Define the interface core consumes to turn raw notes into structured
//!   records.
//! - Decode collaborator payloads, tolerating short lists and legacy field
//!   names.
//!
//! # Invariants
//! - Core never talks to a network; implementations live with the caller.

pub mod contract;
