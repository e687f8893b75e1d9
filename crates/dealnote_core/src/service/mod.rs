//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and resolver calls into use-case level APIs.
//! - Keep CLI layers decoupled from storage details.

pub mod ingest_service;
pub mod schedule_service;
