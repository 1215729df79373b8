//! Domain model for travel projects and the places they own.
//!
//! # Responsibility
//! - Define the records shared by repository and service layers.
//! - Define caller inputs (drafts, candidates, patches) separately from
//!   persisted records, so derived fields can never be supplied by callers.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at creation.
//! - A place belongs to exactly one project for its whole lifetime.

pub mod place;
pub mod project;
