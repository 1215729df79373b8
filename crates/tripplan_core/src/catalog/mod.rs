//! External art-catalog validation.
//!
//! # Responsibility
//! - Define the provider seam used to confirm that an artwork exists.
//! - Memoize provider answers so repeated identifiers cost one outbound call.
//!
//! # Invariants
//! - Provider failures never surface as errors: an unreachable catalog is
//!   reported as `CatalogLookup::Unreachable` and treated as "does not exist".
//! - The cache is an explicit instance owned by the process, not a global.

pub mod cache;
pub mod http;

pub use cache::{CacheStats, ValidationCache, DEFAULT_CACHE_CAPACITY};
pub use http::HttpCatalogProvider;

use crate::model::place::ExternalId;
use std::sync::Arc;

/// Outcome of one catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLookup {
    /// Catalog returned a record for the identifier.
    Found,
    /// Catalog answered that no record exists.
    NotFound,
    /// Catalog could not give a definitive answer.
    Unreachable(String),
}

impl CatalogLookup {
    /// Collapses the outcome to the fail-closed validity answer.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }

    /// Short label used in log events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Unreachable(_) => "unreachable",
        }
    }
}

/// Read-only lookup into the external catalog.
pub trait CatalogProvider: Send + Sync {
    /// Looks up one artwork. Must not panic; transport problems map to
    /// `CatalogLookup::Unreachable`.
    fn lookup(&self, external_id: ExternalId) -> CatalogLookup;
}

impl<P: CatalogProvider + ?Sized> CatalogProvider for Arc<P> {
    fn lookup(&self, external_id: ExternalId) -> CatalogLookup {
        (**self).lookup(external_id)
    }
}

impl<P: CatalogProvider + ?Sized> CatalogProvider for Box<P> {
    fn lookup(&self, external_id: ExternalId) -> CatalogLookup {
        (**self).lookup(external_id)
    }
}
