//! Core domain logic for trip planning.
//!
//! Travel projects own places; each place references an artwork in an
//! external art catalog. This crate owns the rules that keep projects and
//! places consistent and the cache in front of catalog validation.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::{
    CacheStats, CatalogLookup, CatalogProvider, HttpCatalogProvider, ValidationCache,
};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::place::{ExternalId, Place, PlaceCandidate, PlaceId, PlacePatch};
pub use model::project::{ModelValidationError, Project, ProjectDraft, ProjectId, ProjectPatch};
pub use repo::{
    PlaceRepository, ProjectRepository, RepoError, RepoResult, SqliteTravelRepository,
    TravelRepository,
};
pub use service::error::{TripServiceError, TripServiceResult};
pub use service::place_service::{validate_candidate_places, PlaceService};
pub use service::project_service::ProjectService;
pub use service::{PlaceLimits, DEFAULT_MAX_PLACES_PER_PROJECT};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
