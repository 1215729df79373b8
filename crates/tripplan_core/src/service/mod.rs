//! Rules engines for travel projects and places.
//!
//! # Responsibility
//! - Validate caller input against catalog data and current entity state.
//! - Run every write as one repository unit of work.
//! - Keep the derived `completed` flag in step with place visits.

pub mod error;
pub mod place_service;
pub mod project_service;

pub const DEFAULT_MAX_PLACES_PER_PROJECT: usize = 10;

/// Place-count bound applied to every project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceLimits {
    pub max_places_per_project: usize,
}

impl Default for PlaceLimits {
    fn default() -> Self {
        Self {
            max_places_per_project: DEFAULT_MAX_PLACES_PER_PROJECT,
        }
    }
}

impl PlaceLimits {
    pub fn new(max_places_per_project: usize) -> Self {
        Self {
            max_places_per_project,
        }
    }
}
