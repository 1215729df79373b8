//! Place domain model.
//!
//! A place references one artwork in the external catalog by `external_id`
//! and tracks whether the traveller has visited it.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a place.
pub type PlaceId = Uuid;

/// Identifier of an artwork in the external catalog.
pub type ExternalId = i64;

/// Persisted place owned by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    /// Owning project. Read-only after creation.
    pub project_id: ProjectId,
    pub external_id: ExternalId,
    pub notes: Option<String>,
    pub visited: bool,
}

/// Caller input for attaching a catalog artwork to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub external_id: ExternalId,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PlaceCandidate {
    pub fn new(external_id: ExternalId) -> Self {
        Self {
            external_id,
            notes: None,
        }
    }

    pub fn with_notes(external_id: ExternalId, notes: impl Into<String>) -> Self {
        Self {
            external_id,
            notes: Some(notes.into()),
        }
    }
}

/// Partial update for a place. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacePatch {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub visited: Option<bool>,
}

impl PlacePatch {
    /// Patch that only changes the visited flag.
    pub fn visited(visited: bool) -> Self {
        Self {
            notes: None,
            visited: Some(visited),
        }
    }

    /// Patch that only replaces notes.
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            visited: None,
        }
    }
}
