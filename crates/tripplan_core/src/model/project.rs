//! Project domain model.
//!
//! # Invariants
//! - `name` is non-blank.
//! - `completed` is derived from place state and is never part of a caller
//!   input type.

use crate::model::place::{Place, PlaceCandidate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a travel project.
pub type ProjectId = Uuid;

/// Input validation failures for project and place records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Project name is empty after trim.
    BlankProjectName,
    /// Record identifier is the nil UUID.
    NilId,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankProjectName => write!(f, "project name must not be blank"),
            Self::NilId => write!(f, "record id must not be nil"),
        }
    }
}

impl Error for ModelValidationError {}

/// Persisted travel project with its owned places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// True once every owned place has been visited.
    pub completed: bool,
    /// Owned places in insertion order.
    pub places: Vec<Place>,
}

impl Project {
    /// Returns whether the project has places and all of them are visited.
    ///
    /// This is the derivation rule behind `completed`; the stored flag only
    /// follows it when a place is marked visited.
    pub fn all_places_visited(&self) -> bool {
        !self.places.is_empty() && self.places.iter().all(|place| place.visited)
    }

    /// Returns whether any owned place has been visited.
    pub fn has_visited_places(&self) -> bool {
        self.places.iter().any(|place| place.visited)
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId);
        }
        validate_project_name(&self.name)
    }
}

/// Caller input for creating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Initial places, persisted in the given order.
    #[serde(default)]
    pub places: Vec<PlaceCandidate>,
}

impl ProjectDraft {
    /// Creates a draft with a name and no optional fields.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends one initial place candidate.
    pub fn with_place(mut self, candidate: PlaceCandidate) -> Self {
        self.places.push(candidate);
        self
    }
}

/// Partial update for a project. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.start_date.is_none()
    }
}

/// Rejects names that are empty after trim.
pub fn validate_project_name(name: &str) -> Result<(), ModelValidationError> {
    if name.trim().is_empty() {
        return Err(ModelValidationError::BlankProjectName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_project_name, ModelValidationError, Project, ProjectPatch};
    use crate::model::place::Place;
    use uuid::Uuid;

    fn project_with(visited: &[bool]) -> Project {
        let id = Uuid::new_v4();
        Project {
            id,
            name: "Trip".to_string(),
            description: None,
            start_date: None,
            completed: false,
            places: visited
                .iter()
                .enumerate()
                .map(|(index, visited)| Place {
                    id: Uuid::new_v4(),
                    project_id: id,
                    external_id: index as i64 + 1,
                    notes: None,
                    visited: *visited,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_project_is_never_fully_visited() {
        assert!(!project_with(&[]).all_places_visited());
    }

    #[test]
    fn fully_visited_requires_every_place() {
        assert!(!project_with(&[true, false]).all_places_visited());
        assert!(project_with(&[true, true]).all_places_visited());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            validate_project_name("   "),
            Err(ModelValidationError::BlankProjectName)
        );
        assert!(validate_project_name("Chicago Trip").is_ok());
    }

    #[test]
    fn default_patch_is_empty() {
        assert!(ProjectPatch::default().is_empty());
    }
}
