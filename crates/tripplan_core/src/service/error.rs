//! Error kinds surfaced by the rules engines.

use crate::model::place::{ExternalId, PlaceId};
use crate::model::project::ProjectId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TripServiceResult<T> = Result<T, TripServiceError>;

/// Rules-engine failure. Each variant has a stable `error_code()`.
#[derive(Debug)]
pub enum TripServiceError {
    /// Caller input is malformed, e.g. a blank project name.
    Validation(String),
    /// Referenced project does not exist.
    ProjectNotFound(ProjectId),
    /// Referenced place does not exist or belongs to another project.
    PlaceNotFound {
        project_id: ProjectId,
        place_id: PlaceId,
    },
    /// The same external id appears twice in one candidate list.
    DuplicateExternalId(ExternalId),
    /// The project already holds a place with this external id.
    DuplicatePlace(ExternalId),
    /// The external catalog does not confirm this artwork.
    CatalogPlaceNotFound(ExternalId),
    /// The operation would exceed the per-project place bound.
    CapacityExceeded { max_places: usize },
    /// The project has visited places and cannot be deleted.
    HasVisitedPlaces(ProjectId),
    /// Storage failure.
    Repo(RepoError),
    /// Write succeeded but read-back did not return the record.
    InconsistentState(&'static str),
}

impl TripServiceError {
    /// Stable machine-readable code for callers that translate errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::ProjectNotFound(_) => "project_not_found",
            Self::PlaceNotFound { .. } => "place_not_found",
            Self::DuplicateExternalId(_) => "duplicate_external_id",
            Self::DuplicatePlace(_) => "duplicate_place",
            Self::CatalogPlaceNotFound(_) => "catalog_place_not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::HasVisitedPlaces(_) => "has_visited_places",
            Self::Repo(_) => "storage_error",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }

    /// Whether the error means a referenced project or place is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound(_) | Self::PlaceNotFound { .. }
        )
    }
}

impl Display for TripServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::PlaceNotFound {
                project_id,
                place_id,
            } => write!(f, "place {place_id} not found in project {project_id}"),
            Self::DuplicateExternalId(external_id) => {
                write!(f, "duplicate external_id {external_id}")
            }
            Self::DuplicatePlace(external_id) => {
                write!(f, "place {external_id} already in project")
            }
            Self::CatalogPlaceNotFound(external_id) => {
                write!(f, "place {external_id} not found in art catalog")
            }
            Self::CapacityExceeded { max_places } => {
                write!(f, "max {max_places} places per project")
            }
            Self::HasVisitedPlaces(id) => {
                write!(f, "cannot delete project {id} with visited places")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent travel state: {details}"),
        }
    }
}

impl Error for TripServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TripServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Repo(other),
        }
    }
}
