//! Place rules engine.
//!
//! # Responsibility
//! - Validate candidate places against the catalog and each other.
//! - Attach places to existing projects within the place-count bound.
//! - Apply partial place updates and re-derive project completion.
//!
//! # Invariants
//! - External ids are unique within one project.
//! - A project never holds more than `PlaceLimits::max_places_per_project`.
//! - `completed` only moves forward: marking the last unvisited place visited
//!   sets it in the same unit of work, and nothing here ever clears it.
//! - Catalog lookups run outside repository units of work.

use crate::catalog::{CatalogProvider, ValidationCache};
use crate::model::place::{Place, PlaceCandidate, PlaceId, PlacePatch};
use crate::model::project::ProjectId;
use crate::repo::TravelRepository;
use crate::service::error::{TripServiceError, TripServiceResult};
use crate::service::PlaceLimits;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Checks a candidate list before any persistence.
///
/// Duplicates are detected over the whole list first, so a repeated id is
/// reported as `DuplicateExternalId` even when the catalog would reject it.
/// Only then is each id checked against the catalog, in list order.
pub fn validate_candidate_places<P: CatalogProvider>(
    validator: &ValidationCache<P>,
    candidates: &[PlaceCandidate],
) -> TripServiceResult<()> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.insert(candidate.external_id) {
            return Err(TripServiceError::DuplicateExternalId(candidate.external_id));
        }
    }

    for candidate in candidates {
        if !validator.is_valid_place(candidate.external_id) {
            return Err(TripServiceError::CatalogPlaceNotFound(
                candidate.external_id,
            ));
        }
    }

    Ok(())
}

/// Place use-case service.
pub struct PlaceService<R: TravelRepository, P: CatalogProvider> {
    repo: R,
    validator: Arc<ValidationCache<P>>,
    limits: PlaceLimits,
}

impl<R: TravelRepository, P: CatalogProvider> PlaceService<R, P> {
    pub fn new(repo: R, validator: Arc<ValidationCache<P>>, limits: PlaceLimits) -> Self {
        Self {
            repo,
            validator,
            limits,
        }
    }

    /// Attaches one catalog artwork to an existing project.
    ///
    /// Checks run in this order: project exists, capacity, catalog existence,
    /// uniqueness within the project. Existence and capacity are re-checked
    /// inside the write unit together with uniqueness.
    pub fn add_place(
        &self,
        project_id: ProjectId,
        candidate: PlaceCandidate,
    ) -> TripServiceResult<Place> {
        let result = self.add_place_inner(project_id, candidate);
        match &result {
            Ok(place) => info!(
                "event=place_add module=service status=ok project_id={project_id} place_id={} external_id={}",
                place.id, place.external_id
            ),
            Err(err) => warn!(
                "event=place_add module=service status=rejected project_id={project_id} error_code={}",
                err.error_code()
            ),
        }
        result
    }

    fn add_place_inner(
        &self,
        project_id: ProjectId,
        candidate: PlaceCandidate,
    ) -> TripServiceResult<Place> {
        if !self.repo.project_exists(project_id)? {
            return Err(TripServiceError::ProjectNotFound(project_id));
        }
        self.ensure_room_for_one_more(self.repo.count_places(project_id)?)?;

        if !self.validator.is_valid_place(candidate.external_id) {
            return Err(TripServiceError::CatalogPlaceNotFound(
                candidate.external_id,
            ));
        }

        self.repo.atomically(|repo| -> TripServiceResult<Place> {
            if !repo.project_exists(project_id)? {
                return Err(TripServiceError::ProjectNotFound(project_id));
            }
            let places = repo.list_places(project_id)?;
            self.ensure_room_for_one_more(places.len())?;
            if places
                .iter()
                .any(|place| place.external_id == candidate.external_id)
            {
                return Err(TripServiceError::DuplicatePlace(candidate.external_id));
            }

            let place = Place {
                id: Uuid::new_v4(),
                project_id,
                external_id: candidate.external_id,
                notes: candidate.notes,
                visited: false,
            };
            repo.insert_place(&place)?;
            Ok(place)
        })
    }

    /// Applies a partial update to one place of a project.
    ///
    /// Setting `visited = true` marks the project completed once every place
    /// is visited. An already completed project is never reset.
    pub fn update_place(
        &self,
        project_id: ProjectId,
        place_id: PlaceId,
        patch: PlacePatch,
    ) -> TripServiceResult<Place> {
        let marks_visited = patch.visited == Some(true);
        let result = self.repo.atomically(|repo| -> TripServiceResult<Place> {
            let mut place = load_owned_place(repo, project_id, place_id)?;
            if let Some(notes) = patch.notes {
                place.notes = Some(notes);
            }
            if let Some(visited) = patch.visited {
                place.visited = visited;
            }
            repo.update_place(&place)?;

            if marks_visited {
                let places = repo.list_places(project_id)?;
                if places.iter().all(|place| place.visited) {
                    repo.set_project_completed(project_id, true)?;
                }
            }
            Ok(place)
        });

        match &result {
            Ok(place) => info!(
                "event=place_update module=service status=ok project_id={project_id} place_id={place_id} visited={}",
                place.visited
            ),
            Err(err) => warn!(
                "event=place_update module=service status=rejected project_id={project_id} place_id={place_id} error_code={}",
                err.error_code()
            ),
        }
        result
    }

    /// Lists the places of an existing project in insertion order.
    pub fn list_places(&self, project_id: ProjectId) -> TripServiceResult<Vec<Place>> {
        self.repo
            .get_project(project_id)?
            .map(|project| project.places)
            .ok_or(TripServiceError::ProjectNotFound(project_id))
    }

    /// Gets one place, treating a place owned by another project as absent.
    pub fn get_place(&self, project_id: ProjectId, place_id: PlaceId) -> TripServiceResult<Place> {
        load_owned_place(&self.repo, project_id, place_id)
    }

    fn ensure_room_for_one_more(&self, current: usize) -> TripServiceResult<()> {
        if current >= self.limits.max_places_per_project {
            return Err(TripServiceError::CapacityExceeded {
                max_places: self.limits.max_places_per_project,
            });
        }
        Ok(())
    }
}

fn load_owned_place<R: TravelRepository>(
    repo: &R,
    project_id: ProjectId,
    place_id: PlaceId,
) -> TripServiceResult<Place> {
    repo.get_place(place_id)?
        .filter(|place| place.project_id == project_id)
        .ok_or(TripServiceError::PlaceNotFound {
            project_id,
            place_id,
        })
}
