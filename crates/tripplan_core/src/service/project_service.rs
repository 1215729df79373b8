//! Project rules engine.
//!
//! # Responsibility
//! - Create projects together with their initial places.
//! - Apply partial project updates without touching derived state.
//! - Guard deletion of projects that already have visited places.
//!
//! # Invariants
//! - Project names are non-blank and stored trimmed.
//! - Creation persists the project and all accepted places as one unit.
//! - `completed` is never written by this service.

use crate::catalog::{CatalogProvider, ValidationCache};
use crate::model::place::Place;
use crate::model::project::{validate_project_name, Project, ProjectDraft, ProjectId, ProjectPatch};
use crate::repo::TravelRepository;
use crate::service::error::{TripServiceError, TripServiceResult};
use crate::service::place_service::validate_candidate_places;
use crate::service::PlaceLimits;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Project use-case service.
pub struct ProjectService<R: TravelRepository, P: CatalogProvider> {
    repo: R,
    validator: Arc<ValidationCache<P>>,
    limits: PlaceLimits,
}

impl<R: TravelRepository, P: CatalogProvider> ProjectService<R, P> {
    pub fn new(repo: R, validator: Arc<ValidationCache<P>>, limits: PlaceLimits) -> Self {
        Self {
            repo,
            validator,
            limits,
        }
    }

    /// Creates a project with an optional initial batch of places.
    ///
    /// # Contract
    /// - Fails with `Validation` for a blank name.
    /// - Fails with `CapacityExceeded` when the draft has too many places.
    /// - Runs `validate_candidate_places` before anything is written.
    /// - Returns the stored project with places in draft order.
    pub fn create_project(&self, draft: ProjectDraft) -> TripServiceResult<Project> {
        let started_at = Instant::now();
        let result = self.create_project_inner(draft);
        match &result {
            Ok(project) => info!(
                "event=project_create module=service status=ok project_id={} places={} duration_ms={}",
                project.id,
                project.places.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=project_create module=service status=rejected duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                err.error_code()
            ),
        }
        result
    }

    fn create_project_inner(&self, draft: ProjectDraft) -> TripServiceResult<Project> {
        validate_project_name(&draft.name)
            .map_err(|err| TripServiceError::Validation(err.to_string()))?;
        if draft.places.len() > self.limits.max_places_per_project {
            return Err(TripServiceError::CapacityExceeded {
                max_places: self.limits.max_places_per_project,
            });
        }
        validate_candidate_places(&self.validator, &draft.places)?;

        let project = Project {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            start_date: draft.start_date,
            completed: false,
            places: Vec::new(),
        };

        self.repo.atomically(|repo| -> TripServiceResult<Project> {
            repo.insert_project(&project)?;

            // Candidates were already checked for duplicates; this only guards
            // callers that reach persistence some other way.
            let mut seen = HashSet::with_capacity(draft.places.len());
            for candidate in draft.places {
                if !seen.insert(candidate.external_id) {
                    continue;
                }
                repo.insert_place(&Place {
                    id: Uuid::new_v4(),
                    project_id: project.id,
                    external_id: candidate.external_id,
                    notes: candidate.notes,
                    visited: false,
                })?;
            }

            repo.get_project(project.id)?
                .ok_or(TripServiceError::InconsistentState(
                    "created project not found in read-back",
                ))
        })
    }

    /// Applies a partial update. `completed` cannot be changed here.
    pub fn update_project(
        &self,
        project_id: ProjectId,
        patch: ProjectPatch,
    ) -> TripServiceResult<Project> {
        if let Some(name) = patch.name.as_deref() {
            validate_project_name(name)
                .map_err(|err| TripServiceError::Validation(err.to_string()))?;
        }

        let result = self.repo.atomically(|repo| -> TripServiceResult<Project> {
            let mut project = repo
                .get_project(project_id)?
                .ok_or(TripServiceError::ProjectNotFound(project_id))?;
            if patch.is_empty() {
                return Ok(project);
            }

            if let Some(name) = patch.name {
                project.name = name.trim().to_string();
            }
            if let Some(description) = patch.description {
                project.description = Some(description);
            }
            if let Some(start_date) = patch.start_date {
                project.start_date = Some(start_date);
            }
            repo.update_project(&project)?;
            Ok(project)
        });

        if let Err(err) = &result {
            warn!(
                "event=project_update module=service status=rejected project_id={project_id} error_code={}",
                err.error_code()
            );
        }
        result
    }

    /// Deletes a project and its places unless any place was visited.
    pub fn delete_project(&self, project_id: ProjectId) -> TripServiceResult<()> {
        let result = self.repo.atomically(|repo| -> TripServiceResult<()> {
            let project = repo
                .get_project(project_id)?
                .ok_or(TripServiceError::ProjectNotFound(project_id))?;
            if project.has_visited_places() {
                return Err(TripServiceError::HasVisitedPlaces(project_id));
            }
            repo.delete_project(project_id)?;
            Ok(())
        });

        match &result {
            Ok(()) => {
                info!("event=project_delete module=service status=ok project_id={project_id}")
            }
            Err(err) => warn!(
                "event=project_delete module=service status=rejected project_id={project_id} error_code={}",
                err.error_code()
            ),
        }
        result
    }

    /// Lists all projects in creation order.
    pub fn list_projects(&self) -> TripServiceResult<Vec<Project>> {
        self.repo.list_projects().map_err(Into::into)
    }

    pub fn get_project(&self, project_id: ProjectId) -> TripServiceResult<Project> {
        self.repo
            .get_project(project_id)?
            .ok_or(TripServiceError::ProjectNotFound(project_id))
    }
}
