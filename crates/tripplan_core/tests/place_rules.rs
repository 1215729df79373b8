use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tripplan_core::db::open_db_in_memory;
use tripplan_core::{
    CatalogLookup, CatalogProvider, PlaceCandidate, PlaceLimits, PlacePatch, PlaceService,
    ProjectDraft, ProjectService, SqliteTravelRepository, TripServiceError, ValidationCache,
};
use uuid::Uuid;

struct KnownArtworks {
    known: HashSet<i64>,
    calls: AtomicUsize,
}

impl KnownArtworks {
    fn with_known(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            known: ids.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl CatalogProvider for KnownArtworks {
    fn lookup(&self, external_id: i64) -> CatalogLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.known.contains(&external_id) {
            CatalogLookup::Found
        } else {
            CatalogLookup::NotFound
        }
    }
}

#[test]
fn added_place_is_appended_unvisited() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([10, 20])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let project = projects
        .create_project(ProjectDraft::named("Growing").with_place(PlaceCandidate::new(10)))
        .unwrap();

    let added = places
        .add_place(project.id, PlaceCandidate::with_notes(20, "second floor"))
        .unwrap();

    assert_eq!(added.project_id, project.id);
    assert_eq!(added.external_id, 20);
    assert_eq!(added.notes.as_deref(), Some("second floor"));
    assert!(!added.visited);

    let listed = places.list_places(project.id).unwrap();
    assert_eq!(
        listed.iter().map(|place| place.external_id).collect::<Vec<_>>(),
        vec![10, 20]
    );
    assert_eq!(places.get_place(project.id, added.id).unwrap(), added);
}

#[test]
fn duplicate_place_is_rejected_and_list_is_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([10])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let project = projects
        .create_project(ProjectDraft::named("Once").with_place(PlaceCandidate::new(10)))
        .unwrap();

    let err = places
        .add_place(project.id, PlaceCandidate::new(10))
        .unwrap_err();

    assert!(matches!(err, TripServiceError::DuplicatePlace(10)));
    assert_eq!(err.error_code(), "duplicate_place");
    assert_eq!(places.list_places(project.id).unwrap(), project.places);
}

#[test]
fn unknown_artwork_is_rejected_and_list_is_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([10])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let project = projects
        .create_project(ProjectDraft::named("Strict").with_place(PlaceCandidate::new(10)))
        .unwrap();

    let err = places
        .add_place(project.id, PlaceCandidate::new(404))
        .unwrap_err();

    assert!(matches!(err, TripServiceError::CatalogPlaceNotFound(404)));
    assert_eq!(err.error_code(), "catalog_place_not_found");
    assert_eq!(places.list_places(project.id).unwrap().len(), 1);
}

#[test]
fn full_project_rejects_new_place_before_catalog_call() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known(1..=11)));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache.clone(), PlaceLimits::default());

    let mut draft = ProjectDraft::named("Full");
    for external_id in 1..=10 {
        draft = draft.with_place(PlaceCandidate::new(external_id));
    }
    let project = projects.create_project(draft).unwrap();
    let calls_before = cache.provider().calls.load(Ordering::SeqCst);

    let err = places
        .add_place(project.id, PlaceCandidate::new(11))
        .unwrap_err();

    assert!(matches!(
        err,
        TripServiceError::CapacityExceeded { max_places: 10 }
    ));
    assert_eq!(cache.provider().calls.load(Ordering::SeqCst), calls_before);
    assert_eq!(places.list_places(project.id).unwrap().len(), 10);
}

#[test]
fn adding_to_missing_project_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([10])));
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let missing = Uuid::new_v4();

    let err = places
        .add_place(missing, PlaceCandidate::new(10))
        .unwrap_err();
    assert!(matches!(err, TripServiceError::ProjectNotFound(id) if id == missing));

    assert!(matches!(
        places.list_places(missing).unwrap_err(),
        TripServiceError::ProjectNotFound(_)
    ));
}

#[test]
fn adding_to_completed_project_keeps_completed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([1, 2])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let project = projects
        .create_project(ProjectDraft::named("Done").with_place(PlaceCandidate::new(1)))
        .unwrap();
    places
        .update_place(project.id, project.places[0].id, PlacePatch::visited(true))
        .unwrap();

    places.add_place(project.id, PlaceCandidate::new(2)).unwrap();

    let reloaded = projects.get_project(project.id).unwrap();
    assert!(reloaded.completed);
    assert!(!reloaded.all_places_visited());
}

#[test]
fn revisiting_a_place_never_clears_completed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([1, 2])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let project = projects
        .create_project(ProjectDraft::named("Revisit").with_place(PlaceCandidate::new(1)))
        .unwrap();
    let first = project.places[0].id;
    places
        .update_place(project.id, first, PlacePatch::visited(true))
        .unwrap();
    places.add_place(project.id, PlaceCandidate::new(2)).unwrap();
    assert!(projects.get_project(project.id).unwrap().completed);

    places
        .update_place(project.id, first, PlacePatch::visited(true))
        .unwrap();

    let reloaded = projects.get_project(project.id).unwrap();
    assert!(reloaded.completed);
    assert!(!reloaded.all_places_visited());
}

#[test]
fn configured_limit_is_enforced_on_add() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([1, 2, 3])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::new(2));
    let places = PlaceService::new(repo, cache.clone(), PlaceLimits::new(2));
    let project = projects
        .create_project(ProjectDraft::named("Pair").with_place(PlaceCandidate::new(1)))
        .unwrap();

    places.add_place(project.id, PlaceCandidate::new(2)).unwrap();
    let err = places
        .add_place(project.id, PlaceCandidate::new(3))
        .unwrap_err();

    assert!(matches!(
        err,
        TripServiceError::CapacityExceeded { max_places: 2 }
    ));
    assert_eq!(places.list_places(project.id).unwrap().len(), 2);
    assert_eq!(cache.provider().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn notes_only_update_keeps_visited_and_completion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([1])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let project = projects
        .create_project(
            ProjectDraft::named("Notes").with_place(PlaceCandidate::with_notes(1, "first")),
        )
        .unwrap();
    let place_id = project.places[0].id;

    let updated = places
        .update_place(project.id, place_id, PlacePatch::notes("bring sketchbook"))
        .unwrap();

    assert_eq!(updated.notes.as_deref(), Some("bring sketchbook"));
    assert!(!updated.visited);
    assert!(!projects.get_project(project.id).unwrap().completed);
    assert_eq!(places.get_place(project.id, place_id).unwrap(), updated);
}

#[test]
fn place_of_another_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([1, 2])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache, PlaceLimits::default());
    let owner = projects
        .create_project(ProjectDraft::named("Owner").with_place(PlaceCandidate::new(1)))
        .unwrap();
    let other = projects
        .create_project(ProjectDraft::named("Other").with_place(PlaceCandidate::new(2)))
        .unwrap();
    let place_id = owner.places[0].id;

    let err = places.get_place(other.id, place_id).unwrap_err();
    assert!(matches!(
        err,
        TripServiceError::PlaceNotFound { project_id, place_id: missing }
            if project_id == other.id && missing == place_id
    ));
    assert_eq!(err.error_code(), "place_not_found");

    let err = places
        .update_place(other.id, place_id, PlacePatch::visited(true))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!places.get_place(owner.id, place_id).unwrap().visited);
    assert!(!projects.get_project(other.id).unwrap().completed);
}

#[test]
fn lookups_are_shared_across_projects() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTravelRepository::try_new(&conn).unwrap();
    let cache = Arc::new(ValidationCache::new(KnownArtworks::with_known([42])));
    let projects = ProjectService::new(repo, cache.clone(), PlaceLimits::default());
    let places = PlaceService::new(repo, cache.clone(), PlaceLimits::default());

    let first = projects.create_project(ProjectDraft::named("A")).unwrap();
    let second = projects.create_project(ProjectDraft::named("B")).unwrap();
    places.add_place(first.id, PlaceCandidate::new(42)).unwrap();
    places.add_place(second.id, PlaceCandidate::new(42)).unwrap();

    assert_eq!(cache.provider().calls.load(Ordering::SeqCst), 1);
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}
