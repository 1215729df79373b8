//! Place repository contract and SQLite implementation.
//!
//! # Invariants
//! - Places of one project are listed in insertion order.
//! - `(project_id, external_id)` is unique at the storage level too.

use crate::model::place::{Place, PlaceId};
use crate::model::project::ProjectId;
use crate::repo::sqlite::{bool_to_int, int_to_bool, parse_uuid, SqliteTravelRepository};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Row};

const PLACE_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    external_id,
    notes,
    visited
FROM places";

/// Repository interface for place rows.
pub trait PlaceRepository {
    /// Appends a place after the project's existing places.
    fn insert_place(&self, place: &Place) -> RepoResult<PlaceId>;
    fn get_place(&self, id: PlaceId) -> RepoResult<Option<Place>>;
    fn list_places(&self, project_id: ProjectId) -> RepoResult<Vec<Place>>;
    fn count_places(&self, project_id: ProjectId) -> RepoResult<usize>;
    /// Writes notes and visited flag. Ownership is never rewritten.
    fn update_place(&self, place: &Place) -> RepoResult<()>;
}

impl PlaceRepository for SqliteTravelRepository<'_> {
    fn insert_place(&self, place: &Place) -> RepoResult<PlaceId> {
        let position: i64 = self.conn().query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM places WHERE project_id = ?1;",
            [place.project_id.to_string()],
            |row| row.get(0),
        )?;

        self.conn().execute(
            "INSERT INTO places (
                id,
                project_id,
                external_id,
                notes,
                visited,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                place.id.to_string(),
                place.project_id.to_string(),
                place.external_id,
                place.notes.as_deref(),
                bool_to_int(place.visited),
                position,
            ],
        )?;

        Ok(place.id)
    }

    fn get_place(&self, id: PlaceId) -> RepoResult<Option<Place>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PLACE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_place_row(row)?));
        }

        Ok(None)
    }

    fn list_places(&self, project_id: ProjectId) -> RepoResult<Vec<Place>> {
        let mut stmt = self.conn().prepare(&format!(
            "{PLACE_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut places = Vec::new();
        while let Some(row) = rows.next()? {
            places.push(parse_place_row(row)?);
        }

        Ok(places)
    }

    fn count_places(&self, project_id: ProjectId) -> RepoResult<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM places WHERE project_id = ?1;",
            [project_id.to_string()],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("invalid place count `{count}`")))
    }

    fn update_place(&self, place: &Place) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE places
             SET
                notes = ?2,
                visited = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                place.id.to_string(),
                place.notes.as_deref(),
                bool_to_int(place.visited),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(place.id));
        }

        Ok(())
    }
}

fn parse_place_row(row: &Row<'_>) -> RepoResult<Place> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    Ok(Place {
        id: parse_uuid(&id_text, "places.id")?,
        project_id: parse_uuid(&project_text, "places.project_id")?,
        external_id: row.get("external_id")?,
        notes: row.get("notes")?,
        visited: int_to_bool(row.get("visited")?, "places.visited")?,
    })
}
