//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Project reads are hydrated with places ordered by `position ASC`.
//! - Project listing is ordered by creation (`rowid ASC`).
//! - Deleting a project relies on `ON DELETE CASCADE` for its places.

use crate::model::project::{Project, ProjectId};
use crate::repo::place_repo::PlaceRepository;
use crate::repo::sqlite::{bool_to_int, int_to_bool, parse_uuid, SqliteTravelRepository};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    start_date,
    completed
FROM projects";

/// Repository interface for project rows.
pub trait ProjectRepository {
    /// Inserts the project row. Places are inserted separately.
    fn insert_project(&self, project: &Project) -> RepoResult<ProjectId>;
    /// Loads one project with its places.
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Checks for the project row without loading places.
    fn project_exists(&self, id: ProjectId) -> RepoResult<bool>;
    /// Lists all projects with their places.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Writes name, description, start date and completed flag.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    /// Writes only the derived completed flag.
    fn set_project_completed(&self, id: ProjectId, completed: bool) -> RepoResult<()>;
    /// Deletes the project and, by cascade, its places.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

impl ProjectRepository for SqliteTravelRepository<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn().execute(
            "INSERT INTO projects (
                id,
                name,
                description,
                start_date,
                completed
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.description.as_deref(),
                project.start_date,
                bool_to_int(project.completed),
            ],
        )?;

        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut project = parse_project_row(row)?;
            project.places = self.list_places(project.id)?;
            return Ok(Some(project));
        }

        Ok(None)
    }

    fn project_exists(&self, id: ProjectId) -> RepoResult<bool> {
        let exists: i64 = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            let mut project = parse_project_row(row)?;
            project.places = self.list_places(project.id)?;
            projects.push(project);
        }

        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn().execute(
            "UPDATE projects
             SET
                name = ?2,
                description = ?3,
                start_date = ?4,
                completed = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.description.as_deref(),
                project.start_date,
                bool_to_int(project.completed),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }

        Ok(())
    }

    fn set_project_completed(&self, id: ProjectId, completed: bool) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE projects
             SET
                completed = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), bool_to_int(completed)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let project = Project {
        id: parse_uuid(&id_text, "projects.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        completed: int_to_bool(row.get("completed")?, "projects.completed")?,
        places: Vec::new(),
    };
    project.validate()?;
    Ok(project)
}
