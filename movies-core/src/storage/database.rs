use super::traits::Storage;
use crate::common::error::{MovieError, Result};
use crate::database::{db_error, is_foreign_key_violation, DatabaseManager};
use crate::domain::*;
use async_trait::async_trait;
use libsql::{Connection, Row};
use std::sync::Arc;
use tracing::{debug, info};

const SELECT_MOVIE: &str = "SELECT id, title, director_id FROM movies";

/// Relational storage on Turso/libSQL: one `people` and one `movies` table,
/// with `movies.director_id` as a restricting foreign key.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub async fn with_manager(db: Arc<DatabaseManager>) -> Result<Self> {
        db.run_migrations().await?;
        Ok(Self { db })
    }

    fn row_to_person(row: &Row) -> Result<Person> {
        let id: i64 = row.get(0).map_err(db_error("Failed to get person id"))?;
        let name: String = row.get(1).map_err(db_error("Failed to get person name"))?;
        Person::from_storage(PersonId::new(id), name)
    }

    fn row_to_movie(row: &Row) -> Result<Movie> {
        let id: i64 = row.get(0).map_err(db_error("Failed to get movie id"))?;
        let title: String = row.get(1).map_err(db_error("Failed to get movie title"))?;
        let director_id: Option<i64> = row
            .get(2)
            .map_err(db_error("Failed to get movie director"))?;
        Movie::from_storage(MovieId::new(id), title, director_id.map(PersonId::new))
    }

    async fn query_people(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Person>> {
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(db_error("Failed to query people"))?;

        let mut people = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_error("Failed to read row"))? {
            people.push(Self::row_to_person(&row)?);
        }
        Ok(people)
    }

    async fn query_movies(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Movie>> {
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(db_error("Failed to query movies"))?;

        let mut movies = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_error("Failed to read row"))? {
            movies.push(Self::row_to_movie(&row)?);
        }
        Ok(movies)
    }

    async fn insert_returning_id(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
        violation: impl Fn() -> MovieError,
    ) -> Result<i64> {
        // With RETURNING the constraint may fail on the first step rather than on prepare
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| write_error(e, "Failed to insert row", &violation))?;

        let row = rows
            .next()
            .await
            .map_err(|e| write_error(e, "Failed to read inserted id", &violation))?
            .ok_or_else(|| MovieError::Database {
                message: "insert returned no id".to_string(),
            })?;
        row.get(0).map_err(db_error("Failed to get inserted id"))
    }
}

/// Foreign keys are enforced by the statement itself, so the check and the
/// write cannot interleave with another connection.
fn write_error(
    e: libsql::Error,
    context: &'static str,
    violation: impl FnOnce() -> MovieError,
) -> MovieError {
    if is_foreign_key_violation(&e) {
        violation()
    } else {
        db_error(context)(e)
    }
}

fn missing_director(director_id: Option<PersonId>) -> MovieError {
    match director_id {
        Some(id) => MovieError::Integrity(format!("director {id} does not exist")),
        None => MovieError::Integrity("director does not exist".to_string()),
    }
}

/// SQLite treats a negative LIMIT as "no limit".
fn limit_offset(limit: Option<usize>, offset: Option<usize>) -> (i64, i64) {
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    let offset = offset.map_or(0, |o| i64::try_from(o).unwrap_or(i64::MAX));
    (limit, offset)
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn create_person(&self, person: &mut Person) -> Result<()> {
        if let Some(existing) = person.id() {
            return Err(MovieError::Validation(format!(
                "person already persisted with id {existing}"
            )));
        }

        let conn = self.db.get_connection().await?;
        let id = Self::insert_returning_id(
            &conn,
            "INSERT INTO people (name) VALUES (?1) RETURNING id",
            libsql::params![person.name()],
            || MovieError::Integrity("person insert broke a foreign key".to_string()),
        )
        .await?;
        person.assign_id(PersonId::new(id))?;

        info!("Created person: {} with id {}", person.name(), id);
        Ok(())
    }

    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        let conn = self.db.get_connection().await?;
        let people = Self::query_people(
            &conn,
            "SELECT id, name FROM people WHERE id = ?1",
            libsql::params![id.get()],
        )
        .await?;
        Ok(people.into_iter().next())
    }

    async fn list_people(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Person>> {
        let conn = self.db.get_connection().await?;
        let (limit, offset) = limit_offset(limit, offset);
        Self::query_people(
            &conn,
            "SELECT id, name FROM people ORDER BY name, id LIMIT ?1 OFFSET ?2",
            libsql::params![limit, offset],
        )
        .await
    }

    async fn update_person(&self, person: &Person) -> Result<()> {
        let id = person.id().ok_or_else(|| {
            MovieError::Validation("Cannot update person without ID".to_string())
        })?;

        let conn = self.db.get_connection().await?;
        let changed = conn
            .execute(
                "UPDATE people SET name = ?1 WHERE id = ?2",
                libsql::params![person.name(), id.get()],
            )
            .await
            .map_err(db_error("Failed to update person"))?;

        if changed == 0 {
            return Err(MovieError::person_not_found(id));
        }

        info!("Updated person: {} with id {}", person.name(), id);
        Ok(())
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        let conn = self.db.get_connection().await?;
        let changed = conn
            .execute("DELETE FROM people WHERE id = ?1", libsql::params![id.get()])
            .await
            .map_err(|e| {
                write_error(e, "Failed to delete person", || {
                    MovieError::Conflict(format!("person {id} still directs movies"))
                })
            })?;

        if changed == 0 {
            return Err(MovieError::person_not_found(id));
        }

        info!("Deleted person with id {}", id);
        Ok(())
    }

    async fn create_movie(&self, movie: &mut Movie) -> Result<()> {
        if let Some(existing) = movie.id() {
            return Err(MovieError::Validation(format!(
                "movie already persisted with id {existing}"
            )));
        }

        let conn = self.db.get_connection().await?;
        let director_id = movie.director_id();
        let id = Self::insert_returning_id(
            &conn,
            "INSERT INTO movies (title, director_id) VALUES (?1, ?2) RETURNING id",
            libsql::params![movie.title(), director_id.map(PersonId::get)],
            || missing_director(director_id),
        )
        .await?;
        movie.assign_id(MovieId::new(id))?;

        info!("Created movie: {} with id {}", movie.title(), id);
        Ok(())
    }

    async fn get_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        let conn = self.db.get_connection().await?;
        let movies = Self::query_movies(
            &conn,
            &format!("{SELECT_MOVIE} WHERE id = ?1"),
            libsql::params![id.get()],
        )
        .await?;
        Ok(movies.into_iter().next())
    }

    async fn list_movies(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Movie>> {
        let conn = self.db.get_connection().await?;
        let (limit, offset) = limit_offset(limit, offset);
        Self::query_movies(
            &conn,
            &format!("{SELECT_MOVIE} ORDER BY title, id LIMIT ?1 OFFSET ?2"),
            libsql::params![limit, offset],
        )
        .await
    }

    async fn update_movie(&self, movie: &Movie) -> Result<()> {
        let id = movie.id().ok_or_else(|| {
            MovieError::Validation("Cannot update movie without ID".to_string())
        })?;

        let conn = self.db.get_connection().await?;
        let director_id = movie.director_id();
        let changed = conn
            .execute(
                "UPDATE movies SET title = ?1, director_id = ?2 WHERE id = ?3",
                libsql::params![movie.title(), director_id.map(PersonId::get), id.get()],
            )
            .await
            .map_err(|e| write_error(e, "Failed to update movie", || missing_director(director_id)))?;

        if changed == 0 {
            return Err(MovieError::movie_not_found(id));
        }

        info!("Updated movie: {} with id {}", movie.title(), id);
        Ok(())
    }

    async fn delete_movie(&self, id: MovieId) -> Result<()> {
        let conn = self.db.get_connection().await?;
        let changed = conn
            .execute("DELETE FROM movies WHERE id = ?1", libsql::params![id.get()])
            .await
            .map_err(db_error("Failed to delete movie"))?;

        if changed == 0 {
            return Err(MovieError::movie_not_found(id));
        }

        info!("Deleted movie with id {}", id);
        Ok(())
    }

    async fn get_movies_by_director(&self, director_id: PersonId) -> Result<Vec<Movie>> {
        let conn = self.db.get_connection().await?;
        let movies = Self::query_movies(
            &conn,
            &format!("{SELECT_MOVIE} WHERE director_id = ?1 ORDER BY title, id"),
            libsql::params![director_id.get()],
        )
        .await?;

        debug!("Loaded {} movies directed by {}", movies.len(), director_id);
        Ok(movies)
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.get_connection().await?;
        let mut rows = conn
            .query("SELECT 1", libsql::params![])
            .await
            .map_err(db_error("Database ping failed"))?;
        rows.next().await.map_err(db_error("Database ping failed"))?;
        Ok(())
    }
}
