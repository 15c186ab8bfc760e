use crate::common::error::Result;
use crate::domain::*;
use async_trait::async_trait;

/// Storage trait for persisting people and the movies they direct.
///
/// Implementations assign ids on create, enforce that a movie's director
/// exists, and refuse to delete a person who still directs movies. People
/// come back with `directed_movies` left as [`Related::NotLoaded`].
#[async_trait]
pub trait Storage: Send + Sync {
    // Person operations
    async fn create_person(&self, person: &mut Person) -> Result<()>;
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>>;
    async fn list_people(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Person>>;
    async fn update_person(&self, person: &Person) -> Result<()>;
    async fn delete_person(&self, id: PersonId) -> Result<()>;

    // Movie operations
    async fn create_movie(&self, movie: &mut Movie) -> Result<()>;
    async fn get_movie(&self, id: MovieId) -> Result<Option<Movie>>;
    async fn list_movies(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Movie>>;
    async fn update_movie(&self, movie: &Movie) -> Result<()>;
    async fn delete_movie(&self, id: MovieId) -> Result<()>;
    async fn get_movies_by_director(&self, director_id: PersonId) -> Result<Vec<Movie>>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<()>;
}

/// Applies `offset`/`limit` to an already ordered listing.
pub(crate) fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    let offset = offset.unwrap_or(0);
    let iter = items.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}
