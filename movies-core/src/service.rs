use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::common::error::{MovieError, Result};
use crate::domain::*;
use crate::storage::Storage;

/// A movie paired with its director, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieListing {
    pub movie: Movie,
    pub director: Option<Person>,
}

/// CRUD operations over people and movies, delegating to a [`Storage`].
#[derive(Clone)]
pub struct MovieService {
    storage: Arc<dyn Storage>,
}

impl MovieService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list_people(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Person>> {
        let people = self.storage.list_people(limit, offset).await?;
        debug!("Listed {} people", people.len());
        Ok(people)
    }

    pub async fn get_person(&self, id: PersonId) -> Result<Person> {
        self.storage
            .get_person(id)
            .await?
            .ok_or_else(|| MovieError::person_not_found(id))
    }

    /// Fetches a person with `directed_movies` loaded from storage.
    pub async fn get_person_with_movies(&self, id: PersonId) -> Result<Person> {
        let person = self.get_person(id).await?;
        let movies = self.storage.get_movies_by_director(id).await?;
        debug!("Loaded {} directed movies for person {}", movies.len(), id);
        person.with_directed_movies(movies)
    }

    pub async fn create_person(&self, name: &str) -> Result<Person> {
        let mut person = Person::new(name)?;
        self.storage.create_person(&mut person).await?;
        info!(person_id = ?person.id(), "Created person '{}'", person.name());
        Ok(person)
    }

    pub async fn rename_person(&self, id: PersonId, name: &str) -> Result<Person> {
        let mut person = self.get_person(id).await?;
        person.rename(name)?;
        self.storage.update_person(&person).await?;
        info!(person_id = %id, "Renamed person to '{}'", person.name());
        Ok(person)
    }

    /// Deletes a person. Refused while they still direct any movie.
    pub async fn delete_person(&self, id: PersonId) -> Result<()> {
        self.storage.delete_person(id).await?;
        info!(person_id = %id, "Deleted person");
        Ok(())
    }

    pub async fn list_movies(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Movie>> {
        let movies = self.storage.list_movies(limit, offset).await?;
        debug!("Listed {} movies", movies.len());
        Ok(movies)
    }

    pub async fn get_movie(&self, id: MovieId) -> Result<Movie> {
        self.storage
            .get_movie(id)
            .await?
            .ok_or_else(|| MovieError::movie_not_found(id))
    }

    pub async fn get_movie_with_director(&self, id: MovieId) -> Result<MovieListing> {
        let movie = self.get_movie(id).await?;
        let director = match movie.director_id() {
            Some(director_id) => self.storage.get_person(director_id).await?,
            None => None,
        };
        Ok(MovieListing { movie, director })
    }

    pub async fn list_movies_with_directors(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<MovieListing>> {
        let movies = self.storage.list_movies(limit, offset).await?;

        let mut directors: HashMap<PersonId, Option<Person>> = HashMap::new();
        let mut listings = Vec::with_capacity(movies.len());
        for movie in movies {
            let director = match movie.director_id() {
                Some(id) => match directors.get(&id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let fetched = self.storage.get_person(id).await?;
                        directors.insert(id, fetched.clone());
                        fetched
                    }
                },
                None => None,
            };
            listings.push(MovieListing { movie, director });
        }
        Ok(listings)
    }

    pub async fn create_movie(&self, title: &str, director_id: Option<PersonId>) -> Result<Movie> {
        let mut movie = Movie::new(title, director_id)?;
        self.storage.create_movie(&mut movie).await?;
        info!(movie_id = ?movie.id(), "Created movie '{}'", movie.title());
        Ok(movie)
    }

    pub async fn update_movie(
        &self,
        id: MovieId,
        title: &str,
        director_id: Option<PersonId>,
    ) -> Result<Movie> {
        let mut movie = self.get_movie(id).await?;
        movie.retitle(title)?;
        movie.set_director(director_id);
        self.storage.update_movie(&movie).await?;
        info!(movie_id = %id, "Updated movie '{}'", movie.title());
        Ok(movie)
    }

    pub async fn delete_movie(&self, id: MovieId) -> Result<()> {
        self.storage.delete_movie(id).await?;
        info!(movie_id = %id, "Deleted movie");
        Ok(())
    }

    pub async fn check_health(&self) -> Result<()> {
        self.storage.ping().await
    }
}
