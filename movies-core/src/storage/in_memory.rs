use super::traits::{paginate, Storage};
use crate::common::error::{MovieError, Result};
use crate::domain::*;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Default)]
struct Tables {
    people: BTreeMap<PersonId, Person>,
    movies: BTreeMap<MovieId, Movie>,
    next_person_id: i64,
    next_movie_id: i64,
}

impl Tables {
    fn check_director(&self, director_id: Option<PersonId>) -> Result<()> {
        match director_id {
            Some(id) if !self.people.contains_key(&id) => Err(MovieError::Integrity(format!(
                "director {id} does not exist"
            ))),
            _ => Ok(()),
        }
    }
}

/// In-memory storage implementation for development/testing
///
/// Both tables live behind one lock so the director check and the write it
/// guards happen atomically.
#[derive(Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_person(&self, person: &mut Person) -> Result<()> {
        let mut tables = self.tables();
        let id = PersonId::new(tables.next_person_id + 1);
        person.assign_id(id)?;
        tables.next_person_id = id.get();

        tables.people.insert(id, stored_person(person)?);

        debug!("Created person: {} with id {}", person.name(), id);
        Ok(())
    }

    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        Ok(self.tables().people.get(&id).cloned())
    }

    async fn list_people(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Person>> {
        let mut people: Vec<Person> = self.tables().people.values().cloned().collect();
        people.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        Ok(paginate(people, limit, offset))
    }

    async fn update_person(&self, person: &Person) -> Result<()> {
        let id = person.id().ok_or_else(|| {
            MovieError::Validation("Cannot update person without ID".to_string())
        })?;

        let mut tables = self.tables();
        if !tables.people.contains_key(&id) {
            return Err(MovieError::person_not_found(id));
        }
        tables.people.insert(id, stored_person(person)?);

        debug!("Updated person: {} with id {}", person.name(), id);
        Ok(())
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        let mut tables = self.tables();
        if !tables.people.contains_key(&id) {
            return Err(MovieError::person_not_found(id));
        }

        let directed = tables.movies.values().filter(|m| m.is_directed_by(id)).count();
        if directed > 0 {
            return Err(MovieError::Conflict(format!(
                "person {id} still directs {directed} movie(s)"
            )));
        }

        tables.people.remove(&id);
        debug!("Deleted person with id {}", id);
        Ok(())
    }

    async fn create_movie(&self, movie: &mut Movie) -> Result<()> {
        let mut tables = self.tables();
        tables.check_director(movie.director_id())?;

        let id = MovieId::new(tables.next_movie_id + 1);
        movie.assign_id(id)?;
        tables.next_movie_id = id.get();
        tables.movies.insert(id, movie.clone());

        debug!("Created movie: {} with id {}", movie.title(), id);
        Ok(())
    }

    async fn get_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        Ok(self.tables().movies.get(&id).cloned())
    }

    async fn list_movies(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Movie>> {
        let mut movies: Vec<Movie> = self.tables().movies.values().cloned().collect();
        movies.sort_by(|a, b| a.title().cmp(b.title()).then(a.id().cmp(&b.id())));
        Ok(paginate(movies, limit, offset))
    }

    async fn update_movie(&self, movie: &Movie) -> Result<()> {
        let id = movie.id().ok_or_else(|| {
            MovieError::Validation("Cannot update movie without ID".to_string())
        })?;

        let mut tables = self.tables();
        if !tables.movies.contains_key(&id) {
            return Err(MovieError::movie_not_found(id));
        }
        tables.check_director(movie.director_id())?;
        tables.movies.insert(id, movie.clone());

        debug!("Updated movie: {} with id {}", movie.title(), id);
        Ok(())
    }

    async fn delete_movie(&self, id: MovieId) -> Result<()> {
        match self.tables().movies.remove(&id) {
            Some(_) => {
                debug!("Deleted movie with id {}", id);
                Ok(())
            }
            None => Err(MovieError::movie_not_found(id)),
        }
    }

    async fn get_movies_by_director(&self, director_id: PersonId) -> Result<Vec<Movie>> {
        let tables = self.tables();
        let mut movies: Vec<Movie> = tables
            .movies
            .values()
            .filter(|m| m.is_directed_by(director_id))
            .cloned()
            .collect();
        movies.sort_by(|a, b| a.title().cmp(b.title()).then(a.id().cmp(&b.id())));
        Ok(movies)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Copy kept in the table; the loaded relationship is never stored.
fn stored_person(person: &Person) -> Result<Person> {
    let id = person
        .id()
        .ok_or_else(|| MovieError::Validation("person has no id".to_string()))?;
    Person::from_storage(id, person.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let storage = InMemoryStorage::new();
        let mut ids = Vec::new();
        for name in ["Ridley Scott", "Akira Kurosawa", "Ridley Scott"] {
            let mut person = Person::new(name).unwrap();
            storage.create_person(&mut person).await.unwrap();
            ids.push(person.id().unwrap());
        }
        assert_eq!(ids, vec![PersonId::new(1), PersonId::new(2), PersonId::new(3)]);
    }

    #[tokio::test]
    async fn test_create_rejects_already_persisted_person() {
        let storage = InMemoryStorage::new();
        let mut person = Person::new("Ridley Scott").unwrap();
        storage.create_person(&mut person).await.unwrap();

        let err = storage.create_person(&mut person).await.unwrap_err();
        assert!(matches!(err, MovieError::Validation(_)));
        assert_eq!(storage.list_people(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stored_person_drops_loaded_movies() {
        let storage = InMemoryStorage::new();
        let mut person = Person::new("Akira Kurosawa").unwrap();
        storage.create_person(&mut person).await.unwrap();
        let id = person.id().unwrap();

        let loaded = person.with_directed_movies(Vec::new()).unwrap();
        storage.update_person(&loaded).await.unwrap();

        let fetched = storage.get_person(id).await.unwrap().unwrap();
        assert_eq!(fetched.directed_movies(), &Related::NotLoaded);
    }

    #[tokio::test]
    async fn test_movie_requires_existing_director() {
        let storage = InMemoryStorage::new();
        let mut movie = Movie::new("Ran", Some(PersonId::new(42))).unwrap();

        let err = storage.create_movie(&mut movie).await.unwrap_err();
        assert!(matches!(err, MovieError::Integrity(_)));
        assert_eq!(movie.id(), None);
    }

    #[tokio::test]
    async fn test_delete_person_is_restricted_by_movies() {
        let storage = InMemoryStorage::new();
        let mut kurosawa = Person::new("Akira Kurosawa").unwrap();
        storage.create_person(&mut kurosawa).await.unwrap();
        let id = kurosawa.id().unwrap();

        let mut ran = Movie::new("Ran", Some(id)).unwrap();
        storage.create_movie(&mut ran).await.unwrap();

        let err = storage.delete_person(id).await.unwrap_err();
        assert!(matches!(err, MovieError::Conflict(_)));

        storage.delete_movie(ran.id().unwrap()).await.unwrap();
        storage.delete_person(id).await.unwrap();
        assert!(storage.get_person(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_is_sorted_and_paginated() {
        let storage = InMemoryStorage::new();
        for title in ["Seven Samurai", "Alien", "Ran", "Blade Runner"] {
            let mut movie = Movie::new(title, None).unwrap();
            storage.create_movie(&mut movie).await.unwrap();
        }

        let page: Vec<String> = storage
            .list_movies(Some(2), Some(1))
            .await
            .unwrap()
            .iter()
            .map(|m| m.title().to_string())
            .collect();
        assert_eq!(page, vec!["Blade Runner", "Ran"]);
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let storage = InMemoryStorage::new();
        assert!(matches!(
            storage.delete_movie(MovieId::new(5)).await,
            Err(MovieError::NotFound { entity: "Movie", id: 5 })
        ));
        assert!(matches!(
            storage.delete_person(PersonId::new(5)).await,
            Err(MovieError::NotFound { entity: "Person", id: 5 })
        ));
    }
}
