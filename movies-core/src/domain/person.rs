use serde::Serialize;

use super::{required_text, Movie, PersonId, Related};
use crate::common::error::{MovieError, Result};

/// Someone who may have directed movies.
///
/// A `Person` is always constructed with a non-empty name. The id stays `None`
/// until storage persists the record and is fixed from then on. The directed
/// movies start out as [`Related::NotLoaded`] and are only attached by a loader
/// that has actually queried storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    id: Option<PersonId>,
    name: String,
    directed_movies: Related<Movie>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            id: None,
            name: required_text("name", name)?,
            directed_movies: Related::NotLoaded,
        })
    }

    /// Rebuilds a person read back from storage.
    pub(crate) fn from_storage(id: PersonId, name: String) -> Result<Self> {
        let mut person = Self::new(name)?;
        person.id = Some(id);
        Ok(person)
    }

    pub fn id(&self) -> Option<PersonId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directed_movies(&self) -> &Related<Movie> {
        &self.directed_movies
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.name = required_text("name", name)?;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: PersonId) -> Result<()> {
        match self.id {
            Some(existing) => Err(MovieError::Validation(format!(
                "person already persisted with id {existing}"
            ))),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    /// Attaches the movies this person directed.
    ///
    /// Every movie must point back at this person; an unsaved person cannot
    /// own any.
    pub fn with_directed_movies(mut self, movies: Vec<Movie>) -> Result<Self> {
        let id = self.id.ok_or_else(|| {
            MovieError::Integrity("cannot attach movies to an unsaved person".to_string())
        })?;

        if let Some(stray) = movies.iter().find(|m| !m.is_directed_by(id)) {
            return Err(MovieError::Integrity(format!(
                "movie '{}' is not directed by person {id}",
                stray.title()
            )));
        }

        self.directed_movies = Related::Loaded(movies);
        Ok(self)
    }
}
