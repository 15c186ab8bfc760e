use serde::Serialize;

use super::{required_text, MovieId, PersonId};
use crate::common::error::{MovieError, Result};

/// A movie with at most one director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    id: Option<MovieId>,
    title: String,
    director_id: Option<PersonId>,
}

impl Movie {
    pub fn new(title: impl Into<String>, director_id: Option<PersonId>) -> Result<Self> {
        Ok(Self {
            id: None,
            title: required_text("title", title)?,
            director_id,
        })
    }

    pub(crate) fn from_storage(
        id: MovieId,
        title: String,
        director_id: Option<PersonId>,
    ) -> Result<Self> {
        let mut movie = Self::new(title, director_id)?;
        movie.id = Some(id);
        Ok(movie)
    }

    pub fn id(&self) -> Option<MovieId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn director_id(&self) -> Option<PersonId> {
        self.director_id
    }

    pub fn is_directed_by(&self, person: PersonId) -> bool {
        self.director_id == Some(person)
    }

    pub fn retitle(&mut self, title: impl Into<String>) -> Result<()> {
        self.title = required_text("title", title)?;
        Ok(())
    }

    pub fn set_director(&mut self, director_id: Option<PersonId>) {
        self.director_id = director_id;
    }

    pub(crate) fn assign_id(&mut self, id: MovieId) -> Result<()> {
        match self.id {
            Some(existing) => Err(MovieError::Validation(format!(
                "movie already persisted with id {existing}"
            ))),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_movie_requires_title() {
        assert!(matches!(Movie::new(" ", None), Err(MovieError::Validation(_))));

        let ran = Movie::new("Ran", Some(PersonId::new(3))).unwrap();
        assert_eq!(ran.title(), "Ran");
        assert!(ran.is_directed_by(PersonId::new(3)));
        assert!(!ran.is_directed_by(PersonId::new(4)));
    }

    #[test]
    fn test_movie_without_director() {
        let mut movie = Movie::new("Untitled Project", None).unwrap();
        assert_eq!(movie.director_id(), None);

        movie.set_director(Some(PersonId::new(9)));
        assert_eq!(movie.director_id(), Some(PersonId::new(9)));
    }

    #[test]
    fn test_retitle_validates() {
        let mut movie = Movie::new("Alien", None).unwrap();
        assert!(movie.retitle("").is_err());
        assert_eq!(movie.title(), "Alien");
    }
}
