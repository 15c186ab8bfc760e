// View models for the askama templates, plus the form payloads.
// Form fields default to empty so a missing field never pre-empts the
// anti-forgery check; blank values are rejected by the domain afterwards.
use movies_core::service::MovieListing;
use movies_core::{Movie, MovieError, Person, PersonId};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct WebPerson {
    pub id: i64,
    pub name: String,
}

impl WebPerson {
    pub fn from_person(person: &Person) -> Option<Self> {
        Some(Self {
            id: person.id()?.get(),
            name: person.name().to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WebMovie {
    pub id: i64,
    pub title: String,
    pub director: Option<WebPerson>,
}

impl WebMovie {
    pub fn from_movie(movie: &Movie, director: Option<&Person>) -> Option<Self> {
        Some(Self {
            id: movie.id()?.get(),
            title: movie.title().to_string(),
            director: director.and_then(WebPerson::from_person),
        })
    }

    pub fn from_listing(listing: &MovieListing) -> Option<Self> {
        Self::from_movie(&listing.movie, listing.director.as_ref())
    }
}

/// One `<option>` of the director picker.
#[derive(Debug, Clone)]
pub struct DirectorOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

impl DirectorOption {
    pub fn list(people: &[Person], selected: Option<PersonId>) -> Vec<Self> {
        people
            .iter()
            .filter_map(|p| {
                let id = p.id()?;
                Some(Self {
                    id: id.get(),
                    name: p.name().to_string(),
                    selected: Some(id) == selected,
                })
            })
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct PersonForm {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

#[derive(Deserialize, Debug)]
pub struct MovieForm {
    #[serde(default)]
    pub title: String,
    /// Empty string means "no director".
    #[serde(default)]
    pub director_id: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

impl MovieForm {
    pub fn director(&self) -> Result<Option<PersonId>, MovieError> {
        let raw = self.director_id.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<i64>()
            .map(|id| Some(PersonId::new(id)))
            .map_err(|_| MovieError::Validation(format!("invalid director id '{raw}'")))
    }
}

#[derive(Deserialize, Debug)]
pub struct DeleteForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}
