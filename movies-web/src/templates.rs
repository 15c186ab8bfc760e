use askama::Template;

use crate::models::{DirectorOption, WebMovie, WebPerson};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub movies: Vec<WebMovie>,
}

#[derive(Template)]
#[template(path = "people.html")]
pub struct PeopleTemplate {
    pub people: Vec<WebPerson>,
    pub csrf: String,
}

#[derive(Template)]
#[template(path = "person.html")]
pub struct PersonTemplate {
    pub person: WebPerson,
    pub movies: Vec<WebMovie>,
    pub csrf: String,
}

#[derive(Template)]
#[template(path = "movies.html")]
pub struct MoviesTemplate {
    pub movies: Vec<WebMovie>,
    pub directors: Vec<DirectorOption>,
    pub csrf: String,
}

#[derive(Template)]
#[template(path = "movie.html")]
pub struct MovieTemplate {
    pub movie: WebMovie,
    pub directors: Vec<DirectorOption>,
    pub csrf: String,
}

#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
}
