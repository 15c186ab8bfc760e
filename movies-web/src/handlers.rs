use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use movies_core::{MovieError, MovieId, PersonId};
use tracing::warn;

use crate::antiforgery::FormToken;
use crate::error::{status_page, WebError};
use crate::models::{
    DeleteForm, DirectorOption, ListQuery, MovieForm, PersonForm, WebMovie, WebPerson,
};
use crate::state::AppState;
use crate::templates::{
    IndexTemplate, MovieTemplate, MoviesTemplate, PeopleTemplate, PersonTemplate,
};

type WebResult = Result<Response, WebError>;

const DEFAULT_PAGE_SIZE: usize = 50;

/// Renders a page that embeds a form, refreshing the anti-forgery cookie.
fn form_page(token: &FormToken, html: String) -> Response {
    ([(header::SET_COOKIE, token.cookie())], Html(html)).into_response()
}

fn check_antiforgery(state: &AppState, headers: &HeaderMap, submitted: &str) -> Result<(), WebError> {
    if state.antiforgery.verify(headers, submitted) {
        Ok(())
    } else {
        Err(WebError::Antiforgery)
    }
}

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.check_health().await {
        Ok(()) => (StatusCode::OK, "Healthy"),
        Err(e) => {
            warn!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "Unhealthy")
        }
    }
}

pub async fn error_page() -> Response {
    status_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "An error occurred while processing your request.".to_string(),
    )
}

pub async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> WebResult {
    let listings = state
        .service
        .list_movies_with_directors(Some(query.limit.unwrap_or(DEFAULT_PAGE_SIZE)), query.offset)
        .await?;

    let page = IndexTemplate {
        movies: listings.iter().filter_map(WebMovie::from_listing).collect(),
    };
    Ok(Html(page.render()?).into_response())
}

pub async fn people_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> WebResult {
    let people = state
        .service
        .list_people(Some(query.limit.unwrap_or(DEFAULT_PAGE_SIZE)), query.offset)
        .await?;

    let token = state.antiforgery.issue(&headers);
    let page = PeopleTemplate {
        people: people.iter().filter_map(WebPerson::from_person).collect(),
        csrf: token.value.clone(),
    };
    Ok(form_page(&token, page.render()?))
}

pub async fn create_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PersonForm>,
) -> WebResult {
    check_antiforgery(&state, &headers, &form.csrf)?;

    let person = state.service.create_person(&form.name).await?;
    let id = person
        .id()
        .ok_or_else(|| MovieError::Integrity("created person has no id".to_string()))?;
    Ok(Redirect::to(&format!("/people/{id}")).into_response())
}

pub async fn person_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> WebResult {
    let person = state.service.get_person_with_movies(PersonId::new(id)).await?;

    let movies = person
        .directed_movies()
        .as_loaded()
        .unwrap_or_default()
        .iter()
        .filter_map(|m| WebMovie::from_movie(m, Some(&person)))
        .collect();
    let person = WebPerson::from_person(&person)
        .ok_or_else(|| MovieError::Integrity("stored person has no id".to_string()))?;

    let token = state.antiforgery.issue(&headers);
    let page = PersonTemplate {
        person,
        movies,
        csrf: token.value.clone(),
    };
    Ok(form_page(&token, page.render()?))
}

pub async fn rename_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<PersonForm>,
) -> WebResult {
    check_antiforgery(&state, &headers, &form.csrf)?;

    state.service.rename_person(PersonId::new(id), &form.name).await?;
    Ok(Redirect::to(&format!("/people/{id}")).into_response())
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> WebResult {
    check_antiforgery(&state, &headers, &form.csrf)?;

    state.service.delete_person(PersonId::new(id)).await?;
    Ok(Redirect::to("/people").into_response())
}

pub async fn movies_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> WebResult {
    let listings = state
        .service
        .list_movies_with_directors(Some(query.limit.unwrap_or(DEFAULT_PAGE_SIZE)), query.offset)
        .await?;
    let people = state.service.list_people(None, None).await?;

    let token = state.antiforgery.issue(&headers);
    let page = MoviesTemplate {
        movies: listings.iter().filter_map(WebMovie::from_listing).collect(),
        directors: DirectorOption::list(&people, None),
        csrf: token.value.clone(),
    };
    Ok(form_page(&token, page.render()?))
}

pub async fn create_movie(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<MovieForm>,
) -> WebResult {
    check_antiforgery(&state, &headers, &form.csrf)?;

    let movie = state
        .service
        .create_movie(&form.title, form.director()?)
        .await?;
    let id = movie
        .id()
        .ok_or_else(|| MovieError::Integrity("created movie has no id".to_string()))?;
    Ok(Redirect::to(&format!("/movies/{id}")).into_response())
}

pub async fn movie_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> WebResult {
    let listing = state.service.get_movie_with_director(MovieId::new(id)).await?;
    let people = state.service.list_people(None, None).await?;

    let directors = DirectorOption::list(&people, listing.movie.director_id());
    let movie = WebMovie::from_listing(&listing)
        .ok_or_else(|| MovieError::Integrity("stored movie has no id".to_string()))?;

    let token = state.antiforgery.issue(&headers);
    let page = MovieTemplate {
        movie,
        directors,
        csrf: token.value.clone(),
    };
    Ok(form_page(&token, page.render()?))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<MovieForm>,
) -> WebResult {
    check_antiforgery(&state, &headers, &form.csrf)?;

    state
        .service
        .update_movie(MovieId::new(id), &form.title, form.director()?)
        .await?;
    Ok(Redirect::to(&format!("/movies/{id}")).into_response())
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> WebResult {
    check_antiforgery(&state, &headers, &form.csrf)?;

    state.service.delete_movie(MovieId::new(id)).await?;
    Ok(Redirect::to("/movies").into_response())
}
