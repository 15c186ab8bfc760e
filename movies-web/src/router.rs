use axum::{
    http::header,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{
    create_movie, create_person, delete_movie, delete_person, error_page, healthz, index,
    movie_page, movies_list, people_list, person_page, rename_person, update_movie,
};
use crate::middleware::{self, hsts_header, ERROR_PATH};
use crate::state::AppState;

pub const HEALTH_PATH: &str = "/healthz";

/// Builds the full request pipeline.
///
/// Outermost first: request tracing, https redirection, HSTS (production),
/// then the page routes, which in production turn internal errors into a
/// redirect to the error page. The health check and static assets sit outside
/// the error-page handling.
pub fn app_router(state: AppState, config: &AppConfig) -> Router {
    let production = !config.environment.is_development();

    let mut pages = Router::new()
        .route("/", get(index))
        .route("/people", get(people_list).post(create_person))
        .route("/people/:id", get(person_page).post(rename_person))
        .route("/people/:id/delete", post(delete_person))
        .route("/movies", get(movies_list).post(create_movie))
        .route("/movies/:id", get(movie_page).post(update_movie))
        .route("/movies/:id/delete", post(delete_movie))
        .route(ERROR_PATH, get(error_page));

    if production {
        pages = pages.layer(from_fn(middleware::error_page));
    }

    let mut app = pages
        .route(HEALTH_PATH, get(healthz))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .with_state(state);

    if production {
        app = app.layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            hsts_header(config.hsts_max_age_secs),
        ));
    }

    app.layer(from_fn(middleware::https_redirect))
        .layer(TraceLayer::new_for_http())
}
