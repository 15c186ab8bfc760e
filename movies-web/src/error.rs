use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use movies_core::MovieError;
use thiserror::Error;
use tracing::{error, warn};

use crate::templates::StatusTemplate;

#[derive(Error, Debug)]
pub enum WebError {
    #[error(transparent)]
    Domain(#[from] MovieError),

    #[error("The form has expired or was not issued by this site")]
    Antiforgery,

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Domain(MovieError::Validation(_)) => StatusCode::BAD_REQUEST,
            WebError::Domain(MovieError::Integrity(_)) => StatusCode::BAD_REQUEST,
            WebError::Domain(MovieError::NotFound { .. }) => StatusCode::NOT_FOUND,
            WebError::Domain(MovieError::Conflict(_)) => StatusCode::CONFLICT,
            WebError::Antiforgery => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Renders a plain status page. Production swaps 5xx pages for `/error`.
pub fn status_page(status: StatusCode, message: String) -> Response {
    let page = StatusTemplate {
        status: status.as_u16(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        message,
    };
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Status page rendering failed: {e}");
            (status, status.canonical_reason().unwrap_or("Error")).into_response()
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }
        status_page(status, self.to_string())
    }
}
