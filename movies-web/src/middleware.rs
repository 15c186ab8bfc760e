use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};

pub const ERROR_PATH: &str = "/error";
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Sends plain-http requests arriving through a TLS-terminating proxy to https.
pub async fn https_redirect(req: Request, next: Next) -> Response {
    let forwarded_http = req
        .headers()
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("http"));

    if forwarded_http {
        if let Some(host) = req.headers().get(header::HOST).and_then(|v| v.to_str().ok()) {
            let path = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            let target = format!("https://{host}{path}");
            debug!("Redirecting to {}", target);
            return Redirect::temporary(&target).into_response();
        }
    }

    next.run(req).await
}

/// Replaces internal-error pages with a redirect to the generic error page.
pub async fn error_page(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if response.status() == StatusCode::INTERNAL_SERVER_ERROR && path != ERROR_PATH {
        warn!("Internal error on {}, redirecting to {}", path, ERROR_PATH);
        return Redirect::to(ERROR_PATH).into_response();
    }
    response
}

pub fn hsts_header(max_age_secs: u64) -> HeaderValue {
    // Digits only, always a valid header value
    HeaderValue::from_str(&format!("max-age={max_age_secs}"))
        .unwrap_or_else(|_| HeaderValue::from_static("max-age=2592000"))
}
