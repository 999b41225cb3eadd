/// HTTP API Layer
///
/// This module provides the HTML routes of the directory. It handles:
/// - PWA record CRUD (list, add, edit, view, delete)
/// - The service worker precache script
/// - The generic error and not-found responses every route falls back to

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

// PWA record CRUD routes
pub mod pwas;

// Service worker asset precache route
pub mod sw;

// Re-export router builders and shared state
pub use pwas::{create_pwa_routes, AppState};
pub use sw::create_sw_routes;

/// Error adapter for the route boundary
///
/// Anything a handler cannot map to an inline form message ends up here:
/// the error chain is logged and the normalized message answers the request
/// on the generic failure page.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {:#}", self.0);
        let body = format!(
            "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Something went wrong</title></head>\n<body><h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back to list</a></p></body>\n</html>\n",
            escape_html(&self.0.to_string()),
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

/// Generic not-found page, used as the router fallback and by the detail
/// route when a record is missing.
pub async fn not_found(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state.views.render_not_found()?;
    Ok((StatusCode::NOT_FOUND, Html(body)).into_response())
}

/// Minimal HTML escaping for error messages interpolated into the failure page
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
