/// Service worker asset precache route
///
/// Serves the startup-computed list of hashed asset URLs as a small script
/// the service worker imports to know what to precache. The body never
/// changes within a process lifetime, so the handler only copies bytes; the
/// headers tell intermediaries not to cache it so a new deployment's list
/// is picked up immediately.

use crate::api::pwas::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Create the service worker routes
pub fn create_sw_routes() -> Router<AppState> {
    Router::new().route("/sw-assets-precache.js", get(precache_script))
}

/// GET /sw-assets-precache.js
///
/// Returns `const ASSETS = [...];` with caching disabled.
async fn precache_script(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache, max-age=0"),
        ],
        state.assets.script().to_string(),
    )
        .into_response()
}
