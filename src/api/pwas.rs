/// PWA record CRUD routes
///
/// List, add, edit, view, and delete pages for catalogued PWAs. The add and
/// edit submissions run the same short pipeline: validate the form, verify
/// the submitted ID token, stamp the record with the verified user, save.
/// Recoverable failures re-render the form with an inline message; anything
/// else falls through to the generic error adapter.

use crate::{
    api::{not_found, AppError},
    assets::AssetManifest,
    auth::IdTokenVerifier,
    pwa::{Pwa, PwaError, PwaStore},
    views::Views,
};
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Records shown per list page
const LIST_PAGE_SIZE: i64 = 10;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Record store for persistence
    pub store: PwaStore,
    /// ID-token verifier for the add/edit submissions
    pub verifier: Arc<IdTokenVerifier>,
    /// Template renderer
    pub views: Arc<Views>,
    /// Startup-computed service worker asset manifest
    pub assets: Arc<AssetManifest>,
}

/// Query parameters of the list page
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

/// Form body of the add and edit submissions
#[derive(Debug, Deserialize)]
pub struct PwaForm {
    #[serde(rename = "manifestUrl", default)]
    pub manifest_url: String,
    #[serde(rename = "idToken", default)]
    pub id_token: String,
}

/// Create the PWA record routes
pub fn create_pwa_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pwas))
        .route("/add", get(show_add_form).post(create_pwa))
        .route("/{id}/edit", get(show_edit_form).post(update_pwa))
        .route("/{id}", get(show_pwa))
        .route("/{id}/delete", get(delete_pwa))
}

/// Display a page of PWAs (up to ten at a time)
///
/// GET /?pageToken=...
async fn list_pwas(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (pwas, next_page_token) = state
        .store
        .list(LIST_PAGE_SIZE, query.page_token.as_deref())
        .await?;
    let body = state.views.render_list(&pwas, next_page_token.as_deref())?;
    Ok(Html(body).into_response())
}

/// Display a form for creating a PWA
///
/// GET /add
async fn show_add_form(State(state): State<AppState>) -> Result<Response, AppError> {
    render_form(&state, &Pwa::new(""), "Add", None)
}

/// Create a PWA
///
/// POST /add
/// Body: manifestUrl, idToken
async fn create_pwa(
    State(state): State<AppState>,
    Form(form): Form<PwaForm>,
) -> Result<Response, AppError> {
    let mut pwa = Pwa::new(&form.manifest_url);

    if form.manifest_url.is_empty() {
        return render_form(&state, &pwa, "Add", Some("no manifest provided"));
    }
    if form.id_token.is_empty() {
        return render_form(&state, &pwa, "Add", Some("user not logged in"));
    }

    let identity = match state.verifier.verify(&form.id_token).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!("ID token rejected: {}", err);
            return render_form(&state, &pwa, "Add", Some(&err.to_string()));
        }
    };
    pwa.set_user(&identity);

    match state.store.save(pwa.clone()).await {
        Ok(saved) => redirect_to_record(&saved),
        Err(PwaError::AlreadyExists) => {
            render_form(&state, &pwa, "Add", Some("manifest already exists"))
        }
        Err(PwaError::ManifestLoad(_)) => {
            // could be 404, not JSON, domain does not exist
            render_form(&state, &pwa, "Add", Some("error loading manifest"))
        }
        Err(err) => Err(err.into()),
    }
}

/// Display a PWA for editing
///
/// GET /{id}/edit
async fn show_edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let pwa = state.store.find(&id).await?;
    render_form(&state, &pwa, "Edit", None)
}

/// Update a PWA
///
/// POST /{id}/edit
/// Body: manifestUrl, idToken
async fn update_pwa(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PwaForm>,
) -> Result<Response, AppError> {
    let mut pwa = Pwa::new(&form.manifest_url);
    pwa.id = Some(id);

    if form.manifest_url.is_empty() {
        return render_form(&state, &pwa, "Edit", Some("no manifest provided"));
    }
    if form.id_token.is_empty() {
        return render_form(&state, &pwa, "Edit", Some("user not logged in"));
    }

    let identity = match state.verifier.verify(&form.id_token).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!("ID token rejected: {}", err);
            return render_form(&state, &pwa, "Edit", Some(&err.to_string()));
        }
    };
    pwa.set_user(&identity);

    match state.store.save(pwa.clone()).await {
        Ok(saved) => redirect_to_record(&saved),
        Err(PwaError::ManifestLoad(_)) => {
            // could be 404, not JSON, domain does not exist
            render_form(&state, &pwa, "Edit", Some("error loading manifest"))
        }
        // a duplicate manifest is not special-cased here; it surfaces
        // through the generic error page
        Err(err) => Err(err.into()),
    }
}

/// Display a PWA
///
/// GET /{id}
async fn show_pwa(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    match state.store.find(&id).await {
        Ok(pwa) => {
            let body = state.views.render_view(&pwa)?;
            Ok(Html(body).into_response())
        }
        // Not really an error: the record is not in the store. Fall
        // through to the 404 page.
        Err(_) => not_found(State(state)).await,
    }
}

/// Delete a PWA
///
/// GET /{id}/delete
async fn delete_pwa(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.store.delete(&id).await?;
    Ok(Redirect::to("/").into_response())
}

/// Re-render the add/edit form, optionally with an inline error message
fn render_form(
    state: &AppState,
    pwa: &Pwa,
    action: &str,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let body = state.views.render_form(pwa, action, error)?;
    Ok(Html(body).into_response())
}

/// Redirect to the detail page of a freshly saved record
fn redirect_to_record(saved: &Pwa) -> Result<Response, AppError> {
    let id = saved
        .id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("store returned a record without an id"))?;
    Ok(Redirect::to(&format!("/{id}")).into_response())
}
