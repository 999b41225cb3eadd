/// HTML rendering
///
/// Owns the minijinja environment with the directory's templates loaded at
/// construction, and maps records into the flat view models the templates
/// consume. Shared read-only through app state.

use crate::pwa::Pwa;
use anyhow::Result;
use minijinja::{context, Environment};
use serde::Serialize;

/// Template renderer for the directory pages
pub struct Views {
    env: Environment<'static>,
}

/// Flat record view consumed by the templates
#[derive(Debug, Serialize)]
struct PwaView {
    id: String,
    name: String,
    manifest_url: String,
    start_url: String,
    description: String,
    user_id: String,
    updated_at: String,
}

fn pwa_view(pwa: &Pwa) -> PwaView {
    let manifest = pwa.manifest.as_ref();
    PwaView {
        id: pwa.id.clone().unwrap_or_default(),
        name: pwa.display_name().to_string(),
        manifest_url: pwa.manifest_url.clone(),
        start_url: manifest
            .and_then(|m| m.start_url.clone())
            .unwrap_or_default(),
        description: manifest
            .and_then(|m| m.description.clone())
            .unwrap_or_default(),
        user_id: pwa.user_id.clone().unwrap_or_default(),
        updated_at: pwa.updated_at.clone().unwrap_or_default(),
    }
}

impl Views {
    /// Load the embedded templates into a fresh environment
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("list.html", include_str!("templates/list.html"))?;
        env.add_template("form.html", include_str!("templates/form.html"))?;
        env.add_template("view.html", include_str!("templates/view.html"))?;
        env.add_template("not_found.html", include_str!("templates/not_found.html"))?;
        Ok(Self { env })
    }

    /// Render the paginated list page
    pub fn render_list(&self, pwas: &[Pwa], next_page_token: Option<&str>) -> Result<String> {
        let pwas: Vec<PwaView> = pwas.iter().map(pwa_view).collect();
        let html = self.env.get_template("list.html")?.render(context! {
            pwas => pwas,
            next_page_token => next_page_token,
        })?;
        Ok(html)
    }

    /// Render the add/edit form
    ///
    /// `action` is the label shown on the page ("Add" or "Edit"); `error`
    /// is the inline message for a rejected submission.
    pub fn render_form(&self, pwa: &Pwa, action: &str, error: Option<&str>) -> Result<String> {
        let html = self.env.get_template("form.html")?.render(context! {
            pwa => pwa_view(pwa),
            action => action,
            error => error,
        })?;
        Ok(html)
    }

    /// Render the record detail page
    pub fn render_view(&self, pwa: &Pwa) -> Result<String> {
        let html = self.env.get_template("view.html")?.render(context! {
            pwa => pwa_view(pwa),
        })?;
        Ok(html)
    }

    /// Render the generic not-found page
    pub fn render_not_found(&self) -> Result<String> {
        let html = self.env.get_template("not_found.html")?.render(context! {})?;
        Ok(html)
    }
}
