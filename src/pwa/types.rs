/// Core record type definitions
///
/// Defines the catalogued PWA record and the parsed manifest document.
/// Records are stored in SQLite with the manifest serialized as JSON.

use crate::auth::VerifiedIdentity;
use serde::{Deserialize, Serialize};

/// A catalogued Progressive Web App
///
/// A record is keyed by an id the store assigns on first save. The owning
/// user is stamped from a verified identity right before saving; it is
/// never taken from client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pwa {
    /// Canonical identifier, assigned by the store on first save
    pub id: Option<String>,
    /// URL of the manifest document describing this PWA
    pub manifest_url: String,
    /// Identifier of the user who submitted the record
    pub user_id: Option<String>,
    /// The fetched manifest document, populated at save time
    pub manifest: Option<Manifest>,
    /// Creation timestamp (RFC 3339)
    pub created_at: Option<String>,
    /// Last-update timestamp (RFC 3339)
    pub updated_at: Option<String>,
}

impl Pwa {
    /// Create a draft record from a submitted manifest URL
    ///
    /// The draft has no id and no owner yet; both are filled in during the
    /// save pipeline.
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            id: None,
            manifest_url: manifest_url.into(),
            user_id: None,
            manifest: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Stamp the record with the verified acting user
    pub fn set_user(&mut self, identity: &VerifiedIdentity) {
        self.user_id = Some(identity.subject.clone());
    }

    /// Human-readable name for list and detail views
    ///
    /// Prefers the manifest's name, then its short name, falling back to
    /// the manifest URL for records whose manifest named neither.
    pub fn display_name(&self) -> &str {
        self.manifest
            .as_ref()
            .and_then(|m| m.name.as_deref().or(m.short_name.as_deref()))
            .unwrap_or(&self.manifest_url)
    }
}

/// A parsed web app manifest document
///
/// Only the fields the directory displays are kept; everything else in the
/// document is ignored. All fields are optional because manifests in the
/// wild omit most of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub start_url: Option<String>,
    pub description: Option<String>,
    pub display: Option<String>,
    pub theme_color: Option<String>,
}
