/// PWA Directory: a small catalogue of Progressive Web Apps
///
/// Authenticated users submit a manifest URL; the server fetches and
/// validates the manifest and stores a browsable record. A companion route
/// serves the service worker's precache asset list.

// Core configuration and setup
pub mod config;

// PWA record layer - types, tagged errors, SQLite store, manifest fetching
pub mod pwa;

// ID-token verification against the configured OAuth client
pub mod auth;

// Cache-bustable asset names for the service worker precache
pub mod assets;

// HTML rendering with embedded templates
pub mod views;

// HTTP routes - record CRUD pages and the precache script
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use auth::{IdTokenVerifier, VerifiedIdentity};
pub use config::Config;
pub use pwa::{Manifest, Pwa, PwaError, PwaStore};
pub use server::start_server;
