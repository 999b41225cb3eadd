/// Server setup and initialization
///
/// Wires together all components: store, verifier, views, asset manifest,
/// and HTTP routes. Provides the main application factory function for
/// creating the Axum app.

use crate::{
    api::{create_pwa_routes, create_sw_routes, not_found, AppState},
    assets::{AssetManifest, PRECACHED_ASSETS},
    auth::IdTokenVerifier,
    config::Config,
    pwa::{storage::open_pool, HttpManifestFetcher, PwaStore},
    views::Views,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Create the main Axum application with all routes
///
/// Initializes all components and wires them together into a complete
/// application: database pool and schema, record store, token verifier,
/// template environment, and the one-time asset manifest.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🗄️ Opening record store in {}", config.database.data_dir);
    let pool = open_pool(&config.database.data_dir).await?;
    let store = PwaStore::new(pool, Arc::new(HttpManifestFetcher::new()));
    store
        .init_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize record schema: {}", e))?;

    tracing::info!("🔑 Initializing ID-token verifier");
    if config.oauth.client_id.is_empty() {
        tracing::warn!("OAuth client id is empty; all token verifications will fail");
    }
    let verifier = Arc::new(IdTokenVerifier::new(
        config.oauth.client_id.clone(),
        &config.oauth.client_secret,
    ));

    tracing::info!("📄 Loading templates");
    let views = Arc::new(Views::new()?);

    // Computed once per process; the precache route serves it verbatim
    tracing::info!("🧮 Computing service worker asset manifest");
    let assets = Arc::new(AssetManifest::build(PRECACHED_ASSETS));

    let app_state = AppState {
        store,
        verifier,
        views,
        assets,
    };

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Service worker precache script
        .merge(create_sw_routes())
        // PWA record CRUD pages
        .merge(create_pwa_routes())
        // Everything else is the generic not-found page
        .fallback(not_found)
        .with_state(app_state);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured
/// address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Starting PWA directory server...");

    // Create the application
    let app = create_app(config.clone()).await?;

    // Bind to the configured address
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    // Start the server
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
