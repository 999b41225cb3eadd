/// PWA Directory server
///
/// Main entry point. Initializes configuration and starts the HTTP server
/// with the record CRUD pages and the service worker precache route.

use pwa_directory::{config::Config, server::start_server};

/// Application entry point
///
/// Initializes the server with default configuration and starts listening
/// for requests. The server provides:
/// - The PWA list, add/edit forms, and detail pages at /
/// - The service worker precache script at /sw-assets-precache.js
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:8080 and a SQLite database under ./data)
    let config = Config::default();

    // Start the server
    start_server(config).await?;

    Ok(())
}
