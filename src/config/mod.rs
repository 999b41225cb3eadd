/// Configuration management for the PWA directory
///
/// Handles server configuration, database location, and the OAuth client
/// credentials used for ID-token verification.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// OAuth client credentials for identity verification
    pub oauth: OAuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration for the SQLite-backed PWA store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file (default: "data")
    /// Creates: {data_dir}/pwas.db
    pub data_dir: String,
}

/// OAuth client credentials
///
/// Only used to verify ID tokens presented on the add/edit forms: the
/// client id is the required token audience, the client secret keys the
/// signature check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("PWA_DIRECTORY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PWA_DIRECTORY_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("PWA_DIRECTORY_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
            },
            oauth: OAuthConfig {
                client_id: std::env::var("PWA_DIRECTORY_CLIENT_ID").unwrap_or_default(),
                client_secret: std::env::var("PWA_DIRECTORY_CLIENT_SECRET").unwrap_or_default(),
            },
        }
    }
}
