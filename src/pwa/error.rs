/// Tagged error kinds for PWA store operations
///
/// Route handlers match on these variants to pick between an inline form
/// message and the generic error page, so recoverable conditions are
/// distinguished structurally instead of by inspecting error text.

use thiserror::Error;

/// Errors produced by the PWA store and its collaborators.
#[derive(Debug, Error)]
pub enum PwaError {
    /// Another record already claims this manifest URL.
    #[error("manifest already exists")]
    AlreadyExists,

    /// The manifest could not be fetched or parsed (404, not JSON,
    /// unreachable host).
    #[error("error loading manifest: {0}")]
    ManifestLoad(String),

    /// No record with the requested id.
    #[error("pwa not found")]
    NotFound,

    /// Any other failure, opaque to callers.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for PwaError {
    fn from(err: sqlx::Error) -> Self {
        PwaError::Other(err.into())
    }
}

impl From<serde_json::Error> for PwaError {
    fn from(err: serde_json::Error) -> Self {
        PwaError::Other(err.into())
    }
}
