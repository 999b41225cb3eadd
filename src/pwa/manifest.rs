/// Manifest fetching and validation
///
/// A submitted manifest URL is only worth cataloguing if the document
/// behind it can actually be fetched and parsed. The store runs every save
/// through a `ManifestFetcher`; the production implementation goes over
/// HTTP, tests substitute a stub.

use crate::pwa::{error::PwaError, types::Manifest};
use async_trait::async_trait;

/// Fetches and parses the manifest document behind a URL.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetch `url` and parse the body as a web app manifest.
    ///
    /// Every failure mode (unreachable host, non-success status, body that
    /// is not JSON) collapses into `PwaError::ManifestLoad` carrying the
    /// underlying message.
    async fn fetch(&self, url: &str) -> Result<Manifest, PwaError>;
}

/// HTTP manifest fetcher backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpManifestFetcher {
    client: reqwest::Client,
}

impl HttpManifestFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch(&self, url: &str) -> Result<Manifest, PwaError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PwaError::ManifestLoad(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| PwaError::ManifestLoad(e.to_string()))?;

        response
            .json::<Manifest>()
            .await
            .map_err(|e| PwaError::ManifestLoad(e.to_string()))
    }
}
