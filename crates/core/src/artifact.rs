//! Turning an artifact reference into bytes held locally.

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::SdkError;
use crate::core::transport::{redact_url, HttpTransport, TransportConfig};
use crate::types::operation::{ArtifactReference, LocalArtifact};

#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download the referenced artifact. A transport failure maps to
    /// `SdkError::DownloadFailed`; there is no retry.
    async fn materialize(&self, reference: &ArtifactReference) -> Result<LocalArtifact, SdkError>;
}

/// Fetches artifacts with a plain GET over an `HttpTransport`.
pub struct HttpArtifactFetcher<T: HttpTransport = crate::reqwest_transport::ReqwestTransport> {
    http: T,
    transport_cfg: TransportConfig,
    headers: Vec<(String, String)>,
}

impl<T: HttpTransport> HttpArtifactFetcher<T> {
    pub fn new(http: T, transport_cfg: TransportConfig) -> Self {
        Self {
            http,
            transport_cfg,
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }
}

#[async_trait]
impl<T: HttpTransport> ArtifactFetcher for HttpArtifactFetcher<T> {
    async fn materialize(&self, reference: &ArtifactReference) -> Result<LocalArtifact, SdkError> {
        let url = reference.download_url();
        debug!(
            target: "listing_ai::artifact",
            url = %redact_url(&url),
            "downloading artifact"
        );
        let (data, headers) = self
            .http
            .get_bytes(&url, &self.headers, &self.transport_cfg)
            .await
            .map_err(|te| SdkError::DownloadFailed {
                status: te.status(),
                message: te.sanitized_message(),
            })?;
        let media_type = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.clone());
        debug!(
            target: "listing_ai::artifact",
            bytes = data.len(),
            media_type = media_type.as_deref().unwrap_or("unknown"),
            "artifact downloaded"
        );
        Ok(LocalArtifact {
            data,
            media_type,
            source: reference.locator.clone(),
        })
    }
}
