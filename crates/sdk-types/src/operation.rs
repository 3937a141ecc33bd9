//! Long-running operation handles and the artifacts they resolve to.

use std::fmt;

use bytes::Bytes;
use url::Url;

/// Error payload reported by a finished remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub code: Option<i64>,
    pub message: String,
}

/// Opaque token for an in-progress remote job.
///
/// Only the `done`, `error` and `artifacts` facets are readable. The token is
/// handed back to the provider on each poll and is not meant to be inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationHandle {
    token: String,
    done: bool,
    error: Option<OperationError>,
    artifacts: Vec<ArtifactReference>,
}

impl OperationHandle {
    pub fn pending(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            done: false,
            error: None,
            artifacts: Vec::new(),
        }
    }

    pub fn succeeded(token: impl Into<String>, artifacts: Vec<ArtifactReference>) -> Self {
        Self {
            token: token.into(),
            done: true,
            error: None,
            artifacts,
        }
    }

    pub fn failed(token: impl Into<String>, error: OperationError) -> Self {
        Self {
            token: token.into(),
            done: true,
            error: Some(error),
            artifacts: Vec::new(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    pub fn artifacts(&self) -> &[ArtifactReference] {
        &self.artifacts
    }
}

/// Short-lived download locator for a finished job's output.
///
/// Fetch it promptly; the remote side does not promise it stays valid.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    pub locator: String,
    /// Query parameter (name, value) required to authorize the download.
    pub credential_suffix: Option<(String, String)>,
}

impl ArtifactReference {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            credential_suffix: None,
        }
    }

    pub fn with_credential(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.credential_suffix = Some((name.into(), value.into()));
        self
    }

    /// Locator with the credential suffix appended as a query parameter.
    pub fn download_url(&self) -> String {
        let Some((name, value)) = &self.credential_suffix else {
            return self.locator.clone();
        };
        match Url::parse(&self.locator) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair(name, value);
                url.to_string()
            }
            Err(_) => {
                let sep = if self.locator.contains('?') { '&' } else { '?' };
                format!(
                    "{}{}{}={}",
                    self.locator,
                    sep,
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            }
        }
    }
}

// The credential value must never end up in logs.
impl fmt::Debug for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactReference")
            .field("locator", &self.locator)
            .field(
                "credential_suffix",
                &self.credential_suffix.as_ref().map(|(name, _)| (name, "***")),
            )
            .finish()
    }
}

/// A downloaded artifact held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalArtifact {
    pub data: Bytes,
    pub media_type: Option<String>,
    /// Locator the bytes came from, without any credential suffix.
    pub source: String,
}

impl LocalArtifact {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Render the artifact as a `data:` URL.
    pub fn data_url(&self) -> String {
        use base64::engine::general_purpose::STANDARD as B64;
        use base64::Engine;
        let media_type = self
            .media_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        format!("data:{};base64,{}", media_type, B64.encode(&self.data))
    }
}
