use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::core::error::{SdkError, TransportError};
use crate::core::json::{str_at, value_at};
use crate::core::transport::HttpTransport;
use crate::core::video::VideoModel;
use crate::provider_google::error::{embedded_error, map_transport_error_to_sdk_error};
use crate::provider_google::provider::GoogleConfig;
use crate::reqwest_transport::ReqwestTransport;
use crate::types::media::GenerationJob;
use crate::types::operation::{ArtifactReference, OperationError, OperationHandle};

/// Query parameter that authorizes a generated-file download.
pub const DOWNLOAD_KEY_PARAM: &str = "key";

/// Veo model run as a long-running operation (`predictLongRunning`, then GET
/// on the operation resource).
pub struct GoogleVeoModel<T: HttpTransport = ReqwestTransport> {
    pub model_id: String,
    pub cfg: GoogleConfig<T>,
}

impl<T: HttpTransport> GoogleVeoModel<T> {
    pub fn new(model_id: impl Into<String>, cfg: GoogleConfig<T>) -> Self {
        Self {
            model_id: model_id.into(),
            cfg,
        }
    }

    fn build_body(job: &GenerationJob) -> JsonValue {
        json!({
            "instances": [{ "prompt": job.prompt }],
            "parameters": {
                "sampleCount": job.count,
                "aspectRatio": job.aspect_ratio.as_str(),
                "resolution": job.resolution,
            }
        })
    }

    /// Turn an operation resource into a handle. `fallback_token` is used
    /// when a poll response omits the operation name.
    fn parse_operation(
        &self,
        resp: &JsonValue,
        fallback_token: Option<&str>,
    ) -> Result<OperationHandle, SdkError> {
        let token = str_at(resp, &["name"])
            .or(fallback_token)
            .ok_or_else(|| {
                SdkError::Transport(TransportError::Other(
                    "operation response carries no name".into(),
                ))
            })?
            .to_string();

        if !resp.get("done").and_then(JsonValue::as_bool).unwrap_or(false) {
            return Ok(OperationHandle::pending(token));
        }
        if let Some(err) = embedded_error(resp) {
            return Ok(OperationHandle::failed(token, err.into()));
        }

        let video_response = value_at(resp, &["response", "generateVideoResponse"]);
        let artifacts: Vec<ArtifactReference> = video_response
            .and_then(|v| v.get("generatedSamples"))
            .and_then(JsonValue::as_array)
            .map(|samples| {
                samples
                    .iter()
                    .filter_map(|s| str_at(s, &["video", "uri"]))
                    .map(|uri| self.artifact(uri))
                    .collect()
            })
            .unwrap_or_default();

        if artifacts.is_empty() {
            // Safety filtering finishes the operation without samples; surface
            // the service's reason instead of a bare "no artifact".
            let reasons: Vec<&str> = video_response
                .and_then(|v| v.get("raiMediaFilteredReasons"))
                .and_then(JsonValue::as_array)
                .map(|r| r.iter().filter_map(JsonValue::as_str).collect())
                .unwrap_or_default();
            if !reasons.is_empty() {
                return Ok(OperationHandle::failed(
                    token,
                    OperationError {
                        code: None,
                        message: reasons.join(" "),
                    },
                ));
            }
        }
        Ok(OperationHandle::succeeded(token, artifacts))
    }

    pub(crate) fn artifact(&self, uri: &str) -> ArtifactReference {
        let reference = ArtifactReference::new(uri);
        match &self.cfg.api_key {
            Some(key) if !key.is_empty() => {
                reference.with_credential(DOWNLOAD_KEY_PARAM, key.clone())
            }
            _ => reference,
        }
    }
}

#[async_trait]
impl<T: HttpTransport> VideoModel for GoogleVeoModel<T> {
    fn provider_name(&self) -> &'static str {
        self.cfg.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn create_job(&self, job: &GenerationJob) -> Result<OperationHandle, SdkError> {
        let url = self.cfg.model_url(&self.model_id, "predictLongRunning");
        let body = Self::build_body(job);
        let (resp, _headers) = self
            .cfg
            .http
            .post_json(&url, &self.cfg.headers(), &body, &self.cfg.transport_cfg)
            .await
            .map_err(map_transport_error_to_sdk_error)?;
        let handle = self.parse_operation(&resp, None)?;
        debug!(
            target: "listing_ai::provider::google",
            model = %self.model_id,
            operation = handle.token(),
            "video operation created"
        );
        Ok(handle)
    }

    async fn poll_job(&self, handle: &OperationHandle) -> Result<OperationHandle, SdkError> {
        let url = self.cfg.resource_url(handle.token());
        let (resp, _headers) = self
            .cfg
            .http
            .get_json(&url, &self.cfg.headers(), &self.cfg.transport_cfg)
            .await
            .map_err(map_transport_error_to_sdk_error)?;
        self.parse_operation(&resp, Some(handle.token()))
    }
}
