use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::error::SdkError;
use crate::core::image::ImageEditModel;
use crate::core::json::{str_at, value_at};
use crate::core::transport::HttpTransport;
use crate::provider_google::error::map_transport_error_to_sdk_error;
use crate::provider_google::prompt::image_edit_body;
use crate::provider_google::provider::GoogleConfig;
use crate::reqwest_transport::ReqwestTransport;
use crate::types::media::{EditRequest, EditedImage};

/// Gemini image model driven through `generateContent`.
pub struct GoogleImageEditModel<T: HttpTransport = ReqwestTransport> {
    pub model_id: String,
    pub cfg: GoogleConfig<T>,
}

impl<T: HttpTransport> GoogleImageEditModel<T> {
    pub fn new(model_id: impl Into<String>, cfg: GoogleConfig<T>) -> Self {
        Self {
            model_id: model_id.into(),
            cfg,
        }
    }
}

/// Base64 payload of the first `inlineData` part across all candidates.
fn first_inline_image(resp: &JsonValue) -> Option<&str> {
    resp.get("candidates")?
        .as_array()?
        .iter()
        .filter_map(|c| value_at(c, &["content", "parts"]).and_then(|p| p.as_array()))
        .flatten()
        .find_map(|part| str_at(part, &["inlineData", "data"]))
}

#[async_trait]
impl<T: HttpTransport> ImageEditModel for GoogleImageEditModel<T> {
    fn provider_name(&self) -> &'static str {
        self.cfg.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_edit(&self, request: EditRequest) -> Result<EditedImage, SdkError> {
        let url = self.cfg.model_url(&self.model_id, "generateContent");
        let body = serde_json::to_value(image_edit_body(&request))?;
        let (resp, _headers) = self
            .cfg
            .http
            .post_json(&url, &self.cfg.headers(), &body, &self.cfg.transport_cfg)
            .await
            .map_err(map_transport_error_to_sdk_error)?;

        let Some(data) = first_inline_image(&resp) else {
            debug!(
                target: "listing_ai::provider::google",
                model = %self.model_id,
                finish_reason =
                    str_at(&resp, &["candidates", "0", "finishReason"]).unwrap_or("none"),
                block_reason = str_at(&resp, &["promptFeedback", "blockReason"]).unwrap_or("none"),
                "image edit returned no image part"
            );
            return Err(SdkError::NoContentProduced);
        };
        let bytes = STANDARD.decode(data.trim()).map_err(|e| SdkError::Upstream {
            status: 200,
            message: format!("image payload is not valid base64: {e}"),
            source: None,
        })?;
        Ok(EditedImage::png(bytes))
    }
}
