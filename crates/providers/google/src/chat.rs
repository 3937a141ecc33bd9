use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::chat::{ChatModel, ChatRequest, TextStream};
use crate::core::error::SdkError;
use crate::core::json::value_at;
use crate::core::transport::HttpTransport;
use crate::provider_google::error::{embedded_error, map_transport_error_to_sdk_error};
use crate::provider_google::prompt::chat_body;
use crate::provider_google::provider::GoogleConfig;
use crate::reqwest_transport::ReqwestTransport;
use crate::streaming_sse::sse_events;

/// Gemini chat over `streamGenerateContent?alt=sse`.
pub struct GoogleChatModel<T: HttpTransport = ReqwestTransport> {
    pub model_id: String,
    pub cfg: GoogleConfig<T>,
}

impl<T: HttpTransport> GoogleChatModel<T> {
    pub fn new(model_id: impl Into<String>, cfg: GoogleConfig<T>) -> Self {
        Self {
            model_id: model_id.into(),
            cfg,
        }
    }

    fn url_stream(&self) -> String {
        format!(
            "{}?alt=sse",
            self.cfg.model_url(&self.model_id, "streamGenerateContent")
        )
    }
}

/// Visible text of one stream frame: every non-thought text part of the
/// first candidate, in order.
pub fn frame_text(frame: &JsonValue) -> String {
    value_at(frame, &["candidates", "0", "content", "parts"])
        .and_then(JsonValue::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|p| !p.get("thought").and_then(JsonValue::as_bool).unwrap_or(false))
                .filter_map(|p| p.get("text").and_then(JsonValue::as_str))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl<T: HttpTransport> ChatModel for GoogleChatModel<T> {
    fn provider_name(&self) -> &'static str {
        self.cfg.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_stream(&self, request: ChatRequest) -> Result<TextStream, SdkError> {
        let url = self.url_stream();
        let body = serde_json::to_value(chat_body(&request))?;
        let mut headers = self.cfg.headers();
        for (k, v) in headers.iter_mut() {
            if k.as_str() == "accept" {
                *v = "text/event-stream".to_string();
            }
        }
        let resp = self
            .cfg
            .http
            .post_json_stream(&url, &headers, &body, &self.cfg.transport_cfg)
            .await
            .map_err(map_transport_error_to_sdk_error)?;
        let (inner, _resp_headers) = <T as HttpTransport>::into_stream(resp);

        let model_id = self.model_id.clone();
        let s = async_stream::stream! {
            let mut events = Box::pin(sse_events(inner));
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(ev) => ev,
                    Err(te) => {
                        yield Err(SdkError::Transport(te));
                        return;
                    }
                };
                if event.is_blank() {
                    continue;
                }
                let frame: JsonValue = match serde_json::from_str(&event.data) {
                    Ok(v) => v,
                    Err(err) => {
                        debug!(
                            target: "listing_ai::provider::google",
                            model = %model_id,
                            error = %err,
                            "skipping unparseable stream frame"
                        );
                        continue;
                    }
                };
                if let Some(err) = embedded_error(&frame) {
                    yield Err(SdkError::Upstream {
                        status: err.code.and_then(|c| u16::try_from(c).ok()).unwrap_or(500),
                        message: err.message,
                        source: None,
                    });
                    return;
                }
                let text = frame_text(&frame);
                if !text.is_empty() {
                    yield Ok(text);
                }
            }
        };
        Ok(Box::pin(s))
    }
}
