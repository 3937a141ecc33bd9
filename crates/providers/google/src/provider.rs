use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::artifact::HttpArtifactFetcher;
use crate::core::credentials::CredentialGate;
use crate::core::error::SdkError;
use crate::core::studio::{MediaStudio, MediaStudioConfig};
use crate::core::transport::{HttpTransport, TransportConfig};
use crate::provider::{resolve_api_key, Credentials, EnvCredentialChooser, StudioSettings};
use crate::provider_google::chat::GoogleChatModel;
use crate::provider_google::image_edit::GoogleImageEditModel;
use crate::provider_google::video::GoogleVeoModel;
use crate::reqwest_transport::ReqwestTransport;

pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection details shared by the three Google models.
#[derive(Clone)]
pub struct GoogleConfig<T: HttpTransport = ReqwestTransport> {
    pub provider_name: &'static str,
    pub base_url: String,
    pub api_key: Option<String>,
    pub http: T,
    pub transport_cfg: TransportConfig,
}

impl<T: HttpTransport> GoogleConfig<T> {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, http: T) -> Self {
        Self {
            provider_name: "google.generative-ai",
            base_url: base_url.into(),
            api_key,
            http,
            transport_cfg: TransportConfig::default(),
        }
    }

    pub fn with_transport_config(mut self, cfg: TransportConfig) -> Self {
        self.transport_cfg = cfg;
        self
    }

    /// `{base}/models/{id}:{method}`; ids that already carry a path are used
    /// as-is.
    pub fn model_url(&self, model_id: &str, method: &str) -> String {
        let path = if model_id.contains('/') {
            model_id.to_string()
        } else {
            format!("models/{model_id}")
        };
        format!("{}/{}:{}", self.base_url.trim_end_matches('/'), path, method)
    }

    /// `{base}/{resource}` for resource names returned by the service.
    pub fn resource_url(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        let mut h = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            h.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        h
    }
}

/// Build a studio over the hosted Google API.
///
/// With an explicit key the gate runs unattended; otherwise it consults the
/// environment through `EnvCredentialChooser`.
pub fn build_studio(
    settings: &StudioSettings,
    creds: &Credentials,
) -> Result<MediaStudio, SdkError> {
    let gate = match creds {
        Credentials::ApiKey(_) => CredentialGate::unattended(),
        Credentials::None => CredentialGate::new(Arc::new(EnvCredentialChooser::default())),
    };
    build_studio_with_gate(settings, creds, gate)
}

pub fn build_studio_with_gate(
    settings: &StudioSettings,
    creds: &Credentials,
    gate: CredentialGate,
) -> Result<MediaStudio, SdkError> {
    let transport_cfg = settings.transport_config();
    let http = ReqwestTransport::try_new(&transport_cfg).map_err(SdkError::Transport)?;
    let api_key = resolve_api_key(creds);
    if api_key.is_none() {
        warn!(
            target: "listing_ai::provider::google",
            "no API key configured; remote calls will be rejected"
        );
    }
    let cfg = GoogleConfig::new(settings.base_url(), api_key, http)
        .with_transport_config(transport_cfg.clone());
    debug!(
        target: "listing_ai::provider::google",
        base_url = %cfg.base_url,
        image_model = %settings.image_model,
        video_model = %settings.video_model,
        chat_model = %settings.chat_model,
        "building studio"
    );

    let fetcher = HttpArtifactFetcher::new(cfg.http.clone(), transport_cfg);
    let mut studio_cfg = MediaStudioConfig::new(
        Arc::new(GoogleImageEditModel::new(settings.image_model.clone(), cfg.clone())),
        Arc::new(GoogleVeoModel::new(settings.video_model.clone(), cfg.clone())),
        Arc::new(GoogleChatModel::new(settings.chat_model.clone(), cfg)),
        Arc::new(fetcher),
    );
    studio_cfg.gate = gate;
    studio_cfg.poll = settings.poll_config();
    studio_cfg.preamble = settings.preamble();
    studio_cfg.video_resolution = settings.video_resolution.clone();
    Ok(MediaStudio::new(studio_cfg))
}
