//! Credentials and settings shared by provider implementations.
//!
//! `StudioSettings` is the serde-facing configuration of a studio: endpoint,
//! model ids, polling cadence and the human-facing strings. The API key is
//! never part of it; it comes from `Credentials` or the environment.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::chat::{ChatPreamble, DEFAULT_AGENCY_NAME};
use crate::core::credentials::CredentialChooser;
use crate::core::progress::ProgressMessages;
use crate::core::transport::TransportConfig;
use crate::core::video::PollConfig;
use crate::types::media::DEFAULT_VIDEO_RESOLUTION;
use crate::types::Locale;

/// Environment variables consulted, in order, when no key is passed in.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_GENERATIVE_AI_API_KEY"];

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Credentials provided by the application layer.
#[derive(Clone)]
pub enum Credentials {
    ApiKey(String),
    /// Fall back to the environment.
    None,
}

impl Credentials {
    pub fn as_api_key(&self) -> Option<String> {
        match self {
            Credentials::ApiKey(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::None => f.write_str("None"),
        }
    }
}

/// First non-empty key from the environment.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Explicit key first, then the environment.
pub fn resolve_api_key(creds: &Credentials) -> Option<String> {
    creds.as_api_key().or_else(api_key_from_env)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioSettings {
    pub base_url: String,
    pub image_model: String,
    pub video_model: String,
    pub chat_model: String,
    pub video_resolution: String,
    pub poll_interval_ms: u64,
    /// Idle timeout between chat stream chunks. `None` keeps the transport
    /// default.
    pub stream_idle_timeout_ms: Option<u64>,
    pub locale: Locale,
    pub agency_name: String,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            video_resolution: DEFAULT_VIDEO_RESOLUTION.to_string(),
            poll_interval_ms: 10_000,
            stream_idle_timeout_ms: None,
            locale: Locale::default(),
            agency_name: DEFAULT_AGENCY_NAME.to_string(),
        }
    }
}

impl StudioSettings {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn transport_config(&self) -> TransportConfig {
        let mut cfg = TransportConfig::default();
        if let Some(ms) = self.stream_idle_timeout_ms.filter(|ms| *ms > 0) {
            cfg.idle_read_timeout = Duration::from_millis(ms);
        }
        cfg
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval(),
            messages: ProgressMessages::for_locale(self.locale),
        }
    }

    pub fn preamble(&self) -> ChatPreamble {
        ChatPreamble::new(self.agency_name.clone(), self.locale)
    }
}

/// Non-interactive chooser backed by the process environment.
///
/// Reports a credential when one of the configured variables holds a
/// non-empty value. Opening it cannot select anything; it only logs which
/// variable to set.
#[derive(Debug, Clone)]
pub struct EnvCredentialChooser {
    vars: Vec<String>,
}

impl EnvCredentialChooser {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvCredentialChooser {
    fn default() -> Self {
        Self::new(API_KEY_ENV_VARS.iter().copied())
    }
}

#[async_trait]
impl CredentialChooser for EnvCredentialChooser {
    async fn has_credential(&self) -> bool {
        self.vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .any(|v| !v.trim().is_empty())
    }

    async fn open_chooser(&self) {
        warn!(
            target: "listing_ai::credentials",
            vars = %self.vars.join(", "),
            "no interactive key chooser; set one of these environment variables"
        );
    }
}

#[cfg(test)]
#[path = "../tests/settings_tests.rs"]
mod settings_tests;
