//! Caller-facing entry points: image edit, promo video, listing chat.

use std::sync::Arc;

use tracing::info;

use crate::core::artifact::ArtifactFetcher;
use crate::core::chat::{ChatModel, ChatPreamble, ChatSession, TextStream};
use crate::core::credentials::CredentialGate;
use crate::core::error::SdkError;
use crate::core::image::ImageEditModel;
use crate::core::progress::{ProgressNotifier, ProgressStage};
use crate::core::schedule::{Sleeper, TokioSleeper};
use crate::core::video::{JobPoller, PollConfig, VideoModel};
use crate::types::listing::{listing_contexts, ListingContext, PropertyListing};
use crate::types::media::{
    AspectRatio, EditRequest, EditedImage, GenerationJob, DEFAULT_VIDEO_RESOLUTION,
};
use crate::types::operation::LocalArtifact;
use crate::types::ChatTurn;

pub struct MediaStudioConfig {
    pub image_model: Arc<dyn ImageEditModel>,
    pub video_model: Arc<dyn VideoModel>,
    pub chat_model: Arc<dyn ChatModel>,
    pub fetcher: Arc<dyn ArtifactFetcher>,
    pub gate: CredentialGate,
    pub sleeper: Arc<dyn Sleeper>,
    pub poll: PollConfig,
    pub preamble: ChatPreamble,
    pub video_resolution: String,
}

impl MediaStudioConfig {
    /// Config with default polling, preamble and resolution, no credential
    /// chooser and a tokio-backed sleeper.
    pub fn new(
        image_model: Arc<dyn ImageEditModel>,
        video_model: Arc<dyn VideoModel>,
        chat_model: Arc<dyn ChatModel>,
        fetcher: Arc<dyn ArtifactFetcher>,
    ) -> Self {
        Self {
            image_model,
            video_model,
            chat_model,
            fetcher,
            gate: CredentialGate::unattended(),
            sleeper: Arc::new(TokioSleeper),
            poll: PollConfig::default(),
            preamble: ChatPreamble::default(),
            video_resolution: DEFAULT_VIDEO_RESOLUTION.to_string(),
        }
    }
}

/// Shares only immutable configuration and model clients, so one studio can
/// serve concurrent calls; every video job gets its own poller.
pub struct MediaStudio {
    cfg: MediaStudioConfig,
}

impl MediaStudio {
    pub fn new(cfg: MediaStudioConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MediaStudioConfig {
        &self.cfg
    }

    pub async fn edit_image(&self, request: EditRequest) -> Result<EditedImage, SdkError> {
        if request.instruction.trim().is_empty() {
            return Err(SdkError::validation("edit instruction must not be empty"));
        }
        if request.image.is_empty() {
            return Err(SdkError::validation("source image must not be empty"));
        }
        self.cfg.image_model.do_edit(request).await
    }

    /// Generate a promotional video and download it.
    pub async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        notifier: &dyn ProgressNotifier,
    ) -> Result<LocalArtifact, SdkError> {
        if prompt.trim().is_empty() {
            return Err(SdkError::validation("video prompt must not be empty"));
        }
        let job = GenerationJob::new(prompt, aspect_ratio)
            .with_resolution(self.cfg.video_resolution.clone());

        let poller = JobPoller::new(
            self.cfg.video_model.as_ref(),
            &self.cfg.gate,
            self.cfg.sleeper.as_ref(),
            notifier,
            &self.cfg.poll,
        );
        let reference = poller.run(&job).await.into_result()?;

        if let Some(update) = self.cfg.poll.messages.update(ProgressStage::Downloading) {
            notifier.notify(&update);
        }
        let artifact = self.cfg.fetcher.materialize(&reference).await?;
        info!(
            target: "listing_ai::studio",
            job_id = %job.id,
            bytes = artifact.len(),
            "promo video ready"
        );
        Ok(artifact)
    }

    pub async fn stream_chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        listings: &[ListingContext],
    ) -> Result<TextStream, SdkError> {
        ChatSession::new(self.cfg.chat_model.as_ref(), &self.cfg.preamble)
            .send(history, message, listings)
            .await
    }

    /// `stream_chat` over full listing records, projected with the
    /// preamble's locale.
    pub async fn stream_chat_about(
        &self,
        history: &[ChatTurn],
        message: &str,
        listings: &[PropertyListing],
    ) -> Result<TextStream, SdkError> {
        let contexts = listing_contexts(listings, self.cfg.preamble.locale);
        self.stream_chat(history, message, &contexts).await
    }
}
