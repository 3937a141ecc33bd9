//! In-memory fakes shared by the core tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;

use crate::core::artifact::ArtifactFetcher;
use crate::core::chat::{ChatModel, ChatRequest, TextStream};
use crate::core::credentials::CredentialChooser;
use crate::core::error::SdkError;
use crate::core::image::ImageEditModel;
use crate::core::progress::{ProgressNotifier, ProgressStage, ProgressUpdate};
use crate::core::schedule::Sleeper;
use crate::core::video::VideoModel;
use crate::types::media::{EditRequest, EditedImage, GenerationJob};
use crate::types::operation::{ArtifactReference, LocalArtifact, OperationHandle};

pub fn upstream(status: u16, message: &str) -> SdkError {
    SdkError::Upstream {
        status,
        message: message.to_string(),
        source: None,
    }
}

pub fn pending(token: &str) -> OperationHandle {
    OperationHandle::pending(token)
}

pub fn finished_with(token: &str, locators: &[&str]) -> OperationHandle {
    OperationHandle::succeeded(
        token,
        locators
            .iter()
            .map(|l| ArtifactReference::new(*l).with_credential("key", "test-key"))
            .collect(),
    )
}

/// Video model that replays a fixed script of handles.
///
/// Once the poll script runs out, `poll_job` hands back the handle it was
/// given, like a remote job that has not advanced.
#[derive(Default)]
pub struct ScriptedVideoModel {
    create: Mutex<Option<Result<OperationHandle, SdkError>>>,
    polls: Mutex<VecDeque<Result<OperationHandle, SdkError>>>,
    pub created: Mutex<Vec<GenerationJob>>,
    pub polled_tokens: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedVideoModel {
    pub fn new(
        create: Result<OperationHandle, SdkError>,
        polls: Vec<Result<OperationHandle, SdkError>>,
    ) -> Self {
        Self {
            create: Mutex::new(Some(create)),
            polls: Mutex::new(polls.into()),
            ..Default::default()
        }
    }

    pub fn poll_count(&self) -> usize {
        self.polled_tokens.lock().unwrap().len()
    }

    pub fn create_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoModel for ScriptedVideoModel {
    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-video"
    }

    async fn create_job(&self, job: &GenerationJob) -> Result<OperationHandle, SdkError> {
        self.created.lock().unwrap().push(job.clone());
        self.create
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(upstream(500, "create_job called twice")))
    }

    async fn poll_job(&self, handle: &OperationHandle) -> Result<OperationHandle, SdkError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.polled_tokens
            .lock()
            .unwrap()
            .push(handle.token().to_string());
        tokio::task::yield_now().await;
        let next = self
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(handle.clone()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        next
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingNotifier {
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<ProgressStage> {
        self.updates().into_iter().map(|u| u.stage).collect()
    }

    pub fn polling_messages(&self) -> Vec<String> {
        self.updates()
            .into_iter()
            .filter(|u| matches!(u.stage, ProgressStage::Polling { .. }))
            .map(|u| u.message)
            .collect()
    }
}

impl ProgressNotifier for RecordingNotifier {
    fn notify(&self, update: &ProgressUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

#[derive(Default)]
pub struct InstantSleeper {
    pub waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Chooser whose selection state flips to `selected_after_open` when opened.
pub struct CountingChooser {
    selected: AtomicBool,
    selected_after_open: bool,
    pub opens: AtomicUsize,
}

impl CountingChooser {
    pub fn new(selected: bool, selected_after_open: bool) -> Arc<Self> {
        Arc::new(Self {
            selected: AtomicBool::new(selected),
            selected_after_open,
            opens: AtomicUsize::new(0),
        })
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialChooser for CountingChooser {
    async fn has_credential(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    async fn open_chooser(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.selected.store(self.selected_after_open, Ordering::SeqCst);
    }
}

/// Chat model that streams a fixed list of items.
#[derive(Default)]
pub struct ScriptedChatModel {
    items: Mutex<Option<Vec<Result<String, SdkError>>>>,
    pub last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedChatModel {
    pub fn new(items: Vec<Result<String, SdkError>>) -> Self {
        Self {
            items: Mutex::new(Some(items)),
            last_request: Mutex::new(None),
        }
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Self::new(chunks.iter().map(|c| Ok(c.to_string())).collect())
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-chat"
    }

    async fn do_stream(&self, request: ChatRequest) -> Result<TextStream, SdkError> {
        *self.last_request.lock().unwrap() = Some(request);
        let items = self.items.lock().unwrap().take().unwrap_or_default();
        Ok(Box::pin(stream::iter(items)))
    }
}

#[derive(Default)]
pub struct FakeImageModel {
    result: Mutex<Option<Result<EditedImage, SdkError>>>,
    pub requests: Mutex<Vec<EditRequest>>,
}

impl FakeImageModel {
    pub fn new(result: Result<EditedImage, SdkError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageEditModel for FakeImageModel {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_id(&self) -> &str {
        "fake-image"
    }

    async fn do_edit(&self, request: EditRequest) -> Result<EditedImage, SdkError> {
        self.requests.lock().unwrap().push(request);
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(SdkError::NoContentProduced))
    }
}

/// Fetcher that records what it was asked for and returns fixed bytes, or
/// fails with `DownloadFailed` when built with `failing`.
#[derive(Default)]
pub struct CountingFetcher {
    fail: bool,
    pub fetched: Mutex<Vec<ArtifactReference>>,
}

impl CountingFetcher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactFetcher for CountingFetcher {
    async fn materialize(&self, reference: &ArtifactReference) -> Result<LocalArtifact, SdkError> {
        self.fetched.lock().unwrap().push(reference.clone());
        if self.fail {
            return Err(SdkError::DownloadFailed {
                status: Some(403),
                message: "http status 403".into(),
            });
        }
        Ok(LocalArtifact {
            data: Bytes::from_static(b"\x00\x00\x00\x18ftypmp42"),
            media_type: Some("video/mp4".into()),
            source: reference.locator.clone(),
        })
    }
}
