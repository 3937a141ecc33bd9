//! Long-running video generation: submission, fixed-interval polling and
//! outcome resolution.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::credentials::{CredentialGate, GateStatus};
use crate::core::error::SdkError;
use crate::core::progress::{ProgressMessages, ProgressNotifier, ProgressStage};
use crate::core::schedule::Sleeper;
use crate::types::media::GenerationJob;
use crate::types::operation::{ArtifactReference, OperationHandle};

/// Delay between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Remote error text that means the selected API key is no longer usable.
///
/// Matching on error text is brittle: it depends on the exact wording the
/// service returns.
pub const CREDENTIAL_INVALIDATED_PATTERN: &str = "entity was not found";

/// A remote service that runs video generation as a long-running operation.
#[async_trait]
pub trait VideoModel: Send + Sync {
    /// Provider name for logging/telemetry.
    fn provider_name(&self) -> &'static str;
    /// Provider-specific model identifier.
    fn model_id(&self) -> &str;

    /// Start the job and return its first operation handle.
    async fn create_job(&self, job: &GenerationJob) -> Result<OperationHandle, SdkError>;

    /// Refresh a handle. Calling this again on a job that has not advanced
    /// returns a handle that is still not done.
    async fn poll_job(&self, handle: &OperationHandle) -> Result<OperationHandle, SdkError>;
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub messages: ProgressMessages,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            messages: ProgressMessages::default(),
        }
    }
}

/// Terminal state of a generation job.
#[derive(Debug)]
pub enum JobOutcome {
    Succeeded(ArtifactReference),
    Failed(SdkError),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded(_))
    }

    pub fn into_result(self) -> Result<ArtifactReference, SdkError> {
        match self {
            JobOutcome::Succeeded(reference) => Ok(reference),
            JobOutcome::Failed(err) => Err(err),
        }
    }
}

enum PollState {
    Submitting,
    Polling {
        handle: OperationHandle,
        attempt: usize,
    },
    Finished(JobOutcome),
}

/// True when the error text carries the credential invalidation pattern.
pub fn is_credential_invalidation(err: &SdkError) -> bool {
    err.remote_message()
        .to_ascii_lowercase()
        .contains(CREDENTIAL_INVALIDATED_PATTERN)
}

/// Drives one generation job from submission to a terminal outcome.
///
/// Strictly sequential: a status check is only issued after the previous one
/// resolved, and each job gets its own poller. Dropping the future stops
/// further polls from being scheduled.
pub struct JobPoller<'a> {
    model: &'a dyn VideoModel,
    gate: &'a CredentialGate,
    sleeper: &'a dyn Sleeper,
    notifier: &'a dyn ProgressNotifier,
    config: &'a PollConfig,
}

impl<'a> JobPoller<'a> {
    pub fn new(
        model: &'a dyn VideoModel,
        gate: &'a CredentialGate,
        sleeper: &'a dyn Sleeper,
        notifier: &'a dyn ProgressNotifier,
        config: &'a PollConfig,
    ) -> Self {
        Self {
            model,
            gate,
            sleeper,
            notifier,
            config,
        }
    }

    pub async fn run(&self, job: &GenerationJob) -> JobOutcome {
        let mut state = PollState::Submitting;
        let outcome = loop {
            state = match state {
                PollState::Submitting => self.submit(job).await,
                PollState::Polling { handle, attempt } => self.poll(job, handle, attempt).await,
                PollState::Finished(outcome) => break outcome,
            };
        };
        self.recover(job, outcome).await
    }

    fn emit(&self, stage: ProgressStage) {
        if let Some(update) = self.config.messages.update(stage) {
            self.notifier.notify(&update);
        }
    }

    async fn submit(&self, job: &GenerationJob) -> PollState {
        self.emit(ProgressStage::CheckingCredential);
        if self.gate.check().await == GateStatus::NeedsSelection {
            self.emit(ProgressStage::SelectCredential);
            if self.gate.prompt_selection().await == GateStatus::NeedsSelection {
                warn!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    "no credential selected; submitting anyway"
                );
            }
        }

        self.emit(ProgressStage::Initializing);
        match self.model.create_job(job).await {
            Ok(handle) => {
                info!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    provider = self.model.provider_name(),
                    model = self.model.model_id(),
                    aspect_ratio = %job.aspect_ratio,
                    "video job submitted"
                );
                self.emit(ProgressStage::Started);
                PollState::Polling { handle, attempt: 0 }
            }
            Err(err) => {
                warn!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    error = %err.format_details(),
                    "video job submission rejected"
                );
                PollState::Finished(JobOutcome::Failed(SdkError::RemoteRejection {
                    message: err.remote_message(),
                    source: Some(Box::new(err)),
                }))
            }
        }
    }

    async fn poll(
        &self,
        job: &GenerationJob,
        handle: OperationHandle,
        attempt: usize,
    ) -> PollState {
        if handle.done() {
            return PollState::Finished(Self::resolve(&handle));
        }

        self.emit(ProgressStage::Polling { attempt });
        self.sleeper.sleep(self.config.interval).await;

        match self.model.poll_job(&handle).await {
            Ok(next) => {
                debug!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    attempt,
                    done = next.done(),
                    "polled video job"
                );
                PollState::Polling {
                    handle: next,
                    attempt: attempt + 1,
                }
            }
            Err(err) => {
                warn!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    attempt,
                    error = %err.format_details(),
                    "status check failed"
                );
                PollState::Finished(JobOutcome::Failed(err))
            }
        }
    }

    fn resolve(handle: &OperationHandle) -> JobOutcome {
        if let Some(error) = handle.error() {
            let message = if error.message.trim().is_empty() {
                match error.code {
                    Some(code) => format!("unknown error (code {code})"),
                    None => "unknown error".to_string(),
                }
            } else {
                error.message.clone()
            };
            return JobOutcome::Failed(SdkError::JobFailed { message });
        }
        match handle.artifacts().first() {
            Some(reference) => JobOutcome::Succeeded(reference.clone()),
            None => JobOutcome::Failed(SdkError::NoArtifactProduced),
        }
    }

    /// Swap a credential invalidation for `InvalidatedCredential` after
    /// prompting for a new key. The job is not resubmitted.
    async fn recover(&self, job: &GenerationJob, outcome: JobOutcome) -> JobOutcome {
        match outcome {
            JobOutcome::Failed(err) if is_credential_invalidation(&err) => {
                warn!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    error = %err.format_details(),
                    "credential rejected by the video service"
                );
                self.emit(ProgressStage::CredentialRejected);
                self.gate.reselect().await;
                JobOutcome::Failed(SdkError::InvalidatedCredential)
            }
            JobOutcome::Succeeded(reference) => {
                info!(
                    target: "listing_ai::poller",
                    job_id = %job.id,
                    locator = %reference.locator,
                    "video job succeeded"
                );
                JobOutcome::Succeeded(reference)
            }
            other => other,
        }
    }
}
