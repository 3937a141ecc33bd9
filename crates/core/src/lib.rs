pub mod artifact;
pub mod chat;
pub mod credentials;
pub mod error;
pub mod image;
pub mod json;
pub mod progress;
pub mod schedule;
pub mod stream_collect;
pub mod studio;
pub mod transport;
pub mod video;

pub use crate::core::artifact::{ArtifactFetcher, HttpArtifactFetcher};
pub use crate::core::chat::{ChatModel, ChatPreamble, ChatRequest, ChatSession, TextStream};
pub use crate::core::credentials::{CredentialChooser, CredentialGate, GateStatus};
pub use crate::core::error::{SdkError, TransportError};
pub use crate::core::image::ImageEditModel;
pub use crate::core::progress::{
    NoopNotifier, ProgressMessages, ProgressNotifier, ProgressStage, ProgressUpdate,
};
pub use crate::core::schedule::{Sleeper, TokioSleeper};
pub use crate::core::stream_collect::{collect_text, collect_text_partial, CollectedText};
pub use crate::core::studio::{MediaStudio, MediaStudioConfig};
pub use crate::core::video::{JobOutcome, JobPoller, PollConfig, VideoModel};

// Convenience re-exports of common types
pub use crate::types::listing::{ListingContext, PropertyListing};
pub use crate::types::media::{AspectRatio, EditRequest, EditedImage, GenerationJob};
pub use crate::types::operation::{ArtifactReference, LocalArtifact, OperationHandle};
pub use crate::types::{ChatTurn, Role};

#[cfg(test)]
#[path = "../tests/json_tests.rs"]
mod json_tests;

#[cfg(test)]
#[path = "../tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "../tests/poller_tests.rs"]
mod poller_tests;

#[cfg(test)]
#[path = "../tests/credential_tests.rs"]
mod credential_tests;

#[cfg(test)]
#[path = "../tests/chat_session_tests.rs"]
mod chat_session_tests;

#[cfg(test)]
#[path = "../tests/studio_tests.rs"]
mod studio_tests;
