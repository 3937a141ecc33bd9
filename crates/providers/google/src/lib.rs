//! Google Generative Language API implementations of the studio seams:
//! Gemini image editing, Veo long-running video generation and Gemini SSE
//! chat.

pub mod chat;
pub mod error;
pub mod image_edit;
pub mod prompt;
pub mod provider;
pub mod video;

pub use chat::GoogleChatModel;
pub use image_edit::GoogleImageEditModel;
pub use provider::{build_studio, build_studio_with_gate, GoogleConfig};
pub use video::GoogleVeoModel;

#[cfg(test)]
#[path = "../tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "../tests/image_edit_tests.rs"]
mod image_edit_tests;

#[cfg(test)]
#[path = "../tests/video_tests.rs"]
mod video_tests;

#[cfg(test)]
#[path = "../tests/chat_tests.rs"]
mod chat_tests;

#[cfg(test)]
#[path = "../tests/provider_tests.rs"]
mod provider_tests;
