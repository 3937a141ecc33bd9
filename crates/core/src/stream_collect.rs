use futures_util::StreamExt;

use crate::core::chat::TextStream;
use crate::core::SdkError;

/// Text gathered from a chat stream, plus the error that ended it early, if
/// any. `text` holds every fragment received before the failure.
#[derive(Debug)]
pub struct CollectedText {
    pub text: String,
    pub fragments: usize,
    pub error: Option<SdkError>,
}

impl CollectedText {
    pub fn into_result(self) -> Result<String, SdkError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.text),
        }
    }
}

/// Drain a chat stream, concatenating fragments in arrival order.
pub async fn collect_text_partial(mut stream: TextStream) -> CollectedText {
    let mut text = String::new();
    let mut fragments = 0usize;
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                text.push_str(&fragment);
                fragments += 1;
            }
            Err(err) => {
                return CollectedText {
                    text,
                    fragments,
                    error: Some(err),
                }
            }
        }
    }
    CollectedText {
        text,
        fragments,
        error: None,
    }
}

/// Drain a chat stream into the final message text.
pub async fn collect_text(stream: TextStream) -> Result<String, SdkError> {
    collect_text_partial(stream).await.into_result()
}
