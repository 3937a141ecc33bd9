use crate::types::media::{EditRequest, EditedImage};

use crate::core::SdkError;

/// A model that transforms an image according to a text instruction.
///
/// One request, one round trip. Implementations do not retry.
#[async_trait::async_trait]
pub trait ImageEditModel: Send + Sync {
    /// Provider name for logging/telemetry.
    fn provider_name(&self) -> &'static str;
    /// Provider-specific model identifier.
    fn model_id(&self) -> &str;

    /// Returns exactly one image on success, or `SdkError::NoContentProduced`
    /// when the response holds no image part.
    async fn do_edit(&self, request: EditRequest) -> Result<EditedImage, SdkError>;
}
