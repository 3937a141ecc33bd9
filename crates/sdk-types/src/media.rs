use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media type of every edited image, whatever the input format was.
pub const EDITED_IMAGE_MEDIA_TYPE: &str = "image/png";

/// Default resolution requested for generated videos.
pub const DEFAULT_VIDEO_RESOLUTION: &str = "720p";

/// An image plus the instruction describing how to transform it.
///
/// Consumed once by the edit call and not retained.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub image: Bytes,
    pub media_type: String,
    pub instruction: String,
}

impl EditRequest {
    pub fn new(
        image: impl Into<Bytes>,
        media_type: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            media_type: media_type.into(),
            instruction: instruction.into(),
        }
    }
}

/// Result of a successful image edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedImage {
    pub data: Bytes,
    pub media_type: String,
}

impl EditedImage {
    pub fn png(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            media_type: EDITED_IMAGE_MEDIA_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "9:16")]
    Portrait9x16,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Portrait9x16 => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported aspect ratio '{0}' (expected 16:9 or 9:16)")]
pub struct ParseAspectRatioError(pub String);

impl FromStr for AspectRatio {
    type Err = ParseAspectRatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Landscape16x9),
            "9:16" => Ok(AspectRatio::Portrait9x16),
            other => Err(ParseAspectRatioError(other.to_string())),
        }
    }
}

/// A video generation request. Owned by the poller until it reaches a
/// terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub id: Uuid,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    /// Number of videos requested; always 1 here.
    pub count: u32,
    pub resolution: String,
}

impl GenerationJob {
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            aspect_ratio,
            count: 1,
            resolution: DEFAULT_VIDEO_RESOLUTION.to_string(),
        }
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }
}
