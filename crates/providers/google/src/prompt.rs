//! Request bodies in the `generateContent` wire shape.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::chat::ChatRequest;
use crate::types::media::EditRequest;
use crate::types::{ChatTurn, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleSystemInstruction {
    pub parts: Vec<GoogleContentPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum GoogleContent {
    #[serde(rename = "user")]
    User { parts: Vec<GoogleContentPart> },
    #[serde(rename = "model")]
    Model { parts: Vec<GoogleContentPart> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GoogleContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GoogleInlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGenerationConfig {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleSystemInstruction>,
    pub contents: Vec<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GoogleGenerationConfig>,
}

fn text(s: &str) -> GoogleContentPart {
    GoogleContentPart::Text {
        text: s.to_string(),
    }
}

fn turn_content(turn: &ChatTurn) -> GoogleContent {
    let parts = vec![text(&turn.text)];
    match turn.role {
        Role::User => GoogleContent::User { parts },
        Role::Assistant => GoogleContent::Model { parts },
    }
}

/// History in order, then the new user message.
pub fn chat_body(request: &ChatRequest) -> GoogleRequestBody {
    let mut contents: Vec<GoogleContent> = request.history.iter().map(turn_content).collect();
    contents.push(GoogleContent::User {
        parts: vec![text(&request.message)],
    });
    GoogleRequestBody {
        system_instruction: Some(GoogleSystemInstruction {
            parts: vec![text(&request.system_instruction)],
        }),
        contents,
        generation_config: None,
    }
}

/// Image first, instruction second, image-only output.
pub fn image_edit_body(request: &EditRequest) -> GoogleRequestBody {
    GoogleRequestBody {
        system_instruction: None,
        contents: vec![GoogleContent::User {
            parts: vec![
                GoogleContentPart::InlineData {
                    inline_data: GoogleInlineData {
                        mime_type: request.media_type.clone(),
                        data: STANDARD.encode(&request.image),
                    },
                },
                text(&request.instruction),
            ],
        }],
        generation_config: Some(GoogleGenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
        }),
    }
}
