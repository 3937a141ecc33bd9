//! Shared type definitions for listing-ai-rs.
//!
//! These are the plain data shapes passed between the studio core, the
//! provider implementations and callers: chat turns, listing records,
//! media edit requests, video generation jobs and their operation handles.

pub mod listing;
pub mod media;
pub mod operation;

use serde::{Deserialize, Serialize};

/// Roles a chat turn can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation.
///
/// An ordered `Vec<ChatTurn>` is the conversation history. It is owned by the
/// caller; the chat session only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user<S: Into<String>>(s: S) -> Self {
        Self {
            role: Role::User,
            text: s.into(),
        }
    }

    pub fn assistant<S: Into<String>>(s: S) -> Self {
        Self {
            role: Role::Assistant,
            text: s.into(),
        }
    }
}

/// Language used for human-facing strings (progress phrases, status labels,
/// the chat preamble).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod types_tests;
