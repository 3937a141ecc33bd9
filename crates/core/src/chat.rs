//! Streaming chat restricted to a snapshot of property listings.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::core::error::SdkError;
use crate::types::listing::ListingContext;
use crate::types::{ChatTurn, Locale};

/// Lazy, finite, non-restartable sequence of text fragments in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, SdkError>> + Send>>;

pub const DEFAULT_AGENCY_NAME: &str = "LE BON VENDEUR IMMO";

/// One streaming call: prior turns plus the new user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system_instruction: String,
    pub history: Vec<ChatTurn>,
    pub message: String,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name for logging/telemetry.
    fn provider_name(&self) -> &'static str;
    /// Provider-specific model identifier.
    fn model_id(&self) -> &str;

    async fn do_stream(&self, request: ChatRequest) -> Result<TextStream, SdkError>;
}

/// Builds the system instruction that pins answers to the listing snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPreamble {
    pub agency_name: String,
    pub locale: Locale,
}

impl Default for ChatPreamble {
    fn default() -> Self {
        Self {
            agency_name: DEFAULT_AGENCY_NAME.to_string(),
            locale: Locale::default(),
        }
    }
}

impl ChatPreamble {
    pub fn new(agency_name: impl Into<String>, locale: Locale) -> Self {
        Self {
            agency_name: agency_name.into(),
            locale,
        }
    }

    pub fn render(&self, listings: &[ListingContext]) -> Result<String, SdkError> {
        let snapshot = serde_json::to_string_pretty(listings)?;
        let text = match self.locale {
            Locale::En => format!(
                "You are a friendly and helpful real-estate assistant for the agency '{agency}'.\n\
                 Your job is to answer user questions based EXCLUSIVELY on the property information provided below.\n\
                 Do NOT provide any information that is not in the list. If you do not know the answer, say so politely.\n\
                 Be concise and direct.\n\
                 \n\
                 Here are the available properties:\n\
                 {snapshot}\n",
                agency = self.agency_name,
            ),
            Locale::Fr => format!(
                "Tu es un assistant immobilier amical et serviable pour l'agence '{agency}'.\n\
                 Ta mission est de répondre aux questions des utilisateurs en te basant EXCLUSIVEMENT sur les informations des propriétés fournies ci-dessous.\n\
                 Ne fournis AUCUNE information qui n'est pas dans la liste. Si tu ne connais pas la réponse, dis-le poliment.\n\
                 Sois concis et direct.\n\
                 \n\
                 Voici les propriétés disponibles :\n\
                 {snapshot}\n",
                agency = self.agency_name,
            ),
        };
        Ok(text)
    }
}

/// Stateless per call: history comes in as input and is never mutated here.
/// Appending the finished assistant turn is the caller's job.
pub struct ChatSession<'a> {
    model: &'a dyn ChatModel,
    preamble: &'a ChatPreamble,
}

impl<'a> ChatSession<'a> {
    pub fn new(model: &'a dyn ChatModel, preamble: &'a ChatPreamble) -> Self {
        Self { model, preamble }
    }

    /// Open one streaming call for `message`.
    ///
    /// Fragments are yielded exactly in the order the model emits them. If the
    /// stream fails midway, a single `StreamInterrupted` error is yielded and
    /// the stream ends; fragments already yielded stay valid.
    pub async fn send(
        &self,
        history: &[ChatTurn],
        message: &str,
        listings: &[ListingContext],
    ) -> Result<TextStream, SdkError> {
        if message.trim().is_empty() {
            return Err(SdkError::validation("chat message must not be empty"));
        }

        let request = ChatRequest {
            system_instruction: self.preamble.render(listings)?,
            history: history.to_vec(),
            message: message.to_string(),
        };
        debug!(
            target: "listing_ai::chat",
            provider = self.model.provider_name(),
            model = self.model.model_id(),
            turns = request.history.len(),
            listings = listings.len(),
            "opening chat stream"
        );

        let mut inner = self.model.do_stream(request).await?;
        let s = async_stream::stream! {
            let mut emitted = 0usize;
            while let Some(item) = inner.next().await {
                match item {
                    Ok(fragment) => {
                        if fragment.is_empty() {
                            continue;
                        }
                        emitted += 1;
                        yield Ok(fragment);
                    }
                    Err(err) => {
                        warn!(
                            target: "listing_ai::chat",
                            emitted,
                            error = %err.format_details(),
                            "chat stream interrupted"
                        );
                        yield Err(interrupted(err));
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(s))
    }
}

fn interrupted(err: SdkError) -> SdkError {
    match err {
        already @ SdkError::StreamInterrupted { .. } => already,
        other => SdkError::StreamInterrupted {
            message: other.remote_message(),
            source: Some(Box::new(other)),
        },
    }
}
