use futures_util::StreamExt;
use serde_json::json;

use crate::core::chat::{ChatModel, ChatPreamble, ChatRequest, ChatSession};
use crate::core::error::{SdkError, TransportError};
use crate::core::stream_collect::{collect_text, collect_text_partial};
use crate::provider_google::chat::{frame_text, GoogleChatModel};
use crate::provider_google::support::*;
use crate::types::ChatTurn;

fn model(transport: TestTransport) -> GoogleChatModel<TestTransport> {
    GoogleChatModel::new("gemini-2.5-flash", config(transport))
}

fn request() -> ChatRequest {
    ChatRequest {
        system_instruction: "Answer from the listings only.".into(),
        history: vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello!")],
        message: "How much is the villa?".into(),
    }
}

#[tokio::test]
async fn sse_frames_become_ordered_text_fragments() {
    let transport = TestTransport::with_stream(vec![
        Ok("data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"The villa\"}],\"role\":\"model\"}}]}\r\n\r\n"),
        Ok("data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" costs 2.29\"}],\"role\":\"model\"}}]}\r\n\r\ndata: {\"candidates\":[{\"content\":{\"parts\":"),
        Ok("[{\"text\":\" billion.\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"totalTokenCount\":42}}\r\n\r\n"),
    ]);
    let chat = model(transport.clone());
    let mut stream = chat.do_stream(request()).await.unwrap();

    let mut fragments = Vec::new();
    while let Some(item) = stream.next().await {
        fragments.push(item.unwrap());
    }
    assert_eq!(fragments, vec!["The villa", " costs 2.29", " billion."]);
    assert_eq!(fragments.concat(), "The villa costs 2.29 billion.");

    let sent = &transport.recorded()[0];
    assert_eq!(
        sent.url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
    );
    assert_eq!(sent.header("accept"), Some("text/event-stream"));
    let body = sent.body.as_ref().unwrap();
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        "Answer from the listings only."
    );
    assert_eq!(body["contents"][1]["role"], "model");
    assert_eq!(body["contents"][2]["parts"][0]["text"], "How much is the villa?");
}

#[tokio::test]
async fn metadata_only_frames_and_keepalives_are_skipped() {
    let transport = TestTransport::with_stream(vec![
        Ok(": keep-alive\n\n"),
        Ok("data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Yes\"}]}}]}\n\n"),
        Ok("data: {\"usageMetadata\":{\"totalTokenCount\":3}}\n\n"),
    ]);
    let text = collect_text(model(transport).do_stream(request()).await.unwrap())
        .await
        .unwrap();
    assert_eq!(text, "Yes");
}

#[tokio::test]
async fn transport_failure_midway_interrupts_the_session() {
    let transport = TestTransport::with_stream(vec![
        Ok("data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"The villa\"}]}}]}\n\n"),
        Err(TransportError::IdleReadTimeout(std::time::Duration::from_secs(45))),
    ]);
    let chat = model(transport);
    let preamble = ChatPreamble::default();
    let stream = ChatSession::new(&chat, &preamble)
        .send(&[], "Price?", &[])
        .await
        .unwrap();

    let collected = collect_text_partial(stream).await;
    assert_eq!(collected.text, "The villa");
    assert!(matches!(
        collected.error,
        Some(SdkError::StreamInterrupted { .. })
    ));
}

#[tokio::test]
async fn error_frame_ends_the_stream_with_the_service_message() {
    let transport = TestTransport::with_stream(vec![Ok(
        "data: {\"error\":{\"code\":503,\"message\":\"The model is overloaded.\",\"status\":\"UNAVAILABLE\"}}\n\n",
    )]);
    let stream = model(transport).do_stream(request()).await.unwrap();
    let collected = collect_text_partial(stream).await;
    let err = collected.error.unwrap();
    assert_eq!(err.remote_message(), "The model is overloaded.");
    assert!(matches!(err, SdkError::Upstream { status: 503, .. }));
}

#[tokio::test]
async fn rejected_stream_request_fails_before_any_fragment() {
    let transport = TestTransport::default();
    let err = match model(transport).do_stream(request()).await {
        Ok(_) => panic!("expected an error"),
        Err(err) => err,
    };
    assert!(matches!(err, SdkError::Transport(_)));
}

#[test]
fn thought_parts_are_not_visible_text() {
    let frame = json!({"candidates": [{"content": {"parts": [
        {"text": "thinking...", "thought": true},
        {"text": "Answer"}
    ]}}]});
    assert_eq!(frame_text(&frame), "Answer");
    assert_eq!(frame_text(&json!({})), "");
}
