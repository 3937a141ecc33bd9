use bytes::Bytes;
use serde_json::json;

use crate::core::error::SdkError;
use crate::core::image::ImageEditModel;
use crate::provider_google::image_edit::GoogleImageEditModel;
use crate::provider_google::support::*;
use crate::types::media::EditRequest;

fn model(transport: TestTransport) -> GoogleImageEditModel<TestTransport> {
    GoogleImageEditModel::new("gemini-2.5-flash-image", config(transport))
}

fn request() -> EditRequest {
    EditRequest::new(
        Bytes::from_static(b"jpeg"),
        "image/jpeg",
        "Remove the person in the background",
    )
}

#[tokio::test]
async fn first_inline_image_part_is_decoded() {
    let transport = TestTransport::with_json(vec![Ok(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "Here is your image."},
                    {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}},
                    {"inlineData": {"mimeType": "image/png", "data": "d29ybGQ="}}
                ]
            },
            "finishReason": "STOP"
        }]
    }))]);
    let edited = model(transport.clone()).do_edit(request()).await.unwrap();

    assert_eq!(edited.data, Bytes::from_static(b"hello"));
    assert_eq!(edited.media_type, "image/png");

    let sent = transport.recorded();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
    );
    assert_eq!(sent[0].header("x-goog-api-key"), Some("test-key"));
    let body = sent[0].body.as_ref().unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "anBlZw==");
    assert_eq!(
        body["contents"][0]["parts"][1]["text"],
        "Remove the person in the background"
    );
    assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
}

#[tokio::test]
async fn text_only_response_is_no_content() {
    let transport = TestTransport::with_json(vec![Ok(json!({
        "candidates": [{"content": {"parts": [{"text": "I cannot edit this image."}]}}]
    }))]);
    let err = model(transport).do_edit(request()).await.unwrap_err();
    assert!(matches!(err, SdkError::NoContentProduced), "{err:?}");
}

#[tokio::test]
async fn blocked_prompt_is_no_content() {
    let transport = TestTransport::with_json(vec![Ok(json!({
        "promptFeedback": {"blockReason": "SAFETY"}
    }))]);
    let err = model(transport).do_edit(request()).await.unwrap_err();
    assert!(matches!(err, SdkError::NoContentProduced), "{err:?}");
}

#[tokio::test]
async fn http_error_carries_the_service_message() {
    let transport = TestTransport::with_json(vec![Err(http_error(
        400,
        json!({
            "error": {
                "code": 400,
                "message": "Unsupported MIME type",
                "status": "INVALID_ARGUMENT"
            }
        }),
    ))]);
    let err = model(transport).do_edit(request()).await.unwrap_err();
    match err {
        SdkError::Upstream { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Unsupported MIME type");
        }
        other => panic!("unexpected: {other:?}"),
    }
}
