use futures_core::Stream;
use futures_util::StreamExt;

use crate::core::error::TransportError;
use crate::core::transport::ByteStream;
use crate::streaming_sse::{SseDecoder, SseEvent};

/// Decode a transport byte stream into SSE events.
///
/// A transport error is yielded once and ends the stream. When the body ends
/// cleanly, any event left without its terminating blank line is flushed.
pub fn sse_events(
    mut body: ByteStream,
) -> impl Stream<Item = Result<SseEvent, TransportError>> + Send {
    async_stream::stream! {
        let mut decoder = SseDecoder::new();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    let events: Vec<SseEvent> = decoder.push(&bytes).collect();
                    for event in events {
                        yield Ok(event);
                    }
                }
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
        }
        let rest: Vec<SseEvent> = decoder.finish().collect();
        for event in rest {
            yield Ok(event);
        }
    }
}
