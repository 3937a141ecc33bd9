//! Incremental Server-Sent Events decoding.
//!
//! `SseDecoder` turns arbitrarily split byte chunks into complete events.
//! `sse_events` wraps a transport byte stream with it.

use std::collections::VecDeque;

mod stream;

pub use stream::sse_events;

/// One dispatched event. `data` joins multiple `data:` lines with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

impl SseEvent {
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// True for keep-alive frames that carry nothing worth parsing.
    pub fn is_blank(&self) -> bool {
        self.data.trim().is_empty()
    }
}

/// Line-oriented decoder. Accepts `\n`, `\r\n` and bare `\r` line endings,
/// including a `\r\n` pair split across two chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    pending_cr: bool,
    data: Vec<String>,
    event: Option<String>,
    id: Option<String>,
    ready: VecDeque<SseEvent>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and drain the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> impl Iterator<Item = SseEvent> + '_ {
        for &byte in chunk {
            if std::mem::take(&mut self.pending_cr) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\n' => self.end_line(),
                b'\r' => {
                    self.end_line();
                    self.pending_cr = true;
                }
                other => self.line.push(other),
            }
        }
        self.ready.drain(..)
    }

    /// Flush a trailing event the server closed without a blank line.
    pub fn finish(&mut self) -> impl Iterator<Item = SseEvent> + '_ {
        if !self.line.is_empty() {
            self.end_line();
        }
        self.dispatch();
        self.pending_cr = false;
        self.ready.drain(..)
    }

    pub fn has_buffered_data(&self) -> bool {
        !self.line.is_empty() || !self.data.is_empty()
    }

    fn end_line(&mut self) {
        let raw = std::mem::take(&mut self.line);
        if raw.is_empty() {
            self.dispatch();
            return;
        }
        let line = String::from_utf8_lossy(&raw);
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_ref(), ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        if self.data.is_empty() {
            self.event = None;
            return;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        self.ready.push_back(SseEvent {
            event: self.event.take(),
            data,
            id: self.id.clone(),
        });
    }
}

#[cfg(test)]
#[path = "../tests/decoder_tests.rs"]
mod decoder_tests;
