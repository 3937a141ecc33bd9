use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use serde_json::Value;

use crate::core::error::TransportError;
use crate::core::transport::{ByteStream, HttpTransport, TransportConfig};
use crate::provider_google::provider::GoogleConfig;

/// One request seen by the fake transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport that replays queued responses in call order and records every
/// request.
#[derive(Clone, Default)]
pub struct TestTransport {
    json: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    stream_chunks: Arc<Mutex<Option<Vec<Result<Bytes, TransportError>>>>>,
    bytes: Arc<Mutex<Option<Result<(Bytes, Vec<(String, String)>), TransportError>>>>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestTransport {
    pub fn with_json(responses: Vec<Result<Value, TransportError>>) -> Self {
        let t = Self::default();
        *t.json.lock().unwrap() = responses.into();
        t
    }

    pub fn with_stream(chunks: Vec<Result<&'static str, TransportError>>) -> Self {
        let t = Self::default();
        *t.stream_chunks.lock().unwrap() = Some(
            chunks
                .into_iter()
                .map(|c| c.map(|s| Bytes::from_static(s.as_bytes())))
                .collect(),
        );
        t
    }

    pub fn with_bytes(result: Result<(Bytes, Vec<(String, String)>), TransportError>) -> Self {
        let t = Self::default();
        *t.bytes.lock().unwrap() = Some(result);
        t
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) {
        self.requests.lock().unwrap().push(Recorded {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
            body: body.cloned(),
        });
    }

    fn next_json(&self) -> Result<(Value, Vec<(String, String)>), TransportError> {
        self.json
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".into())))
            .map(|v| (v, vec![]))
    }
}

pub struct TestStreamResponse {
    chunks: Vec<Result<Bytes, TransportError>>,
}

#[async_trait]
impl HttpTransport for TestTransport {
    type StreamResponse = TestStreamResponse;

    fn into_stream(resp: Self::StreamResponse) -> (ByteStream, Vec<(String, String)>) {
        (Box::pin(stream::iter(resp.chunks)), vec![])
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        _cfg: &TransportConfig,
    ) -> Result<Self::StreamResponse, TransportError> {
        self.record("POST", url, headers, Some(body));
        match self.stream_chunks.lock().unwrap().take() {
            Some(chunks) => Ok(TestStreamResponse { chunks }),
            None => Err(TransportError::Other("no scripted stream".into())),
        }
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        _cfg: &TransportConfig,
    ) -> Result<(Value, Vec<(String, String)>), TransportError> {
        self.record("POST", url, headers, Some(body));
        self.next_json()
    }

    async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        _cfg: &TransportConfig,
    ) -> Result<(Value, Vec<(String, String)>), TransportError> {
        self.record("GET", url, headers, None);
        self.next_json()
    }

    async fn get_bytes(
        &self,
        url: &str,
        headers: &[(String, String)],
        _cfg: &TransportConfig,
    ) -> Result<(Bytes, Vec<(String, String)>), TransportError> {
        self.record("GET", url, headers, None);
        self.bytes
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted bytes".into())))
    }
}

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub fn config(transport: TestTransport) -> GoogleConfig<TestTransport> {
    GoogleConfig::new(BASE_URL, Some("test-key".into()), transport)
}

pub fn http_error(status: u16, body: Value) -> TransportError {
    TransportError::HttpStatus {
        status,
        body: body.to_string(),
        sanitized: format!("http status {status}"),
        headers: vec![],
    }
}
