use crate::core::error::{build_http_status_transport_error, TransportError};
use crate::core::transport::{
    emit_transport_event, redact_url, ByteStream, HttpTransport, TransportBody, TransportConfig,
    TransportEvent,
};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::error::Error as StdError;
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

const LOG_TARGET: &str = "listing_ai::transport::reqwest";

/// Header names whose values never reach observers.
const SECRET_HEADERS: &[&str] = &["x-goog-api-key", "authorization"];

/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    fn configure_builder(
        mut builder: reqwest::ClientBuilder,
        cfg: &TransportConfig,
    ) -> reqwest::ClientBuilder {
        builder = builder
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(req_timeout) = cfg.request_timeout {
            builder = builder.timeout(req_timeout);
        }
        builder.connect_timeout(cfg.connect_timeout)
    }

    fn try_new_with_builder(
        cfg: &TransportConfig,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, TransportError> {
        let client = Self::configure_builder(builder, cfg)
            .build()
            .map_err(|err| {
                TransportError::Other(format!(
                    "reqwest client build failed: {}",
                    format_reqwest_error_chain(&err)
                ))
            })?;
        Ok(Self { client })
    }

    pub fn try_new(cfg: &TransportConfig) -> Result<Self, TransportError> {
        Self::try_new_with_builder(cfg, Client::builder())
    }

    /// Like `try_new`, but falls back to a default client if the configured
    /// one cannot be built.
    pub fn new(cfg: &TransportConfig) -> Self {
        match Self::try_new(cfg) {
            Ok(transport) => transport,
            Err(err) => {
                debug!(
                    target: LOG_TARGET,
                    error = %err,
                    "falling back to reqwest::Client::new after transport init failure"
                );
                Self {
                    client: Client::new(),
                }
            }
        }
    }

    /// Send the request, turning connection failures and non-2xx statuses
    /// into `TransportError`s and reporting them to the observer.
    async fn send(
        &self,
        req: RequestBuilder,
        exchange: Exchange,
        cfg: &TransportConfig,
    ) -> Result<(Response, Exchange), TransportError> {
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                let detail = format_reqwest_error_chain(&e);
                debug!(target: LOG_TARGET, url = %exchange.url, %detail, "request failed");
                exchange.emit(None, Vec::new(), None, None, Some(detail.clone()));
                return Err(if e.is_connect() {
                    TransportError::Network(format!("connect: {detail}"))
                } else if e.is_timeout() {
                    TransportError::ConnectTimeout(cfg.connect_timeout)
                } else {
                    TransportError::Network(detail)
                });
            }
        };

        let status = resp.status().as_u16();
        if resp.status().is_success() {
            return Ok((resp, exchange));
        }

        let res_headers = header_pairs(resp.headers());
        let body_text = resp.text().await.unwrap_or_default();
        let err = build_http_status_transport_error(status, body_text.clone(), res_headers.clone());
        debug!(target: LOG_TARGET, url = %exchange.url, status, "non-success status");
        exchange.emit(
            Some(status),
            res_headers,
            Some(TransportBody::Text(body_text.clone())),
            Some(body_text.len()),
            Some(err.to_string()),
        );
        Err(err)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    type StreamResponse = (ByteStream, Vec<(String, String)>);

    fn into_stream(resp: Self::StreamResponse) -> (ByteStream, Vec<(String, String)>) {
        resp
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        cfg: &TransportConfig,
    ) -> Result<Self::StreamResponse, TransportError> {
        let cleaned_body = clean_body(body, cfg);
        let req = with_headers(self.client.post(url).json(&cleaned_body), headers, true);
        let exchange = Exchange::start("POST", url, headers, Some(cleaned_body), true);
        let (resp, exchange) = self.send(req, exchange, cfg).await?;

        let status = resp.status().as_u16();
        let res_headers = header_pairs(resp.headers());
        exchange.emit(Some(status), res_headers.clone(), None, None, None);

        let idle = cfg.idle_read_timeout;
        let mut inner = resp.bytes_stream();
        let s = async_stream::try_stream! {
            loop {
                match tokio::time::timeout(idle, inner.next()).await {
                    Err(_) => Err(TransportError::IdleReadTimeout(idle))?,
                    Ok(None) => break,
                    Ok(Some(Err(e))) if e.is_timeout() => {
                        Err(TransportError::IdleReadTimeout(idle))?
                    }
                    Ok(Some(Err(e))) => Err(TransportError::BodyRead(e.to_string()))?,
                    Ok(Some(Ok(chunk))) => {
                        yield chunk;
                    }
                }
            }
        };
        Ok((Box::pin(s), res_headers))
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        cfg: &TransportConfig,
    ) -> Result<(Value, Vec<(String, String)>), TransportError> {
        let cleaned_body = clean_body(body, cfg);
        let req = with_headers(self.client.post(url).json(&cleaned_body), headers, true);
        let exchange = Exchange::start("POST", url, headers, Some(cleaned_body), false);
        let (resp, exchange) = self.send(req, exchange, cfg).await?;
        read_json(resp, exchange).await
    }

    async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        cfg: &TransportConfig,
    ) -> Result<(Value, Vec<(String, String)>), TransportError> {
        let req = with_headers(self.client.get(url), headers, false);
        let exchange = Exchange::start("GET", url, headers, None, false);
        let (resp, exchange) = self.send(req, exchange, cfg).await?;
        read_json(resp, exchange).await
    }

    async fn get_bytes(
        &self,
        url: &str,
        headers: &[(String, String)],
        cfg: &TransportConfig,
    ) -> Result<(Bytes, Vec<(String, String)>), TransportError> {
        let req = with_headers(self.client.get(url), headers, false);
        let exchange = Exchange::start("GET", url, headers, None, false);
        let (resp, exchange) = self.send(req, exchange, cfg).await?;

        let status = resp.status().as_u16();
        let res_headers = header_pairs(resp.headers());
        let idle = cfg.idle_read_timeout;
        let body = resp.bytes_stream().map(move |item| {
            item.map_err(|e| {
                if e.is_timeout() {
                    TransportError::IdleReadTimeout(idle)
                } else {
                    TransportError::BodyRead(e.to_string())
                }
            })
        });
        let bytes = match read_body_with_idle_timeout(body, idle).await {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(
                    target: LOG_TARGET,
                    url = %exchange.url,
                    error = %err,
                    "download body read failed"
                );
                exchange.emit(Some(status), res_headers, None, None, Some(err.to_string()));
                return Err(err);
            }
        };
        exchange.emit(
            Some(status),
            res_headers.clone(),
            None,
            Some(bytes.len()),
            None,
        );
        Ok((bytes, res_headers))
    }
}

/// Request-side facts captured before sending, reported once the outcome is
/// known. URL and secret headers are redacted up front.
struct Exchange {
    started_at: SystemTime,
    start: Instant,
    method: &'static str,
    url: String,
    request_headers: Vec<(String, String)>,
    request_body: Option<TransportBody>,
    is_stream: bool,
}

impl Exchange {
    fn start(
        method: &'static str,
        url: &str,
        headers: &[(String, String)],
        body: Option<Value>,
        is_stream: bool,
    ) -> Self {
        Self {
            started_at: SystemTime::now(),
            start: Instant::now(),
            method,
            url: redact_url(url),
            request_headers: redact_headers(headers),
            request_body: body.map(TransportBody::Json),
            is_stream,
        }
    }

    fn emit(
        self,
        status: Option<u16>,
        response_headers: Vec<(String, String)>,
        response_body: Option<TransportBody>,
        response_size: Option<usize>,
        error: Option<String>,
    ) {
        emit_transport_event(TransportEvent {
            started_at: self.started_at,
            latency: Some(self.start.elapsed()),
            method: self.method.to_string(),
            url: self.url,
            status,
            request_headers: self.request_headers,
            response_headers,
            request_body: self.request_body,
            response_body,
            response_size,
            error,
            is_stream: self.is_stream,
        });
    }
}

async fn read_json(
    resp: Response,
    exchange: Exchange,
) -> Result<(Value, Vec<(String, String)>), TransportError> {
    let status = resp.status().as_u16();
    let res_headers = header_pairs(resp.headers());
    let text = resp
        .text()
        .await
        .map_err(|e| TransportError::BodyRead(e.to_string()))?;
    let size = text.len();
    let json: Value = serde_json::from_str(&text)
        .map_err(|e| TransportError::Other(format!("invalid JSON response: {e}")))?;
    exchange.emit(
        Some(status),
        res_headers.clone(),
        Some(TransportBody::Json(json.clone())),
        Some(size),
        None,
    );
    Ok((json, res_headers))
}

/// Drain a response body, failing if no chunk arrives within `idle`.
async fn read_body_with_idle_timeout<S>(body: S, idle: Duration) -> Result<Bytes, TransportError>
where
    S: futures_core::Stream<Item = Result<Bytes, TransportError>>,
{
    futures_util::pin_mut!(body);
    let mut buf = BytesMut::new();
    loop {
        match tokio::time::timeout(idle, body.next()).await {
            Err(_) => return Err(TransportError::IdleReadTimeout(idle)),
            Ok(None) => return Ok(buf.freeze()),
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk?),
        }
    }
}

fn clean_body(body: &Value, cfg: &TransportConfig) -> Value {
    if cfg.strip_null_fields {
        crate::core::json::without_null_fields(body)
    } else {
        body.clone()
    }
}

fn with_headers(
    mut req: RequestBuilder,
    headers: &[(String, String)],
    json_body: bool,
) -> RequestBuilder {
    for (k, v) in headers {
        // `.json()` already sets the content type
        if json_body && k.eq_ignore_ascii_case("content-type") {
            continue;
        }
        req = req.header(k, v);
    }
    req
}

fn redact_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            if SECRET_HEADERS.iter().any(|s| k.eq_ignore_ascii_case(s)) {
                (k.clone(), "***".to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

fn header_pairs(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
        .collect()
}

fn format_reqwest_error_chain(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(src) = current {
        out.push_str(": ");
        out.push_str(&src.to_string());
        current = src.source();
    }
    out
}
