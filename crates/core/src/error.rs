use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Fixed label placed in front of a remote job failure message.
pub const JOB_FAILED_LABEL: &str = "video generation failed";

#[derive(Debug, Error)]
pub enum SdkError {
    /// Caller-supplied input was rejected before any remote call.
    #[error("invalid argument: {message}")]
    Validation { message: String },
    /// The job creation call failed; no operation handle was obtained.
    #[error("job submission rejected: {message}")]
    RemoteRejection {
        message: String,
        #[source]
        source: Option<Box<SdkError>>,
    },
    /// The remote side reported a terminal failure after polling began.
    #[error("{}: {}", JOB_FAILED_LABEL, .message)]
    JobFailed { message: String },
    #[error("video generation finished, but no download link was returned")]
    NoArtifactProduced,
    #[error("the API key may be invalid or lack the required permissions; please select it again")]
    InvalidatedCredential,
    /// The job succeeded but its artifact could not be downloaded.
    #[error("failed to download the generated video: {message}")]
    DownloadFailed {
        status: Option<u16>,
        message: String,
    },
    #[error("chat stream interrupted: {message}")]
    StreamInterrupted {
        message: String,
        #[source]
        source: Option<Box<SdkError>>,
    },
    #[error("no image was produced by the model")]
    NoContentProduced,
    #[error("upstream error (status {status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<TransportError>>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SdkError {
    pub fn validation(message: impl Into<String>) -> Self {
        SdkError::Validation {
            message: message.into(),
        }
    }

    /// The message as reported by the remote side, without any label this
    /// crate adds.
    pub fn remote_message(&self) -> String {
        match self {
            SdkError::Upstream { message, .. } => message.clone(),
            SdkError::JobFailed { message } => message.clone(),
            SdkError::RemoteRejection {
                source: Some(src), ..
            } => src.remote_message(),
            SdkError::RemoteRejection { message, .. } => message.clone(),
            SdkError::Transport(te) => te.to_string(),
            other => other.to_string(),
        }
    }

    /// Format error details for better debugging visibility
    pub fn format_details(&self) -> String {
        match self {
            SdkError::Upstream {
                status,
                message,
                source,
            } => {
                let mut msg = format!("http status {}: {}", status, message);

                // Add source body if different from message
                if let Some(src) = source {
                    if let TransportError::HttpStatus { body, .. } = src.as_ref() {
                        if !message.contains(body) && !body.is_empty() {
                            msg.push_str(&format!(" [body: {}]", display_body_for_error(body)));
                        }
                    }
                }

                msg
            }
            SdkError::RemoteRejection {
                source: Some(src), ..
            } => format!("job submission rejected: {}", src.format_details()),
            SdkError::StreamInterrupted {
                source: Some(src), ..
            } => format!("chat stream interrupted: {}", src.format_details()),
            SdkError::DownloadFailed {
                status: Some(status),
                message,
            } => format!("download failed (http status {}): {}", status, message),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http status {status}: {sanitized}")]
    HttpStatus {
        status: u16,
        /// upstream body (should be treated as sensitive; only log sanitized)
        body: String,
        /// Sanitized message for display
        sanitized: String,
        /// Upstream response headers (lowercased keys where possible)
        headers: Vec<(String, String)>,
    },
    #[error("network: {0}")]
    Network(String),
    #[error("connect timeout after {0:?}")]
    ConnectTimeout(Duration),
    #[error("idle read timeout after {0:?}")]
    IdleReadTimeout(Duration),
    #[error("body read error: {0}")]
    BodyRead(String),
    #[error("other: {0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn sanitized_message(&self) -> String {
        match self {
            TransportError::HttpStatus { status, .. } => http_status_fallback_message(*status),
            _ => self.to_string(),
        }
    }
}

pub fn http_status_fallback_message(status: u16) -> String {
    format!("http status {status}")
}

pub fn build_http_status_transport_error(
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
) -> TransportError {
    TransportError::HttpStatus {
        status,
        body,
        sanitized: http_status_fallback_message(status),
        headers,
    }
}

pub fn map_http_status_to_upstream_error(
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
    message: Option<String>,
) -> SdkError {
    let fallback = http_status_fallback_message(status);
    let source = build_http_status_transport_error(status, body, headers);
    SdkError::Upstream {
        status,
        message: message.unwrap_or(fallback),
        source: Some(Box::new(source)),
    }
}

pub fn display_body_for_error(body: &str) -> String {
    let trimmed = body.trim();
    let looks_like_json = trimmed.starts_with('{') || trimmed.starts_with('[');
    if looks_like_json {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(v) => v.to_string(), // minified JSON
            Err(_) => format!("{} bytes", body.len()),
        }
    } else {
        format!("{} bytes", body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{map_http_status_to_upstream_error, SdkError, TransportError};

    #[test]
    fn upstream_helper_uses_parsed_message_when_present() {
        let mapped = map_http_status_to_upstream_error(
            404,
            "{\"error\":{\"message\":\"Requested entity was not found.\"}}".into(),
            vec![("x-test".into(), "1".into())],
            Some("Requested entity was not found.".into()),
        );

        match mapped {
            SdkError::Upstream {
                status,
                message,
                source,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Requested entity was not found.");
                match source.as_deref() {
                    Some(TransportError::HttpStatus { sanitized, .. }) => {
                        assert_eq!(sanitized, "http status 404")
                    }
                    other => panic!("unexpected source: {other:?}"),
                }
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn upstream_helper_uses_http_status_fallback_when_message_missing() {
        let mapped =
            map_http_status_to_upstream_error(503, "upstream unavailable".into(), Vec::new(), None);
        assert_eq!(mapped.remote_message(), "http status 503");
    }

    #[test]
    fn rejection_exposes_the_raw_remote_message() {
        let err = SdkError::RemoteRejection {
            message: "boom".into(),
            source: Some(Box::new(SdkError::Upstream {
                status: 400,
                message: "prompt blocked".into(),
                source: None,
            })),
        };
        assert_eq!(err.remote_message(), "prompt blocked");
        assert_eq!(
            err.format_details(),
            "job submission rejected: http status 400: prompt blocked"
        );
    }

    #[test]
    fn job_failed_display_carries_fixed_label_and_raw_message() {
        let err = SdkError::JobFailed {
            message: "quota exhausted".into(),
        };
        assert_eq!(err.to_string(), "video generation failed: quota exhausted");
    }

    #[test]
    fn every_variant_has_a_non_empty_message() {
        let errors = vec![
            SdkError::validation("prompt must not be empty"),
            SdkError::NoArtifactProduced,
            SdkError::InvalidatedCredential,
            SdkError::NoContentProduced,
            SdkError::DownloadFailed {
                status: Some(403),
                message: "forbidden".into(),
            },
            SdkError::StreamInterrupted {
                message: "reset".into(),
                source: None,
            },
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
            assert!(!err.format_details().is_empty());
        }
    }
}
