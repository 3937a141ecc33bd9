use serde::{Deserialize, Serialize};

use crate::core::error::{map_http_status_to_upstream_error, SdkError, TransportError};
use crate::types::operation::OperationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleErrorInner {
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

impl From<GoogleErrorInner> for OperationError {
    fn from(inner: GoogleErrorInner) -> Self {
        OperationError {
            code: inner.code,
            message: inner.message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleErrorData {
    pub error: GoogleErrorInner,
}

/// Map a transport failure to `SdkError`, lifting the message out of a
/// Google JSON error body when there is one.
pub fn map_transport_error_to_sdk_error(te: TransportError) -> SdkError {
    match te {
        TransportError::HttpStatus {
            status,
            body,
            headers,
            ..
        } => {
            let message = serde_json::from_str::<GoogleErrorData>(&body)
                .ok()
                .map(|parsed| parsed.error.message)
                .filter(|m| !m.trim().is_empty());
            map_http_status_to_upstream_error(status, body, headers, message)
        }
        other => SdkError::Transport(other),
    }
}

/// An `{"error": {...}}` object embedded in an otherwise successful payload
/// (stream frames, operation resources).
pub fn embedded_error(value: &serde_json::Value) -> Option<GoogleErrorInner> {
    let error = value.get("error")?;
    serde_json::from_value(error.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_error_body_message_is_lifted() {
        let te = TransportError::HttpStatus {
            status: 404,
            body: json!({
                "error": {
                    "code": 404,
                    "message": "Requested entity was not found.",
                    "status": "NOT_FOUND"
                }
            })
            .to_string(),
            sanitized: "http status 404".into(),
            headers: vec![],
        };
        let err = map_transport_error_to_sdk_error(te);
        assert_eq!(err.remote_message(), "Requested entity was not found.");
        assert!(matches!(err, SdkError::Upstream { status: 404, .. }));
    }

    #[test]
    fn non_json_body_falls_back_to_status() {
        let te = TransportError::HttpStatus {
            status: 502,
            body: "<html>bad gateway</html>".into(),
            sanitized: "http status 502".into(),
            headers: vec![],
        };
        assert_eq!(
            map_transport_error_to_sdk_error(te).remote_message(),
            "http status 502"
        );
    }

    #[test]
    fn network_errors_stay_transport_errors() {
        let err = map_transport_error_to_sdk_error(TransportError::Network("reset".into()));
        assert!(matches!(err, SdkError::Transport(_)));
    }
}
