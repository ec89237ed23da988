use thiserror::Error;

/// Errors that can occur while opening or reading a streamed response
#[derive(Error, Debug)]
pub enum StreamError {
    /// The response body cannot be read as a stream
    #[error("Response body is not readable as a stream")]
    StreamUnavailable,

    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP transport failed, either while connecting or mid-stream
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization of a request body failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request could not be assembled
    #[error("Request builder error: {0}")]
    RequestBuilder(String),
}

impl From<std::convert::Infallible> for StreamError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

impl StreamError {
    /// Status code carried by this error, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            StreamError::Status { status, .. } => Some(*status),
            StreamError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Build a [`StreamError::Status`] from a failed response's status and body
pub fn parse_error_response(status: reqwest::StatusCode, body: &bytes::Bytes) -> StreamError {
    StreamError::Status {
        status: status.as_u16(),
        message: parse_error_body(body),
    }
}

/// Extract a human-readable message from an error body.
///
/// Understands `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`; anything else is returned as lossy text.
#[must_use]
pub fn parse_error_body(body: &[u8]) -> String {
    if let Ok(json_value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = extract_error_message(&json_value) {
            return message;
        }
    }

    String::from_utf8_lossy(body).into_owned()
}

fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    if let Some(error_obj) = json.get("error") {
        if let Some(msg_str) = error_obj.get("message").and_then(|m| m.as_str()) {
            return Some(msg_str.to_string());
        }
        if let Some(msg_str) = error_obj.as_str() {
            return Some(msg_str.to_string());
        }
    }

    json.get("message")
        .and_then(|m| m.as_str())
        .map(ToString::to_string)
}
