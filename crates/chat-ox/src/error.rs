use stream_ox::StreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The request failed before any of the reply was streamed: non-success
    /// status, unreadable body or connection failure.
    #[error("Failed to create message")]
    CreateMessage(#[source] StreamError),

    /// The connection broke while the reply was streaming
    #[error("Response stream failed: {0}")]
    Stream(#[source] StreamError),

    /// Saving the finished reply failed
    #[error("Failed to save message: {0}")]
    Persistence(String),
}

impl ChatError {
    /// HTTP status behind this error, when the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::CreateMessage(e) | ChatError::Stream(e) => e.status(),
            ChatError::Persistence(_) => None,
        }
    }

    /// Whether the error happened before streaming began.
    #[must_use]
    pub fn is_setup_failure(&self) -> bool {
        matches!(self, ChatError::CreateMessage(_))
    }
}
