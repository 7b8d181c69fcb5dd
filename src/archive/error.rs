use thiserror::Error;

/// The broad class of a [`RetrievalError`], for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalErrorKind {
    Transient,
    InvalidRequest,
    MalformedResponse,
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The archive kept failing with retryable errors until the attempt budget ran out.
    #[error("Archive request to {url} failed after {attempts} attempts: {reason}")]
    Transient {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The request can never succeed as given (bad coordinate, inverted range, 4xx).
    #[error("Invalid archive request: {0}")]
    InvalidRequest(String),

    /// The archive answered, but not with a usable daily series.
    #[error("Malformed archive response: {0}")]
    MalformedResponse(String),
}

impl RetrievalError {
    pub fn kind(&self) -> RetrievalErrorKind {
        match self {
            RetrievalError::Transient { .. } => RetrievalErrorKind::Transient,
            RetrievalError::InvalidRequest(_) => RetrievalErrorKind::InvalidRequest,
            RetrievalError::MalformedResponse(_) => RetrievalErrorKind::MalformedResponse,
        }
    }
}

/// Transport-level failure classes, as reported by an [`crate::ArchiveTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request or response timed out.
    Timeout,
    /// The connection could not be established or was reset.
    Connect,
    /// The connection dropped while the body was being read.
    Body,
    /// The request itself could not be built or sent.
    Request,
}

#[derive(Debug, Clone, Error)]
#[error("{kind:?} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        TransportError::new(kind, e.to_string())
    }
}
