//! The HTTP seam between [`crate::SeriesFetcher`] and the archive.
//!
//! The fetcher only needs "GET this URL with these query parameters and give me
//! the status and body", so that is all [`ArchiveTransport`] asks for. Tests plug in
//! a fake; production code uses [`HttpTransport`].

use crate::archive::error::{RetrievalError, TransportError};
use log::debug;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("climate-anomaly/", env!("CARGO_PKG_VERSION"));

/// Status code and body of an archive response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single blocking GET. Implementations must not retry on their own;
/// retries are decided by the caller.
pub trait ArchiveTransport: Send + Sync {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError>;
}

/// [`ArchiveTransport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds a client with a 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidRequest`] if the TLS backend or client
    /// configuration cannot be initialised.
    pub fn new() -> Result<Self, RetrievalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                RetrievalError::InvalidRequest(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl ArchiveTransport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
        debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}
