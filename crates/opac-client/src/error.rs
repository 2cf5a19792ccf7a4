//! Error types for catalog client operations.

use opac_core::types::{RecordId, ValidationError};
use thiserror::Error;

/// Errors reported to callers of the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The query has no usable terms or was rejected by the catalog.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// Neither search path produced a usable answer.
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),
    /// The record identifier does not exist.
    #[error("record {0} not found")]
    RecordNotFound(RecordId),
    /// Record, holdings or library data could not be retrieved.
    #[error("details unavailable: {0}")]
    DetailUnavailable(String),
    /// The catalog host could not be reached.
    #[error("cannot reach catalog: {0}")]
    NetworkUnreachable(String),
}

impl From<ValidationError> for CatalogError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidQuery(e.to_string())
    }
}

/// Errors raised while sending a single HTTP request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response arrived within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The connection could not be established.
    #[error("could not connect: {0}")]
    Connect(String),
    /// Any other request failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

/// Errors raised by a single search source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The endpoint answered with a non-success status.
    #[error("unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code received.
        status: u16,
    },
    /// The source cannot express this kind of query.
    #[error("query not supported by this source: {0}")]
    Unsupported(String),
    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl SourceError {
    /// `true` when the host could not be reached at all.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Connect(_)))
    }
}
