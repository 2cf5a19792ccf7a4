//! HTTP transport trait, `reqwest`-backed implementation, and retry policy.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::error::TransportError;

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `Accept` value for REST JSON endpoints.
pub const ACCEPT_JSON: &str = "application/json";
/// `Accept` value for MARC-in-JSON record bodies.
pub const ACCEPT_MARC_IN_JSON: &str = "application/marc-in-json";
/// `Accept` value for OPAC pages.
pub const ACCEPT_HTML: &str = "text/html";

/// An anonymous GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters, encoded by the transport.
    pub query: Vec<(String, String)>,
    /// `Accept` header value.
    pub accept: &'static str,
}

impl Request {
    /// A JSON GET for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            accept: ACCEPT_JSON,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Replace the `Accept` header.
    #[must_use]
    pub fn accept(mut self, mime: &'static str) -> Self {
        self.accept = mime;
        self
    }

    /// Value of the first parameter named `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// `X-Total-Count` header, when present and numeric.
    pub total_count: Option<u64>,
    /// Response body.
    pub body: String,
}

impl Response {
    /// A response with `status` and `body` and no count header.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            total_count: None,
            body: body.into(),
        }
    }

    /// 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Sends GET requests to the catalog host.
pub trait Transport: Send + Sync {
    /// Send `request` once and read the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received. Error
    /// statuses are returned as ordinary responses.
    fn get<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>>;
}

/// `reqwest`-backed implementation of [`Transport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Arc<reqwest::Client>,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the TLS backend cannot be set up.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("opac-term/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            http: Arc::new(http),
        })
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>> {
        Box::pin(async move {
            debug!("GET {} {:?}", request.url, request.query);

            let response = self
                .http
                .get(&request.url)
                .query(&request.query)
                .header(reqwest::header::ACCEPT, request.accept)
                .send()
                .await?;

            let status = response.status().as_u16();
            let total_count = response
                .headers()
                .get("x-total-count")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = response.text().await?;

            debug!("{} -> {status} ({} bytes)", request.url, body.len());

            Ok(Response {
                status,
                total_count,
                body,
            })
        })
    }
}

/// Retry-once policy for timeouts and 5xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause before the retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Send `request`, retrying once after `backoff` on a timeout or 5xx.
    ///
    /// Connection failures and 4xx responses are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns the [`TransportError`] of the last attempt.
    pub async fn send(
        &self,
        transport: &dyn Transport,
        request: &Request,
    ) -> Result<Response, TransportError> {
        match transport.get(request).await {
            Ok(response) if response.is_server_error() => {
                warn!(
                    "{} answered {}; retrying in {:?}",
                    request.url, response.status, self.backoff
                );
            }
            Err(TransportError::Timeout) => {
                warn!("{} timed out; retrying in {:?}", request.url, self.backoff);
            }
            other => return other,
        }
        tokio::time::sleep(self.backoff).await;
        transport.get(request).await
    }
}
