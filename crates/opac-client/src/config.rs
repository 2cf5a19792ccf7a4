//! Catalog connection and display settings consumed by the client.

use std::time::Duration;

use opac_core::call_number::CallNumberDisplay;
use opac_core::types::{ValidationError, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default catalog, the Koha community demo instance.
pub const DEFAULT_BASE_URL: &str = "https://demo.koha-community.org";

const MAX_TIMEOUT_SECS: u64 = 300;

/// Errors raised when a configuration value is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL with a host.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The request timeout is outside `1..=300` seconds.
    #[error("request timeout must be between 1 and 300 seconds (got {0})")]
    InvalidTimeout(u64),
    /// A value failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(String),
}

/// Read-only settings for one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog root, e.g. `https://catalog.example.org`.
    pub base_url: String,
    /// REST API version segment.
    pub api_version: String,
    /// Library name shown in the terminal header.
    pub library_name: String,
    /// Which call-number schemes to show.
    pub call_number_display: CallNumberDisplay,
    /// Local term for call numbers, e.g. `Call Number` or `Shelfmark`.
    pub call_number_label: String,
    /// Result rows per page.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Pause before the single retry, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Scrape the OPAC pages when the REST endpoints are unusable.
    pub opac_fallback: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: "v1".to_owned(),
            library_name: "PUBLIC LIBRARY".to_owned(),
            call_number_display: CallNumberDisplay::Both,
            call_number_label: "Call Number".to_owned(),
            page_size: 10,
            request_timeout_secs: 30,
            retry_backoff_ms: 500,
            opac_fallback: true,
        }
    }
}

impl CatalogConfig {
    /// Check every value the client depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a malformed base URL, an out-of-range page
    /// size, or an out-of-range timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: reason.to_owned(),
        };
        let url = reqwest::Url::parse(self.base_url.trim()).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ValidationError::PageSizeOutOfRange {
                min: MIN_PAGE_SIZE,
                max: MAX_PAGE_SIZE,
                got: self.page_size,
            }
            .into());
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ConfigError::InvalidTimeout(self.request_timeout_secs));
        }
        Ok(())
    }

    fn root(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Base of the anonymous REST API, e.g. `https://host/api/v1/public`.
    #[must_use]
    pub fn public_api_url(&self) -> String {
        format!("{}/api/{}/public", self.root(), self.api_version)
    }

    /// OPAC search page.
    #[must_use]
    pub fn opac_search_url(&self) -> String {
        format!("{}/cgi-bin/koha/opac-search.pl", self.root())
    }

    /// OPAC detail page.
    #[must_use]
    pub fn opac_detail_url(&self) -> String {
        format!("{}/cgi-bin/koha/opac-detail.pl", self.root())
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pause before the single retry.
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
