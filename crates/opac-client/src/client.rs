//! The catalog client: search with fallback, detail, holdings and libraries.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};
use opac_core::holding::ItemHolding;
use opac_core::marc::MarcRecord;
use opac_core::page::{ResultSource, SearchResultPage, TotalCount};
use opac_core::query::{SearchField, SearchQuery};
use opac_core::record::BibliographicDetail;
use opac_core::types::RecordId;
use tokio::sync::OnceCell;

use crate::config::{CatalogConfig, ConfigError};
use crate::error::{CatalogError, SourceError, TransportError};
use crate::normalize::{detail_from_marc, ApiItem, ApiLibrary};
use crate::source::{opac, OpacPageSource, RestSource, SearchSource, SourcePage};
use crate::transport::{
    BoxFuture, ReqwestTransport, Request, Response, RetryPolicy, Transport, ACCEPT_MARC_IN_JSON,
};

/// Library code to display name.
pub type LibraryMap = BTreeMap<String, String>;

/// Read access to a library catalog.
pub trait CatalogClient: Send + Sync {
    /// Run `query` and return the requested page of summaries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidQuery`] for a query without usable terms
    /// or one the catalog rejects, [`CatalogError::SearchUnavailable`] when no
    /// search path produced a usable answer.
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<SearchResultPage, CatalogError>>;

    /// Fetch the full record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::RecordNotFound`] for an unknown identifier,
    /// [`CatalogError::DetailUnavailable`] or
    /// [`CatalogError::NetworkUnreachable`] otherwise.
    fn get_detail(&self, id: RecordId) -> BoxFuture<'_, Result<BibliographicDetail, CatalogError>>;

    /// Fetch the physical copies of `id`; empty when it has none.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::get_detail`].
    fn get_holdings(&self, id: RecordId) -> BoxFuture<'_, Result<Vec<ItemHolding>, CatalogError>>;

    /// Library codes and display names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DetailUnavailable`] or
    /// [`CatalogError::NetworkUnreachable`].
    fn get_libraries(&self) -> BoxFuture<'_, Result<LibraryMap, CatalogError>>;
}

/// [`CatalogClient`] backed by a Koha-style HTTP catalog.
pub struct HttpCatalogClient {
    config: CatalogConfig,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    primary: Box<dyn SearchSource>,
    fallback: Option<Box<dyn SearchSource>>,
    libraries: OnceCell<LibraryMap>,
}

impl HttpCatalogClient {
    /// Create a client that talks to `config.base_url` over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: CatalogConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout())
            .map_err(|e| ConfigError::Http(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends every request through `transport`.
    ///
    /// The REST endpoint is the primary search source; the OPAC page is the
    /// fallback when `config.opac_fallback` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_transport(
        config: CatalogConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let retry = RetryPolicy {
            backoff: config.retry_backoff(),
        };
        let primary: Box<dyn SearchSource> = Box::new(RestSource::new(
            Arc::clone(&transport),
            retry,
            config.public_api_url(),
        ));
        let fallback: Option<Box<dyn SearchSource>> = config.opac_fallback.then(|| {
            Box::new(OpacPageSource::new(
                Arc::clone(&transport),
                retry,
                config.opac_search_url(),
            )) as Box<dyn SearchSource>
        });
        Ok(Self {
            config,
            transport,
            retry,
            primary,
            fallback,
            libraries: OnceCell::new(),
        })
    }

    /// Replace the search sources.
    #[must_use]
    pub fn with_sources(
        mut self,
        primary: Box<dyn SearchSource>,
        fallback: Option<Box<dyn SearchSource>>,
    ) -> Self {
        self.primary = primary;
        self.fallback = fallback;
        self
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Build a query using the configured page size.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidQuery`] if the term or page is unusable.
    pub fn query(
        &self,
        term: &str,
        field: Option<SearchField>,
        page: u32,
    ) -> Result<SearchQuery, CatalogError> {
        Ok(SearchQuery::new(term, field, page, self.config.page_size)?)
    }

    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        self.retry.send(self.transport.as_ref(), request).await
    }

    fn record_url(&self, id: RecordId) -> String {
        format!("{}/biblios/{id}", self.config.public_api_url())
    }

    async fn run_search(&self, query: &SearchQuery) -> Result<SearchResultPage, CatalogError> {
        let primary_error = match self.primary.search(query).await {
            Ok(page) if !page.hits.is_empty() => {
                return Ok(self.assemble(query, page, self.primary.kind()));
            }
            Ok(_) => {
                debug!("primary search returned no hits for '{query}'");
                None
            }
            Err(e) if e.is_unreachable() => {
                return Err(CatalogError::SearchUnavailable(e.to_string()));
            }
            Err(e) => {
                warn!("primary search failed for '{query}': {e}");
                Some(e)
            }
        };

        let Some(fallback) = &self.fallback else {
            return match primary_error {
                None => Ok(SearchResultPage::empty(
                    query.page(),
                    query.page_size(),
                    self.primary.kind(),
                )),
                Some(e) if rejects_query(&e) => Err(CatalogError::InvalidQuery(format!(
                    "catalog rejected '{}': {e}",
                    query.term()
                ))),
                Some(e) => Err(CatalogError::SearchUnavailable(e.to_string())),
            };
        };

        info!("falling back to {:?} search for '{query}'", fallback.kind());
        match fallback.search(query).await {
            Ok(page) => Ok(self.assemble(query, page, fallback.kind())),
            Err(e) if rejects_query(&e) => Err(CatalogError::InvalidQuery(format!(
                "catalog rejected '{}': {e}",
                query.term()
            ))),
            Err(e) => {
                warn!("fallback search failed for '{query}': {e}");
                Err(CatalogError::SearchUnavailable(match primary_error {
                    Some(first) => format!("{first}; fallback: {e}"),
                    None => e.to_string(),
                }))
            }
        }
    }

    fn assemble(&self, query: &SearchQuery, page: SourcePage, source: ResultSource) -> SearchResultPage {
        let size = query.page_size() as usize;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let SourcePage {
            hits,
            total,
            windowed,
        } = page;

        let (window, total) = if hits.len() > size || !windowed {
            let all = hits.len() as u64;
            let window: Vec<_> = hits.into_iter().skip(offset).take(size).collect();
            let total = if all > u64::from(query.page_size()) {
                TotalCount::Exact(total.unwrap_or(all).max(all))
            } else {
                // Without a count, a list that fits one page may still be a window.
                total.map_or(TotalCount::Estimated(all), TotalCount::Exact)
            };
            (window, total)
        } else {
            let seen = query.offset() + hits.len() as u64;
            let total = total.map_or(TotalCount::Estimated(seen), TotalCount::Exact);
            (hits, total)
        };

        let mode = self.config.call_number_display;
        SearchResultPage {
            records: window.into_iter().map(|h| h.into_summary(mode)).collect(),
            total,
            page: query.page(),
            page_size: query.page_size(),
            source,
        }
    }

    async fn run_get_detail(&self, id: RecordId) -> Result<BibliographicDetail, CatalogError> {
        let request = Request::get(self.record_url(id)).accept(ACCEPT_MARC_IN_JSON);
        let reason = match self.send(&request).await {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<MarcRecord>(&response.body) {
                    Ok(record) if !record.is_empty() => {
                        return Ok(detail_from_marc(id, record, self.config.call_number_display));
                    }
                    Ok(_) => "empty MARC record".to_owned(),
                    Err(e) => format!("malformed MARC record: {e}"),
                }
            }
            Ok(response) if matches!(response.status, 404 | 410) => {
                return Err(CatalogError::RecordNotFound(id));
            }
            Ok(response) => format!("status {}", response.status),
            Err(TransportError::Connect(e)) => return Err(CatalogError::NetworkUnreachable(e)),
            Err(e @ TransportError::Timeout) => return Err(CatalogError::DetailUnavailable(e.to_string())),
            Err(e) => e.to_string(),
        };

        if !self.config.opac_fallback {
            return Err(CatalogError::DetailUnavailable(reason));
        }
        warn!("record {id} unavailable from REST ({reason}); trying OPAC detail page");
        opac::fetch_detail_page(
            self.transport.as_ref(),
            self.retry,
            &self.config.opac_detail_url(),
            id,
            self.config.call_number_display,
        )
        .await
        .map_err(|e| match e {
            SourceError::UnexpectedStatus { status: 404 } => CatalogError::RecordNotFound(id),
            e if e.is_unreachable() => CatalogError::NetworkUnreachable(e.to_string()),
            e => CatalogError::DetailUnavailable(format!("{reason}; OPAC page: {e}")),
        })
    }

    async fn run_get_holdings(&self, id: RecordId) -> Result<Vec<ItemHolding>, CatalogError> {
        let request = Request::get(format!("{}/items", self.record_url(id)));
        let response = self.send(&request).await.map_err(detail_error)?;
        match response.status {
            404 | 410 => return Err(CatalogError::RecordNotFound(id)),
            _ if !response.is_success() => {
                return Err(CatalogError::DetailUnavailable(format!(
                    "items for {id}: status {}",
                    response.status
                )))
            }
            _ => {}
        }

        let items: Vec<ApiItem> = serde_json::from_str(&response.body)
            .map_err(|e| CatalogError::DetailUnavailable(format!("items for {id}: {e}")))?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let fallback = LibraryMap::new();
        let libraries = match self.run_get_libraries().await {
            Ok(map) => map,
            Err(e) => {
                warn!("library names unavailable, showing codes: {e}");
                &fallback
            }
        };
        Ok(items
            .into_iter()
            .map(|item| item.into_holding(libraries))
            .collect())
    }

    async fn run_get_libraries(&self) -> Result<&LibraryMap, CatalogError> {
        self.libraries
            .get_or_try_init(|| async {
                let url = format!("{}/libraries", self.config.public_api_url());
                let response = self.send(&Request::get(url)).await.map_err(detail_error)?;
                if !response.is_success() {
                    return Err(CatalogError::DetailUnavailable(format!(
                        "libraries: status {}",
                        response.status
                    )));
                }
                let libraries: Vec<ApiLibrary> = serde_json::from_str(&response.body)
                    .map_err(|e| CatalogError::DetailUnavailable(format!("libraries: {e}")))?;
                debug!("cached {} libraries", libraries.len());
                Ok(libraries.into_iter().map(ApiLibrary::into_entry).collect())
            })
            .await
    }
}

fn detail_error(e: TransportError) -> CatalogError {
    match e {
        TransportError::Connect(msg) => CatalogError::NetworkUnreachable(msg),
        other => CatalogError::DetailUnavailable(other.to_string()),
    }
}

/// `true` when a source turned the query itself down rather than failing.
///
/// 404 means the endpoint is missing; 408 and 429 are load problems.
fn rejects_query(error: &SourceError) -> bool {
    match error {
        SourceError::Unsupported(_) => true,
        SourceError::UnexpectedStatus { status } => {
            (400..500).contains(status) && !matches!(status, 404 | 408 | 429)
        }
        _ => false,
    }
}

impl CatalogClient for HttpCatalogClient {
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<SearchResultPage, CatalogError>> {
        Box::pin(self.run_search(query))
    }

    fn get_detail(&self, id: RecordId) -> BoxFuture<'_, Result<BibliographicDetail, CatalogError>> {
        Box::pin(self.run_get_detail(id))
    }

    fn get_holdings(&self, id: RecordId) -> BoxFuture<'_, Result<Vec<ItemHolding>, CatalogError>> {
        Box::pin(self.run_get_holdings(id))
    }

    fn get_libraries(&self) -> BoxFuture<'_, Result<LibraryMap, CatalogError>> {
        Box::pin(async move { self.run_get_libraries().await.cloned() })
    }
}
