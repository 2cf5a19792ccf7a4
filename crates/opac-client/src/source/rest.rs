//! Search through the structured `public/biblios` endpoint.

use std::sync::Arc;

use log::debug;
use opac_core::page::ResultSource;
use opac_core::query::{SearchField, SearchQuery};
use serde_json::{json, Value};

use super::{SearchSource, SourcePage};
use crate::error::SourceError;
use crate::normalize::ApiBiblio;
use crate::transport::{BoxFuture, Request, RetryPolicy, Transport};

/// REST search source.
pub struct RestSource {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    api_url: String,
}

impl RestSource {
    /// Search `{api_url}/biblios` through `transport`.
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            retry,
            api_url: api_url.into(),
        }
    }
}

/// Build the `q` filter for `query`.
///
/// # Errors
///
/// Returns [`SourceError::Unsupported`] for fields the endpoint cannot filter on.
pub fn build_filter(query: &SearchQuery) -> Result<Value, SourceError> {
    let like = json!({ "-like": format!("%{}%", query.term()) });
    let filter = match query.field() {
        SearchField::Keyword => json!([{ "title": like }, { "author": like }]),
        SearchField::Title => json!({ "title": like }),
        SearchField::Author => json!({ "author": like }),
        SearchField::Isbn => json!({ "isbn": like }),
        SearchField::Series => json!({ "series_title": like }),
        other @ (SearchField::Subject | SearchField::CallNumber) => {
            return Err(SourceError::Unsupported(format!("{other} search")))
        }
    };
    Ok(filter)
}

impl SearchSource for RestSource {
    fn kind(&self) -> ResultSource {
        ResultSource::Api
    }

    fn search<'a>(&'a self, query: &'a SearchQuery) -> BoxFuture<'a, Result<SourcePage, SourceError>> {
        Box::pin(async move {
            let filter = build_filter(query)?;
            let request = Request::get(format!("{}/biblios", self.api_url))
                .param("q", filter)
                .param("_page", query.page())
                .param("_per_page", query.page_size());

            let response = self.retry.send(self.transport.as_ref(), &request).await?;
            if !response.is_success() {
                return Err(SourceError::UnexpectedStatus {
                    status: response.status,
                });
            }

            let biblios: Vec<ApiBiblio> = serde_json::from_str(&response.body)
                .map_err(|e| SourceError::Parse(e.to_string()))?;
            let hits = biblios
                .into_iter()
                .map(ApiBiblio::into_hit)
                .collect::<Result<Vec<_>, _>>()
                .map_err(SourceError::Parse)?;

            debug!(
                "REST search '{query}' returned {} hits (total {:?})",
                hits.len(),
                response.total_count
            );
            // Koha sets X-Total-Count only when its paging layer ran.
            Ok(SourcePage {
                hits,
                total: response.total_count,
                windowed: response.total_count.is_some(),
            })
        })
    }
}
