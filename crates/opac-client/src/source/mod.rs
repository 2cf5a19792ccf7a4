//! Interchangeable search paths.

pub mod opac;
pub mod rest;

use opac_core::page::ResultSource;
use opac_core::query::SearchQuery;

use crate::error::SourceError;
use crate::normalize::SourceHit;
use crate::transport::BoxFuture;

pub use opac::OpacPageSource;
pub use rest::RestSource;

/// Hits returned by one source for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePage {
    /// Hits in source ranking order.
    pub hits: Vec<SourceHit>,
    /// Total hit count, when the source reported one.
    pub total: Option<u64>,
    /// `true` when `hits` is already the requested window. Otherwise the
    /// hits are the whole result list and the client slices it.
    pub windowed: bool,
}

/// One way of answering a search query.
pub trait SearchSource: Send + Sync {
    /// Tag attached to pages this source serves.
    fn kind(&self) -> ResultSource;

    /// Run `query` and return the requested page of hits.
    ///
    /// A source may ignore the paging window and return every hit; it then
    /// leaves [`SourcePage::windowed`] unset and the client slices locally.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source cannot produce a trustworthy
    /// answer.
    fn search<'a>(&'a self, query: &'a SearchQuery) -> BoxFuture<'a, Result<SourcePage, SourceError>>;
}
