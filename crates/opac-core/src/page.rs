//! One page of search results.

use serde::{Deserialize, Serialize};

use crate::record::BibliographicSummary;

/// Hit count reported alongside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum TotalCount {
    /// The source stated the total.
    Exact(u64),
    /// Inferred from the rows seen; the real total may be higher.
    Estimated(u64),
}

impl TotalCount {
    /// The count, exact or not.
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Self::Exact(n) | Self::Estimated(n) => n,
        }
    }

    /// `true` when the count was inferred.
    #[must_use]
    pub fn is_estimate(self) -> bool {
        matches!(self, Self::Estimated(_))
    }
}

/// Which path served a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Structured REST search endpoint.
    Api,
    /// Human-facing OPAC search page.
    OpacPage,
    /// Built-in sample collection.
    Demo,
}

/// A ranked page of summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultPage {
    /// Summaries in source ranking order.
    pub records: Vec<BibliographicSummary>,
    /// Total hits across all pages.
    pub total: TotalCount,
    /// 1-indexed page number.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Path that served the page.
    pub source: ResultSource,
}

impl SearchResultPage {
    /// An empty first page.
    #[must_use]
    pub fn empty(page: u32, page_size: u32, source: ResultSource) -> Self {
        Self {
            records: Vec::new(),
            total: TotalCount::Exact(0),
            page,
            page_size,
            source,
        }
    }

    /// Number of pages needed for `total` hits; at least 1.
    ///
    /// A full page under an estimated total counts one more page after it.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.page_size.max(1));
        let pages = self.total.value().div_ceil(size).max(1);
        if self.may_continue() {
            pages.max(u64::from(self.page) + 1)
        } else {
            pages
        }
    }

    fn may_continue(&self) -> bool {
        self.total.is_estimate()
            && !self.records.is_empty()
            && self.records.len() as u64 >= u64::from(self.page_size)
    }

    /// `true` if a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    /// `true` if an earlier page exists.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// 1-indexed position of the first row on this page.
    #[must_use]
    pub fn first_index(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size) + 1
    }
}
