//! Search and detail scraping of the human-facing OPAC pages.

use std::sync::Arc;

use log::{debug, info};
use once_cell::sync::Lazy;
use opac_core::call_number::{CallNumberDisplay, CallNumbers};
use opac_core::page::ResultSource;
use opac_core::query::SearchQuery;
use opac_core::record::{BibliographicDetail, RawRecord};
use opac_core::types::RecordId;
use regex::Regex;

use super::{SearchSource, SourcePage};
use crate::error::SourceError;
use crate::normalize::{clean_name, clean_title, extract_year, html_text, SourceHit};
use crate::transport::{BoxFuture, Request, RetryPolicy, Transport, ACCEPT_HTML};

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static TOTAL: Lazy<Regex> = Lazy::new(|| re(r"(?i)returned\s+(\d+)\s+results?"));
static NO_RESULTS: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)no\s+results\s+(?:found|match)|returned\s+0\s+results?"));
static RESULT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    re(r#"(?is)<div\s+id="title_summary_(\d+)"[^>]*class="title_summary"[^>]*>(.*?)</div>\s*</td>"#)
});
static BLOCK_TITLE: Lazy<Regex> = Lazy::new(|| re(r#"(?i)<a[^>]*class="title"[^>]*>([^<]+)"#));
static BLOCK_AUTHOR: Lazy<Regex> =
    Lazy::new(|| re(r#"(?i)<span\s+class="title_resp_stmt"[^>]*>([^<]+)"#));
static BLOCK_YEAR: Lazy<Regex> = Lazy::new(|| re(r#"(?i)class="publisher_date"[^>]*>[^<\d]*(\d{4})"#));
static BLOCK_CALL_NUMBER: Lazy<Regex> =
    Lazy::new(|| re(r#"(?i)class="CallNumber"[^>]*>([^<]+)"#));
static CHECKBOX: Lazy<Regex> = Lazy::new(|| {
    re(r#"(?i)<input[^>]*name="biblionumber"[^>]*value="(\d+)"[^>]*aria-label="Select search result:\s*([^"]*)""#)
});

static DETAIL_TITLE: Lazy<Regex> = Lazy::new(|| re(r#"(?is)<h[12][^>]*class="title"[^>]*>(.*?)</h[12]>"#));
static PAGE_TITLE: Lazy<Regex> = Lazy::new(|| re(r"(?is)<title>([^<]+)</title>"));
static PAGE_TITLE_SUFFIX: Lazy<Regex> = Lazy::new(|| re(r"\s*[|›»].*$"));
static DETAIL_AUTHOR: Lazy<Regex> =
    Lazy::new(|| re(r#"(?is)<(?:span|a)[^>]*class="[^"]*\bauthor\b[^"]*"[^>]*>(.*?)</(?:span|a)>"#));
static DETAIL_PUBLISHER: Lazy<Regex> =
    Lazy::new(|| re(r#"(?is)class="[^"]*publisher_name[^"]*"[^>]*>(.*?)</span>"#));
static DETAIL_PLACE: Lazy<Regex> =
    Lazy::new(|| re(r#"(?is)class="[^"]*publisher_place[^"]*"[^>]*>(.*?)</span>"#));
static DETAIL_DATE: Lazy<Regex> =
    Lazy::new(|| re(r#"(?is)class="[^"]*publisher_date[^"]*"[^>]*>(.*?)</span>"#));
static DETAIL_ISBN: Lazy<Regex> = Lazy::new(|| re(r"(?i)ISBN[:\s]*(?:</span>\s*)?([\dXx-]{10,17})"));
static DETAIL_CALL_NUMBER: Lazy<Regex> =
    Lazy::new(|| re(r#"(?is)<td[^>]*class="[^"]*call_no[^"]*"[^>]*>(.*?)</td>"#));
static DETAIL_NOT_FOUND: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)record\s+(?:does\s+not\s+exist|not\s+found)"));

/// Search source backed by `opac-search.pl`.
pub struct OpacPageSource {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    search_url: String,
}

impl OpacPageSource {
    /// Search `search_url` through `transport`.
    pub fn new(
        transport: Arc<dyn Transport>,
        retry: RetryPolicy,
        search_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            retry,
            search_url: search_url.into(),
        }
    }
}

impl SearchSource for OpacPageSource {
    fn kind(&self) -> ResultSource {
        ResultSource::OpacPage
    }

    fn search<'a>(&'a self, query: &'a SearchQuery) -> BoxFuture<'a, Result<SourcePage, SourceError>> {
        Box::pin(async move {
            let request = Request::get(self.search_url.as_str())
                .accept(ACCEPT_HTML)
                .param("idx", query.field().opac_index())
                .param("q", query.term())
                .param("offset", query.offset())
                .param("count", query.page_size());

            let response = self.retry.send(self.transport.as_ref(), &request).await?;
            if !response.is_success() {
                return Err(SourceError::UnexpectedStatus {
                    status: response.status,
                });
            }
            let page = parse_results_page(&response.body)?;
            info!(
                "OPAC search '{query}' found {} records (total {:?})",
                page.hits.len(),
                page.total
            );
            Ok(page)
        })
    }
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| html_text(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn record_id(digits: &str) -> Result<RecordId, SourceError> {
    digits
        .parse::<RecordId>()
        .map_err(|e| SourceError::Parse(format!("biblionumber '{digits}': {e}")))
}

/// Parse an OPAC results page.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the page is not a recognizable results
/// page, or when it claims hits that no row could be read for.
pub fn parse_results_page(html: &str) -> Result<SourcePage, SourceError> {
    let total = TOTAL
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok());

    let mut hits = Vec::new();
    for caps in RESULT_BLOCK.captures_iter(html) {
        let block = &caps[2];
        hits.push(SourceHit {
            id: record_id(&caps[1])?,
            title: capture(&BLOCK_TITLE, block)
                .map(|t| clean_title(&t))
                .unwrap_or_default(),
            author: capture(&BLOCK_AUTHOR, block)
                .map(|a| clean_name(&a))
                .filter(|a| !a.is_empty()),
            publication_year: BLOCK_YEAR
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_owned()),
            format: None,
            call_numbers: CallNumbers::new(None, None, capture(&BLOCK_CALL_NUMBER, block)),
        });
    }

    if hits.is_empty() {
        for caps in CHECKBOX.captures_iter(html) {
            hits.push(SourceHit {
                id: record_id(&caps[1])?,
                title: clean_title(&html_text(&caps[2])),
                author: None,
                publication_year: None,
                format: None,
                call_numbers: CallNumbers::default(),
            });
        }
    }

    debug!("parsed {} rows from OPAC page, total {total:?}", hits.len());

    if hits.is_empty() {
        return match total {
            Some(n) if n > 0 => Err(SourceError::Parse(format!(
                "page reports {n} results but no rows could be read"
            ))),
            Some(_) => Ok(SourcePage {
                hits,
                total: Some(0),
                windowed: true,
            }),
            None if NO_RESULTS.is_match(html) => Ok(SourcePage {
                windowed: true,
                ..SourcePage::default()
            }),
            None => Err(SourceError::Parse("not a search results page".to_owned())),
        };
    }

    Ok(SourcePage {
        hits,
        total,
        windowed: true,
    })
}

/// Parse an OPAC detail page into a detail record without MARC data.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when no title can be found.
pub fn parse_detail_page(
    html: &str,
    id: RecordId,
    url: &str,
    mode: CallNumberDisplay,
) -> Result<BibliographicDetail, SourceError> {
    let title = capture(&DETAIL_TITLE, html)
        .or_else(|| {
            capture(&PAGE_TITLE, html)
                .map(|t| PAGE_TITLE_SUFFIX.replace(&t, "").into_owned())
                .filter(|t| !t.is_empty())
        })
        .map(|t| clean_title(&t))
        .ok_or_else(|| SourceError::Parse("detail page has no title".to_owned()))?;

    let publisher = match (capture(&DETAIL_PLACE, html), capture(&DETAIL_PUBLISHER, html)) {
        (Some(place), Some(name)) => Some(format!(
            "{}: {}",
            place.trim_end_matches([' ', ':']),
            clean_name(&name)
        )),
        (place, name) => name.or(place).map(|p| clean_name(&p)),
    };

    let all_call_numbers = CallNumbers::new(None, None, capture(&DETAIL_CALL_NUMBER, html));
    let hit = SourceHit {
        id,
        title,
        author: capture(&DETAIL_AUTHOR, html)
            .map(|a| clean_name(&a))
            .filter(|a| !a.is_empty()),
        publication_year: capture(&DETAIL_DATE, html).as_deref().and_then(extract_year),
        format: None,
        call_numbers: all_call_numbers.clone(),
    };

    Ok(BibliographicDetail {
        summary: hit.into_summary(mode),
        all_call_numbers,
        publisher,
        isbn: capture(&DETAIL_ISBN, html),
        edition: None,
        physical_description: None,
        series: None,
        abstract_note: None,
        notes: Vec::new(),
        subjects: Vec::new(),
        raw: RawRecord::OpacPage {
            url: url.to_owned(),
        },
    })
}

/// Fetch and parse the OPAC detail page for `id`.
///
/// # Errors
///
/// Returns [`SourceError::UnexpectedStatus`] for a non-success status (or a
/// page that says the record does not exist, reported as 404),
/// [`SourceError::Transport`] when the request fails, and
/// [`SourceError::Parse`] when the page cannot be read.
pub async fn fetch_detail_page(
    transport: &dyn Transport,
    retry: RetryPolicy,
    detail_url: &str,
    id: RecordId,
    mode: CallNumberDisplay,
) -> Result<BibliographicDetail, SourceError> {
    let request = Request::get(detail_url)
        .accept(ACCEPT_HTML)
        .param("biblionumber", id);
    let response = retry.send(transport, &request).await?;
    if !response.is_success() {
        return Err(SourceError::UnexpectedStatus {
            status: response.status,
        });
    }
    if DETAIL_NOT_FOUND.is_match(&response.body) && !DETAIL_TITLE.is_match(&response.body) {
        return Err(SourceError::UnexpectedStatus { status: 404 });
    }
    let url = format!("{detail_url}?biblionumber={id}");
    parse_detail_page(&response.body, id, &url, mode)
}
