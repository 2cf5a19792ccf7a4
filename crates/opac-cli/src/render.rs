//! Plain-text rendering of catalog data for the terminal.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use opac_client::config::CatalogConfig;
use opac_client::error::CatalogError;
use opac_core::holding::ItemHolding;
use opac_core::page::{ResultSource, SearchResultPage, TotalCount};
use opac_core::record::BibliographicDetail;

/// Banner with the library name.
#[must_use]
pub fn header(config: &CatalogConfig) -> String {
    let name = config.library_name.to_uppercase();
    let rule = "=".repeat(name.chars().count().max(20));
    format!("{rule}\n{name}\n{rule}\n")
}

fn count_text(total: TotalCount) -> String {
    match total {
        TotalCount::Exact(n) => n.to_string(),
        TotalCount::Estimated(n) => format!("at least {n}"),
    }
}

/// Run a writer against a fresh buffer. Writing to a `String` cannot fail.
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    write(&mut out).map(|()| out).unwrap_or_default()
}

/// A page of search results.
#[must_use]
pub fn results(page: &SearchResultPage, call_number_label: &str) -> String {
    render(|out| write_results(out, page, call_number_label))
}

fn write_results(out: &mut String, page: &SearchResultPage, call_number_label: &str) -> fmt::Result {
    if page.records.is_empty() {
        return writeln!(out, "No matching records.");
    }

    let first = page.first_index();
    let last = first + page.records.len() as u64 - 1;
    writeln!(
        out,
        "Results {first}-{last} of {} (page {} of {})",
        count_text(page.total),
        page.page,
        page.total_pages()
    )?;
    if page.source == ResultSource::OpacPage {
        writeln!(out, "(served by the OPAC search page)")?;
    }
    writeln!(out)?;

    for (n, record) in (first..).zip(&page.records) {
        writeln!(out, "{n:>4}. {}  [#{}]", record.title, record.id)?;
        let mut byline = record.author.clone().unwrap_or_default();
        if let Some(year) = &record.publication_year {
            if !byline.is_empty() {
                byline.push_str(", ");
            }
            byline.push_str(year);
        }
        if let Some(format) = &record.format {
            write!(byline, " ({format})")?;
        }
        if !byline.trim().is_empty() {
            writeln!(out, "      {}", byline.trim())?;
        }
        if let Some(call_number) = record.call_number() {
            writeln!(out, "      {call_number_label}: {call_number}")?;
        }
    }

    let mut nav = Vec::new();
    if page.has_prev() {
        nav.push(format!("--page {} for previous", page.page - 1));
    }
    if page.has_next() {
        nav.push(format!("--page {} for more", page.page + 1));
    }
    if !nav.is_empty() {
        writeln!(out, "\n{}", nav.join(", "))?;
    }
    Ok(())
}

fn line(out: &mut String, label: &str, value: Option<&str>) -> fmt::Result {
    match value.filter(|v| !v.is_empty()) {
        Some(value) => writeln!(out, "{label:<14} {value}"),
        None => Ok(()),
    }
}

/// A full record with its holdings.
#[must_use]
pub fn detail(detail: &BibliographicDetail, holdings: &[ItemHolding], call_number_label: &str) -> String {
    render(|out| {
        let summary = &detail.summary;
        writeln!(out, "{}\n", summary.title)?;
        line(out, "Author", summary.author.as_deref())?;
        line(out, "Published", detail.publisher.as_deref())?;
        line(out, "Year", summary.publication_year.as_deref())?;
        line(out, "Edition", detail.edition.as_deref())?;
        line(out, "Format", summary.format.as_deref())?;
        line(out, "Description", detail.physical_description.as_deref())?;
        line(out, "Series", detail.series.as_deref())?;
        line(out, "ISBN", detail.isbn.as_deref())?;
        line(out, call_number_label, summary.call_number().as_deref())?;
        for subject in &detail.subjects {
            line(out, "Subject", Some(subject))?;
        }
        if let Some(abstract_note) = &detail.abstract_note {
            writeln!(out, "\n{abstract_note}")?;
        }
        for note in &detail.notes {
            writeln!(out, "Note: {note}")?;
        }
        writeln!(out)?;
        write_holdings(out, holdings)
    })
}

/// Copies of a record, one line each.
#[must_use]
pub fn holdings_table(holdings: &[ItemHolding]) -> String {
    render(|out| write_holdings(out, holdings))
}

fn write_holdings(out: &mut String, holdings: &[ItemHolding]) -> fmt::Result {
    if holdings.is_empty() {
        return writeln!(out, "No copies held.");
    }
    let available = holdings.iter().filter(|h| h.status.is_available()).count();
    writeln!(out, "Copies: {} ({available} available)", holdings.len())?;
    for item in holdings {
        let status = match item.due_date {
            Some(due) => format!("{} (due {})", item.status, due.format("%Y-%m-%d")),
            None => item.status.to_string(),
        };
        writeln!(
            out,
            "  {:<22} {:<18} {:<16} {}",
            item.library_name,
            item.location.as_deref().unwrap_or("-"),
            item.call_number.as_deref().unwrap_or("-"),
            status
        )?;
        if let Some(note) = &item.public_note {
            writeln!(out, "  {:<22} {note}", "")?;
        }
    }
    Ok(())
}

/// Library code and name pairs.
#[must_use]
pub fn libraries(libraries: &BTreeMap<String, String>) -> String {
    if libraries.is_empty() {
        return "No libraries listed.\n".to_owned();
    }
    let width = libraries.keys().map(String::len).max().unwrap_or(0);
    render(|out| {
        libraries
            .iter()
            .try_for_each(|(code, name)| writeln!(out, "{code:<width$}  {name}"))
    })
}

/// One-line message for a catalog error.
#[must_use]
pub fn describe_error(err: &CatalogError) -> String {
    match err {
        CatalogError::InvalidQuery(reason) => format!("Please check your search: {reason}."),
        CatalogError::SearchUnavailable(_) => {
            "Search is unavailable right now. Please try again later.".to_owned()
        }
        CatalogError::RecordNotFound(id) => format!("Record #{id} was not found in the catalog."),
        CatalogError::DetailUnavailable(_) => {
            "Record details are unavailable right now. Please try again later.".to_owned()
        }
        CatalogError::NetworkUnreachable(_) => {
            "Cannot reach the catalog. Check your network connection or server URL.".to_owned()
        }
    }
}
