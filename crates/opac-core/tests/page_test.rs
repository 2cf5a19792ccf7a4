use opac_core::page::{ResultSource, SearchResultPage, TotalCount};
use opac_core::record::BibliographicSummary;
use opac_core::types::RecordId;

fn page(total: TotalCount, page: u32) -> SearchResultPage {
    SearchResultPage {
        total,
        page,
        ..SearchResultPage::empty(page, 10, ResultSource::Api)
    }
}

#[test]
fn twelve_hits_span_two_pages() {
    let first = page(TotalCount::Exact(12), 1);
    assert_eq!(first.total_pages(), 2);
    assert!(first.has_next());
    assert!(!first.has_prev());

    let second = page(TotalCount::Exact(12), 2);
    assert!(!second.has_next());
    assert!(second.has_prev());
    assert_eq!(second.first_index(), 11);
}

fn rows(n: u64) -> Vec<BibliographicSummary> {
    (1..=n)
        .map(|id| BibliographicSummary {
            id: RecordId::new(id).unwrap(),
            title: format!("Title {id}"),
            author: None,
            publication_year: None,
            format: None,
            call_numbers: Vec::new(),
        })
        .collect()
}

#[test]
fn full_page_with_estimated_total_offers_next() {
    let first = SearchResultPage {
        records: rows(10),
        ..page(TotalCount::Estimated(10), 1)
    };
    assert!(first.has_next());
    assert_eq!(first.total_pages(), 2);
}

#[test]
fn short_page_with_estimated_total_is_last() {
    let last = SearchResultPage {
        records: rows(4),
        ..page(TotalCount::Estimated(14), 2)
    };
    assert!(!last.has_next());
    assert_eq!(last.total_pages(), 2);
}

#[test]
fn full_page_with_exact_total_is_last() {
    let only = SearchResultPage {
        records: rows(10),
        ..page(TotalCount::Exact(10), 1)
    };
    assert!(!only.has_next());
}

#[test]
fn empty_result_is_one_page() {
    let empty = SearchResultPage::empty(1, 10, ResultSource::OpacPage);
    assert_eq!(empty.total_pages(), 1);
    assert!(!empty.has_next());
}

#[test]
fn total_count_serialises_with_kind() {
    let json = serde_json::to_string(&TotalCount::Estimated(3)).unwrap();
    assert_eq!(json, r#"{"kind":"estimated","count":3}"#);
    assert!(TotalCount::Estimated(3).is_estimate());
    assert_eq!(TotalCount::Exact(9).value(), 9);
}
