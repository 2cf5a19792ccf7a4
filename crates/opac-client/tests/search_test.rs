mod common;

use common::{biblio, client, client_with, results_page, test_config, Reply, ScriptedTransport};
use opac_client::client::CatalogClient;
use opac_client::error::CatalogError;
use opac_core::call_number::CallNumberDisplay;
use opac_core::page::{ResultSource, TotalCount};
use opac_core::query::{SearchField, SearchQuery};
use serde_json::json;

const SEARCH: &str = "/biblios";
const OPAC_SEARCH: &str = "opac-search.pl";

fn dickens_rows() -> Vec<serde_json::Value> {
    (1..=12)
        .map(|id| biblio(id, &format!("Novel {id} /"), "Dickens, Charles, 1812-1870."))
        .collect()
}

#[tokio::test]
async fn query_without_terms_makes_no_request() {
    let transport = ScriptedTransport::new();
    let catalog = client(&transport);

    let err = catalog.query("  ?! ", None, 1).unwrap_err();

    assert!(matches!(err, CatalogError::InvalidQuery(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn primary_hits_never_touch_fallback() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(dickens_rows())]);
    transport.route(OPAC_SEARCH, vec![Reply::html(&results_page(1, &[(99, "Other", "Someone")]))]);
    let catalog = client(&transport);

    let query = catalog.query("dickens", Some(SearchField::Author), 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(page.source, ResultSource::Api);
    assert_eq!(transport.calls_to(OPAC_SEARCH), 0);
    assert_eq!(transport.calls_to(SEARCH), 1);
}

#[tokio::test]
async fn dickens_twelve_hits_paginate_ten_then_two() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(dickens_rows())]);
    let catalog = client(&transport);

    let first = SearchQuery::new("dickens", Some(SearchField::Author), 1, 10).unwrap();
    let page1 = catalog.search(&first).await.unwrap();
    assert_eq!(page1.records.len(), 10);
    assert_eq!(page1.page, 1);
    assert_eq!(page1.total, TotalCount::Exact(12));
    assert!(page1.has_next());

    let page2 = catalog.search(&first.with_page(2).unwrap()).await.unwrap();
    assert_eq!(page2.records.len(), 2);
    assert_eq!(page2.page, 2);
    assert_eq!(page2.records[0].title, "Novel 11");
    assert_eq!(page2.records[0].author.as_deref(), Some("Dickens, Charles, 1812-1870"));
    assert!(!page2.has_next());
}

#[tokio::test]
async fn source_ignoring_paging_is_sliced_locally() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Unpaged(dickens_rows())]);
    let catalog = client(&transport);

    let query = SearchQuery::new("dickens", Some(SearchField::Author), 2, 10).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[1].title, "Novel 12");
    assert_eq!(page.total, TotalCount::Exact(12));
}

#[tokio::test]
async fn uncounted_full_page_offers_next_page() {
    let transport = ScriptedTransport::new();
    let rows: Vec<_> = dickens_rows().into_iter().take(10).collect();
    transport.route(SEARCH, vec![Reply::Unpaged(rows)]);
    let catalog = client(&transport);

    let query = SearchQuery::new("dickens", None, 1, 10).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(page.records.len(), 10);
    assert_eq!(page.total, TotalCount::Estimated(10));
    assert!(page.has_next());
}

#[tokio::test]
async fn uncounted_short_list_is_not_repeated_on_later_pages() {
    let transport = ScriptedTransport::new();
    let rows: Vec<_> = dickens_rows().into_iter().take(8).collect();
    transport.route(SEARCH, vec![Reply::Unpaged(rows)]);
    let config = opac_client::config::CatalogConfig {
        opac_fallback: false,
        ..test_config()
    };
    let catalog = client_with(config, &transport);

    let first = catalog
        .search(&SearchQuery::new("dickens", None, 1, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(first.records.len(), 8);
    assert!(!first.has_next());

    let second = catalog
        .search(&SearchQuery::new("dickens", None, 2, 10).unwrap())
        .await
        .unwrap();
    assert!(second.records.is_empty());
}

#[tokio::test]
async fn stored_query_without_terms_never_reaches_the_catalog() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(dickens_rows())]);
    let catalog = client(&transport);

    for stored in [
        r#"{"term":"   ","field":"keyword","page":1,"page_size":10}"#,
        r#"{"term":"dickens","field":"keyword","page":0,"page_size":10}"#,
    ] {
        assert!(serde_json::from_str::<SearchQuery>(stored).is_err(), "{stored}");
    }
    assert!(transport.calls().is_empty());

    let stored: SearchQuery =
        serde_json::from_str(r#"{"term":"dickens","field":"keyword","page":2,"page_size":10}"#).unwrap();
    let page = catalog.search(&stored).await.unwrap();
    assert_eq!(page.records.len(), 2);
}

#[tokio::test]
async fn empty_primary_falls_back_exactly_once() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(Vec::new())]);
    transport.route(
        OPAC_SEARCH,
        vec![Reply::html(&results_page(
            2,
            &[(31, "Bleak house", "Charles Dickens"), (32, "Hard times", "Charles Dickens")],
        ))],
    );
    let catalog = client(&transport);

    let query = catalog.query("bleak", Some(SearchField::Title), 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(transport.calls_to(OPAC_SEARCH), 1);
    assert_eq!(page.source, ResultSource::OpacPage);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].title, "Bleak house");
    assert_eq!(page.records[0].author.as_deref(), Some("Charles Dickens"));
    assert_eq!(page.records[0].publication_year.as_deref(), Some("1853"));
}

#[tokio::test]
async fn malformed_primary_falls_back_exactly_once() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Body(200, "<html>not json</html>".to_owned())]);
    transport.route(OPAC_SEARCH, vec![Reply::html(&results_page(1, &[(5, "Hard times", "Dickens")]))]);
    let catalog = client(&transport);

    let query = catalog.query("hard times", None, 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(transport.calls_to(OPAC_SEARCH), 1);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.total, TotalCount::Exact(1));
}

#[tokio::test]
async fn fallback_receives_opac_index_and_offset() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(Vec::new())]);
    transport.route(OPAC_SEARCH, vec![Reply::html("<p>No results found!</p>")]);
    let catalog = client(&transport);

    let query = catalog.query("whales", Some(SearchField::Subject), 3).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert!(page.records.is_empty());
    let opac = transport
        .calls()
        .into_iter()
        .find(|r| r.url.ends_with(OPAC_SEARCH))
        .unwrap();
    assert_eq!(opac.query_value("idx"), Some("su"));
    assert_eq!(opac.query_value("offset"), Some("20"));
    assert_eq!(opac.query_value("count"), Some("10"));
}

#[tokio::test]
async fn unsupported_field_skips_straight_to_fallback() {
    let transport = ScriptedTransport::new();
    transport.route(OPAC_SEARCH, vec![Reply::html(&results_page(1, &[(8, "Moby Dick", "Melville")]))]);
    let catalog = client(&transport);

    let query = catalog.query("PS2384", Some(SearchField::CallNumber), 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(transport.calls_to(SEARCH), 0);
    assert_eq!(page.records.len(), 1);
}

#[tokio::test]
async fn malformed_fallback_is_search_unavailable() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Body(400, "{}".to_owned())]);
    transport.route(OPAC_SEARCH, vec![Reply::html("<html><body>Site maintenance</body></html>")]);
    let catalog = client(&transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let err = catalog.search(&query).await.unwrap_err();

    assert!(matches!(err, CatalogError::SearchUnavailable(_)));
}

#[tokio::test]
async fn unreachable_host_is_search_unavailable_without_fallback() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Refused]);
    let catalog = client(&transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let err = catalog.search(&query).await.unwrap_err();

    assert!(matches!(err, CatalogError::SearchUnavailable(_)));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn server_error_is_retried_once_then_falls_back() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Body(503, String::new())]);
    transport.route(OPAC_SEARCH, vec![Reply::html(&results_page(1, &[(5, "Hard times", "Dickens")]))]);
    let catalog = client(&transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(transport.calls_to(SEARCH), 2);
    assert_eq!(page.source, ResultSource::OpacPage);
}

#[tokio::test]
async fn timeout_then_success_is_served_by_primary() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Timeout, Reply::Paged(dickens_rows())]);
    let catalog = client(&transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(transport.calls_to(SEARCH), 2);
    assert_eq!(page.source, ResultSource::Api);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Body(400, "{}".to_owned())]);
    let config = opac_client::config::CatalogConfig {
        opac_fallback: false,
        ..test_config()
    };
    let catalog = client_with(config, &transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let err = catalog.search(&query).await.unwrap_err();

    assert_eq!(transport.calls_to(SEARCH), 1);
    assert!(matches!(err, CatalogError::InvalidQuery(_)));
}

#[tokio::test]
async fn unsupported_field_without_fallback_is_invalid() {
    let transport = ScriptedTransport::new();
    let config = opac_client::config::CatalogConfig {
        opac_fallback: false,
        ..test_config()
    };
    let catalog = client_with(config, &transport);

    let query = catalog.query("whaling", Some(SearchField::Subject), 1).unwrap();
    let err = catalog.search(&query).await.unwrap_err();

    assert!(matches!(err, CatalogError::InvalidQuery(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn missing_endpoint_without_fallback_is_unavailable() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Body(404, "{}".to_owned())]);
    let config = opac_client::config::CatalogConfig {
        opac_fallback: false,
        ..test_config()
    };
    let catalog = client_with(config, &transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let err = catalog.search(&query).await.unwrap_err();

    assert!(matches!(err, CatalogError::SearchUnavailable(_)));
}

#[tokio::test]
async fn empty_primary_without_fallback_is_an_empty_page() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(Vec::new())]);
    let config = opac_client::config::CatalogConfig {
        opac_fallback: false,
        ..test_config()
    };
    let catalog = client_with(config, &transport);

    let query = catalog.query("zzyzx", None, 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert!(page.records.is_empty());
    assert_eq!(page.total.value(), 0);
}

#[tokio::test]
async fn dewey_mode_hides_lc_only_numbers() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(dickens_rows())]);
    let config = opac_client::config::CatalogConfig {
        call_number_display: CallNumberDisplay::Dewey,
        ..test_config()
    };
    let catalog = client_with(config, &transport);

    let query = catalog.query("dickens", None, 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert!(page.records.iter().all(|r| r.call_number().is_none()));
}

#[tokio::test]
async fn missing_title_becomes_placeholder() {
    let transport = ScriptedTransport::new();
    transport.route(SEARCH, vec![Reply::Paged(vec![json!({ "biblio_id": 42 })])]);
    let catalog = client(&transport);

    let query = catalog.query("anything", None, 1).unwrap();
    let page = catalog.search(&query).await.unwrap();

    assert_eq!(page.records[0].title, "Record #42");
    assert_eq!(page.records[0].call_number(), None);
}
