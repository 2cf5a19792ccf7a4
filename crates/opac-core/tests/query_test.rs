use opac_core::query::{SearchField, SearchQuery};
use opac_core::types::{RecordId, ValidationError};

#[test]
fn query_normalises_whitespace() {
    let q = SearchQuery::new("  great   expectations ", Some(SearchField::Title), 1, 10).unwrap();
    assert_eq!(q.term(), "great expectations");
    assert_eq!(q.field(), SearchField::Title);
}

#[test]
fn query_defaults_to_keyword() {
    let q = SearchQuery::new("dickens", None, 1, 10).unwrap();
    assert_eq!(q.field(), SearchField::Keyword);
}

#[test]
fn query_without_terms_is_rejected() {
    for term in ["", "   ", "?!", " - / "] {
        assert_eq!(
            SearchQuery::new(term, None, 1, 10).unwrap_err(),
            ValidationError::NoUsableTerms,
            "term {term:?}"
        );
    }
}

#[test]
fn query_rejects_page_zero_and_bad_sizes() {
    assert_eq!(
        SearchQuery::new("dickens", None, 0, 10).unwrap_err(),
        ValidationError::PageOutOfRange
    );
    assert!(matches!(
        SearchQuery::new("dickens", None, 1, 0),
        Err(ValidationError::PageSizeOutOfRange { got: 0, .. })
    ));
    assert!(matches!(
        SearchQuery::new("dickens", None, 1, 101),
        Err(ValidationError::PageSizeOutOfRange { got: 101, .. })
    ));
}

#[test]
fn query_rejects_overlong_term() {
    let term = "a".repeat(501);
    assert!(matches!(
        SearchQuery::new(&term, None, 1, 10),
        Err(ValidationError::TermTooLong { max: 500, got: 501 })
    ));
}

#[test]
fn query_offset_follows_page() {
    let q = SearchQuery::new("dickens", Some(SearchField::Author), 3, 10).unwrap();
    assert_eq!(q.offset(), 20);
    let first = q.with_page(1).unwrap();
    assert_eq!(first.offset(), 0);
    assert_eq!(first.term(), "dickens");
    assert!(q.with_page(0).is_err());
}

#[test]
fn search_field_parses_names_and_index_codes() {
    assert_eq!("author".parse::<SearchField>().unwrap(), SearchField::Author);
    assert_eq!("AU".parse::<SearchField>().unwrap(), SearchField::Author);
    assert_eq!("call-number".parse::<SearchField>().unwrap(), SearchField::CallNumber);
    assert_eq!(SearchField::Isbn.opac_index(), "nb");
    assert!(matches!(
        "publisher".parse::<SearchField>(),
        Err(ValidationError::UnknownField(_))
    ));
}

#[test]
fn record_id_rejects_zero_and_garbage() {
    assert_eq!(RecordId::new(0).unwrap_err(), ValidationError::InvalidRecordId);
    assert_eq!("42".parse::<RecordId>().unwrap().get(), 42);
    assert!("forty-two".parse::<RecordId>().is_err());
}

#[test]
fn record_id_deserialises_with_validation() {
    let id: RecordId = serde_json::from_str("7").unwrap();
    assert_eq!(id.get(), 7);
    assert!(serde_json::from_str::<RecordId>("0").is_err());
}

#[test]
fn query_deserialises_with_validation() {
    let q: SearchQuery =
        serde_json::from_str(r#"{"term":"  great  expectations ","field":"title","page":2,"page_size":10}"#)
            .unwrap();
    assert_eq!(q.term(), "great expectations");
    assert_eq!(q.offset(), 10);

    for bad in [
        r#"{"term":"dickens","field":"keyword","page":0,"page_size":10}"#,
        r#"{"term":"dickens","field":"keyword","page":1,"page_size":0}"#,
        r#"{"term":"dickens","field":"keyword","page":1,"page_size":500}"#,
        r#"{"term":"  ?! ","field":"keyword","page":1,"page_size":10}"#,
    ] {
        assert!(serde_json::from_str::<SearchQuery>(bad).is_err(), "{bad}");
    }
}

#[test]
fn query_serialises_and_reads_back() {
    let q = SearchQuery::new("orwell", Some(SearchField::Author), 3, 20).unwrap();
    let json = serde_json::to_string(&q).unwrap();
    assert_eq!(serde_json::from_str::<SearchQuery>(&json).unwrap(), q);
}
