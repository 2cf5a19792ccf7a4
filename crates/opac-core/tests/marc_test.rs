use opac_core::marc::{describe_tag, FieldContent, MarcRecord};

const BLEAK_HOUSE: &str = r#"{
  "leader": "01142cam  2200301 a 4500",
  "fields": [
    {"001": "12345"},
    {"050": {"ind1": "0", "ind2": "0", "subfields": [{"a": "PR4556"}, {"b": ".A1 1853"}]}},
    {"245": {"ind1": "1", "ind2": "0", "subfields": [{"a": "Bleak house /"}, {"c": "by Charles Dickens."}]}},
    {"650": {"ind1": " ", "ind2": "0", "subfields": [{"a": "Lawyers"}, {"z": "England"}]}},
    {"650": {"ind1": " ", "ind2": "0", "subfields": [{"a": "Inheritance and succession"}]}}
  ]
}"#;

#[test]
fn marc_in_json_parses_in_order() {
    let record: MarcRecord = serde_json::from_str(BLEAK_HOUSE).unwrap();
    assert_eq!(record.leader.as_deref(), Some("01142cam  2200301 a 4500"));
    assert_eq!(record.fields.len(), 5);
    assert_eq!(record.fields[0].tag, "001");
    assert_eq!(record.control("001"), Some("12345"));
    assert!(matches!(
        record.fields[2].content,
        FieldContent::Data { ind1: '1', ind2: '0', .. }
    ));
}

#[test]
fn subfield_lookup_spans_repeated_tags() {
    let record: MarcRecord = serde_json::from_str(BLEAK_HOUSE).unwrap();
    assert_eq!(record.subfield("245", 'a'), Some("Bleak house /"));
    assert_eq!(
        record.subfields("650", 'a'),
        vec!["Lawyers", "Inheritance and succession"]
    );
    assert_eq!(record.subfield("082", 'a'), None);
}

#[test]
fn record_roundtrips_through_marc_in_json() {
    let record: MarcRecord = serde_json::from_str(BLEAK_HOUSE).unwrap();
    let json = serde_json::to_string(&record).unwrap();
    let back: MarcRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn dump_lists_tags_with_descriptions() {
    let record: MarcRecord = serde_json::from_str(BLEAK_HOUSE).unwrap();
    let dump = record.to_string();
    assert!(dump.starts_with("LDR   01142cam"));
    assert!(dump.contains("245   Title Statement"));
    assert!(dump.contains("      Indicators: [1][0]"));
    assert!(dump.contains("      $a Bleak house /"));
    assert_eq!(describe_tag("999"), Some("System Control Numbers (Koha)"));
    assert_eq!(describe_tag("123"), None);
}

#[test]
fn empty_object_is_empty_record() {
    let record: MarcRecord = serde_json::from_str("{}").unwrap();
    assert!(record.is_empty());
}
