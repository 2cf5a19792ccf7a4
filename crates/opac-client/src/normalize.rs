//! Normalization of heterogeneous source records into the display model.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use opac_core::call_number::{CallNumberDisplay, CallNumbers};
use opac_core::holding::{HoldingStatus, ItemHolding};
use opac_core::marc::{tags, FieldContent, MarcRecord};
use opac_core::record::{BibliographicDetail, BibliographicSummary, RawRecord};
use opac_core::types::RecordId;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("valid regex"));
static TRAILING_TITLE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s:/;,=]+$").expect("valid regex"));
static TRAILING_NAME_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s.,;:/]+$").expect("valid regex"));
static LEADING_BY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^by\s+").expect("valid regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A search hit before the display mode is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHit {
    /// Catalog identifier.
    pub id: RecordId,
    /// Cleaned title, possibly empty.
    pub title: String,
    /// Cleaned author.
    pub author: Option<String>,
    /// Four-digit year.
    pub publication_year: Option<String>,
    /// Material format.
    pub format: Option<String>,
    /// Every call number the hit carries.
    pub call_numbers: CallNumbers,
}

impl SourceHit {
    /// Apply `mode` and fill in a placeholder title.
    #[must_use]
    pub fn into_summary(self, mode: CallNumberDisplay) -> BibliographicSummary {
        BibliographicSummary {
            title: title_or_placeholder(self.title, self.id),
            call_numbers: self.call_numbers.select(mode),
            id: self.id,
            author: self.author,
            publication_year: self.publication_year,
            format: self.format,
        }
    }
}

fn title_or_placeholder(title: String, id: RecordId) -> String {
    if title.is_empty() {
        format!("Record #{id}")
    } else {
        title
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Trim and drop trailing ISBD punctuation (` /`, ` :`).
#[must_use]
pub fn clean_title(raw: &str) -> String {
    TRAILING_TITLE_PUNCT.replace(raw.trim(), "").into_owned()
}

/// Trim, drop a leading "by " and trailing periods or commas.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    let no_prefix = LEADING_BY.replace(raw.trim(), "");
    TRAILING_NAME_PUNCT.replace(&no_prefix, "").into_owned()
}

/// First four-digit run, e.g. `1853` from `c1853.`.
#[must_use]
pub fn extract_year(raw: &str) -> Option<String> {
    YEAR.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Decode the HTML entities that appear in OPAC markup.
#[must_use]
pub fn decode_entities(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Strip tags and decode entities, collapsing whitespace.
#[must_use]
pub fn html_text(fragment: &str) -> String {
    let text = decode_entities(&TAG.replace_all(fragment, " "));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_parts(parts: &[Option<&str>]) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(joined)
}

/// A record as returned by `GET /public/biblios`.
#[derive(Debug, Deserialize)]
pub struct ApiBiblio {
    biblio_id: u64,
    title: Option<String>,
    subtitle: Option<String>,
    author: Option<String>,
    copyright_date: Option<Value>,
    publication_year: Option<Value>,
    item_type: Option<String>,
    cn_source: Option<String>,
    cn_class: Option<String>,
    cn_item: Option<String>,
    cn_suffix: Option<String>,
    callnumber: Option<String>,
}

fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ApiBiblio {
    /// Normalize into a [`SourceHit`].
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the identifier is zero.
    pub fn into_hit(self) -> Result<SourceHit, String> {
        let id = RecordId::new(self.biblio_id)
            .map_err(|e| format!("biblio_id {}: {e}", self.biblio_id))?;

        let title = match (self.title.as_deref(), self.subtitle.as_deref()) {
            (Some(t), Some(s)) if !s.trim().is_empty() => {
                clean_title(&format!("{} {}", t.trim(), s.trim()))
            }
            (Some(t), _) => clean_title(t),
            (None, _) => String::new(),
        };

        let year = value_text(self.publication_year.as_ref())
            .or_else(|| value_text(self.copyright_date.as_ref()))
            .as_deref()
            .and_then(extract_year);

        let number = join_parts(&[
            self.cn_class.as_deref(),
            self.cn_item.as_deref(),
            self.cn_suffix.as_deref(),
        ])
        .or(self.callnumber);
        let call_numbers = match self.cn_source.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("lcc" | "lc") => CallNumbers::new(number, None, None),
            Some("ddc" | "dewey") => CallNumbers::new(None, number, None),
            _ => CallNumbers::new(None, None, number),
        };

        Ok(SourceHit {
            id,
            title,
            author: self.author.map(|a| clean_name(&a)).and_then(non_empty),
            publication_year: year,
            format: self.item_type.and_then(non_empty),
            call_numbers,
        })
    }
}

fn subfield_text(record: &MarcRecord, tag: &str, code: char) -> Option<String> {
    record.subfield(tag, code).map(str::to_owned)
}

fn first_subfield(record: &MarcRecord, candidates: &[(&str, char)]) -> Option<String> {
    candidates
        .iter()
        .find_map(|(tag, code)| subfield_text(record, tag, *code))
}

fn marc_format(record: &MarcRecord) -> Option<String> {
    if let Some(code) = subfield_text(record, tags::KOHA_ITEM_TYPE, 'c') {
        return Some(code);
    }
    let kind = match record.leader.as_deref()?.chars().nth(6)? {
        'a' | 't' => "Book",
        'c' | 'd' => "Music score",
        'e' | 'f' => "Map",
        'g' => "Video",
        'i' => "Sound recording",
        'j' => "Music recording",
        'k' => "Image",
        'm' => "Computer file",
        'o' | 'p' => "Kit",
        'r' => "Object",
        _ => return None,
    };
    Some(kind.to_owned())
}

fn marc_year(record: &MarcRecord) -> Option<String> {
    first_subfield(record, &[(tags::PUBLICATION, 'c'), (tags::PUBLICATION_RDA, 'c')])
        .as_deref()
        .and_then(extract_year)
        .or_else(|| {
            let date1 = record.control("008")?.get(7..11)?;
            date1
                .chars()
                .all(|c| c.is_ascii_digit())
                .then(|| date1.to_owned())
        })
}

fn marc_call_numbers(record: &MarcRecord) -> CallNumbers {
    let classed = |tag: &str| {
        join_parts(&[record.subfield(tag, 'a'), record.subfield(tag, 'b')])
    };
    let lcc = classed(tags::LC_CALL_NUMBER).or_else(|| classed(tags::LOCAL_LC_CALL_NUMBER));
    // 082 uses '/' as a segmentation mark, not part of the number.
    let dewey = record
        .subfield(tags::DEWEY, 'a')
        .map(|d| d.replace('/', ""))
        .or_else(|| classed(tags::LOCAL_DEWEY));
    CallNumbers::new(lcc, dewey, None)
}

fn marc_publisher(record: &MarcRecord) -> Option<String> {
    [tags::PUBLICATION, tags::PUBLICATION_RDA].iter().find_map(|tag| {
        let place = record
            .subfield(tag, 'a')
            .map(|p| p.trim_end_matches([' ', ':', ',', ';']).to_owned());
        let name = record
            .subfield(tag, 'b')
            .map(|p| p.trim_end_matches([' ', ',', ';']).to_owned());
        match (place, name) {
            (Some(p), Some(n)) => Some(format!("{p}: {n}")),
            (p, n) => p.or(n),
        }
    })
}

fn marc_subjects(record: &MarcRecord) -> Vec<String> {
    record
        .fields
        .iter()
        .filter(|f| tags::SUBJECTS.contains(&f.tag.as_str()))
        .filter_map(|f| match &f.content {
            FieldContent::Data { subfields, .. } => {
                let parts: Vec<String> = subfields
                    .iter()
                    .filter(|sf| matches!(sf.code, 'a' | 'b' | 'v' | 'x' | 'y' | 'z'))
                    .map(|sf| clean_name(&sf.value))
                    .filter(|v| !v.is_empty())
                    .collect();
                non_empty(parts.join(" -- "))
            }
            FieldContent::Control(_) => None,
        })
        .collect()
}

/// Build a detail record from a MARC record.
#[must_use]
pub fn detail_from_marc(
    id: RecordId,
    record: MarcRecord,
    mode: CallNumberDisplay,
) -> BibliographicDetail {
    let title = match (
        record.subfield(tags::TITLE, 'a'),
        record.subfield(tags::TITLE, 'b'),
    ) {
        (Some(a), Some(b)) => clean_title(&format!("{} {}", a.trim(), b.trim())),
        (Some(a), None) => clean_title(a),
        (None, _) => String::new(),
    };
    let author = first_subfield(
        &record,
        &[
            (tags::AUTHOR_PERSONAL, 'a'),
            (tags::AUTHOR_CORPORATE, 'a'),
            (tags::AUTHOR_MEETING, 'a'),
            (tags::ADDED_AUTHOR_PERSONAL, 'a'),
        ],
    )
    .map(|a| clean_name(&a))
    .and_then(non_empty);

    let physical = join_parts(&[
        record.subfield(tags::PHYSICAL_DESCRIPTION, 'a'),
        record.subfield(tags::PHYSICAL_DESCRIPTION, 'b'),
        record.subfield(tags::PHYSICAL_DESCRIPTION, 'c'),
    ])
    .map(|p| clean_name(&p));

    let all_call_numbers = marc_call_numbers(&record);
    let hit = SourceHit {
        id,
        title,
        author,
        publication_year: marc_year(&record),
        format: marc_format(&record),
        call_numbers: all_call_numbers.clone(),
    };

    BibliographicDetail {
        summary: hit.into_summary(mode),
        all_call_numbers,
        publisher: marc_publisher(&record),
        isbn: subfield_text(&record, tags::ISBN, 'a')
            .and_then(|i| i.split_whitespace().next().map(str::to_owned)),
        edition: subfield_text(&record, tags::EDITION, 'a').map(|e| clean_name(&e)),
        physical_description: physical,
        series: first_subfield(&record, &[(tags::SERIES, 'a'), (tags::SERIES_ADDED_ENTRY, 'a')])
            .map(|s| clean_title(&s)),
        abstract_note: subfield_text(&record, tags::SUMMARY, 'a'),
        notes: record
            .subfields(tags::GENERAL_NOTE, 'a')
            .into_iter()
            .map(str::to_owned)
            .collect(),
        subjects: marc_subjects(&record),
        raw: RawRecord::Marc(record),
    }
}

/// An item as returned by `GET /public/biblios/{id}/items`.
#[derive(Debug, Deserialize)]
pub struct ApiItem {
    item_id: u64,
    external_id: Option<String>,
    barcode: Option<String>,
    holding_library_id: Option<String>,
    home_library_id: Option<String>,
    location: Option<String>,
    callnumber: Option<String>,
    copy_number: Option<Value>,
    status: Option<String>,
    checked_out_date: Option<String>,
    due_date: Option<String>,
    lost_status: Option<Value>,
    damaged_status: Option<Value>,
    withdrawn: Option<Value>,
    not_for_loan_status: Option<Value>,
    in_transit: Option<Value>,
    public_notes: Option<String>,
    public_note: Option<String>,
}

fn flag(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(1),
        Some(Value::Bool(b)) => i64::from(*b),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(i64::from(!s.trim().is_empty())),
        Some(Value::Object(o)) => i64::from(!o.is_empty()),
        _ => 0,
    }
}

/// Parse a due date from an RFC 3339 timestamp or a plain `YYYY-MM-DD`.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

impl ApiItem {
    fn status(&self) -> HoldingStatus {
        if let Some(code) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            return HoldingStatus::from_code(code);
        }
        let not_for_loan = flag(self.not_for_loan_status.as_ref());
        if self.checked_out_date.is_some() || self.due_date.is_some() {
            HoldingStatus::CheckedOut
        } else if flag(self.lost_status.as_ref()) != 0 {
            HoldingStatus::Lost
        } else if flag(self.damaged_status.as_ref()) != 0 {
            HoldingStatus::Damaged
        } else if flag(self.withdrawn.as_ref()) != 0 {
            HoldingStatus::Withdrawn
        } else if not_for_loan < 0 {
            HoldingStatus::OnOrder
        } else if not_for_loan > 0 {
            HoldingStatus::ReferenceOnly
        } else if flag(self.in_transit.as_ref()) != 0 {
            HoldingStatus::InTransit
        } else {
            HoldingStatus::Available
        }
    }

    /// Normalize into an [`ItemHolding`], naming the library from `libraries`.
    #[must_use]
    pub fn into_holding(self, libraries: &BTreeMap<String, String>) -> ItemHolding {
        let status = self.status();
        let library_id = self
            .holding_library_id
            .or(self.home_library_id)
            .unwrap_or_default();
        let library_name = libraries
            .get(&library_id)
            .cloned()
            .unwrap_or_else(|| library_id.clone());
        let due_date = if status == HoldingStatus::CheckedOut {
            self.due_date.as_deref().and_then(parse_due_date)
        } else {
            None
        };
        ItemHolding {
            item_id: self.item_id,
            barcode: self.external_id.or(self.barcode).and_then(non_empty),
            library_id,
            library_name,
            location: self.location.and_then(non_empty),
            call_number: self.callnumber.and_then(non_empty),
            copy_number: value_text(self.copy_number.as_ref()).and_then(non_empty),
            status,
            due_date,
            public_note: self.public_notes.or(self.public_note).and_then(non_empty),
        }
    }
}

/// A library as returned by `GET /public/libraries`.
#[derive(Debug, Deserialize)]
pub struct ApiLibrary {
    library_id: String,
    name: Option<String>,
}

impl ApiLibrary {
    /// `(code, display name)`, using the code when the name is blank.
    #[must_use]
    pub fn into_entry(self) -> (String, String) {
        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.library_id.clone());
        (self.library_id, name)
    }
}
