//! MARC 21 bibliographic record as served in MARC-in-JSON form.
//!
//! The wire shape is `{"leader": "...", "fields": [{"245": {"ind1": "1",
//! "ind2": "0", "subfields": [{"a": "Bleak house /"}]}}, {"001": "123"}]}`.
//! Field order and repeated tags are preserved.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// MARC 21 tags read during normalization.
pub mod tags {
    /// International Standard Book Number.
    pub const ISBN: &str = "020";
    /// Library of Congress call number.
    pub const LC_CALL_NUMBER: &str = "050";
    /// Dewey Decimal classification number.
    pub const DEWEY: &str = "082";
    /// Locally assigned LC-style call number.
    pub const LOCAL_LC_CALL_NUMBER: &str = "090";
    /// Locally assigned Dewey call number.
    pub const LOCAL_DEWEY: &str = "092";
    /// Main entry, personal name.
    pub const AUTHOR_PERSONAL: &str = "100";
    /// Main entry, corporate name.
    pub const AUTHOR_CORPORATE: &str = "110";
    /// Main entry, meeting name.
    pub const AUTHOR_MEETING: &str = "111";
    /// Title statement.
    pub const TITLE: &str = "245";
    /// Edition statement.
    pub const EDITION: &str = "250";
    /// Publication (pre-RDA imprint).
    pub const PUBLICATION: &str = "260";
    /// Publication (RDA).
    pub const PUBLICATION_RDA: &str = "264";
    /// Physical description.
    pub const PHYSICAL_DESCRIPTION: &str = "300";
    /// Series statement.
    pub const SERIES: &str = "490";
    /// General note.
    pub const GENERAL_NOTE: &str = "500";
    /// Summary / abstract.
    pub const SUMMARY: &str = "520";
    /// Subject heading, personal name.
    pub const SUBJECT_PERSONAL: &str = "600";
    /// Subject heading, corporate name.
    pub const SUBJECT_CORPORATE: &str = "610";
    /// Topical subject heading.
    pub const SUBJECT_TOPICAL: &str = "650";
    /// Geographic subject heading.
    pub const SUBJECT_GEOGRAPHIC: &str = "651";
    /// Tags read as subject headings.
    pub const SUBJECTS: [&str; 4] = [
        SUBJECT_PERSONAL,
        SUBJECT_CORPORATE,
        SUBJECT_TOPICAL,
        SUBJECT_GEOGRAPHIC,
    ];
    /// Added entry, personal name.
    pub const ADDED_AUTHOR_PERSONAL: &str = "700";
    /// Series added entry, uniform title.
    pub const SERIES_ADDED_ENTRY: &str = "830";
    /// Koha local item type (942$c).
    pub const KOHA_ITEM_TYPE: &str = "942";
}

/// One subfield of a data field, e.g. `$a Bleak house /`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code.
    pub code: char,
    /// Subfield content.
    pub value: String,
}

/// Payload of a MARC field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldContent {
    /// Control field (`00X`): a single value.
    Control(String),
    /// Data field with two indicators and ordered subfields.
    Data {
        /// First indicator, `' '` when blank.
        ind1: char,
        /// Second indicator, `' '` when blank.
        ind2: char,
        /// Subfields in catalogued order.
        subfields: Vec<Subfield>,
    },
}

/// A single tagged field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarcField {
    /// Three-character tag, e.g. `245`.
    pub tag: String,
    /// Field payload.
    pub content: FieldContent,
}

/// A parsed MARC record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MarcInJson", into = "MarcInJson")]
pub struct MarcRecord {
    /// Record leader, when present.
    pub leader: Option<String>,
    /// Fields in record order.
    pub fields: Vec<MarcField>,
}

impl MarcRecord {
    /// First non-blank `code` subfield across all `tag` fields.
    #[must_use]
    pub fn subfield(&self, tag: &str, code: char) -> Option<&str> {
        self.subfields(tag, code).into_iter().next()
    }

    /// Every non-blank `code` subfield across all `tag` fields, in order.
    #[must_use]
    pub fn subfields(&self, tag: &str, code: char) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.tag == tag)
            .filter_map(|f| match &f.content {
                FieldContent::Data { subfields, .. } => Some(subfields),
                FieldContent::Control(_) => None,
            })
            .flatten()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.value.trim())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Value of the first control field with `tag`.
    #[must_use]
    pub fn control(&self, tag: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match &f.content {
            FieldContent::Control(v) if f.tag == tag => Some(v.as_str()),
            _ => None,
        })
    }

    /// `true` if the record has neither leader nor fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leader.is_none() && self.fields.is_empty()
    }
}

/// Human-readable name of a MARC 21 bibliographic tag.
#[must_use]
pub fn describe_tag(tag: &str) -> Option<&'static str> {
    let name = match tag {
        "001" => "Control Number",
        "003" => "Control Number Identifier",
        "005" => "Date/Time of Latest Transaction",
        "007" => "Physical Description Fixed Field",
        "008" => "Fixed-Length Data Elements",
        "010" => "Library of Congress Control Number",
        "020" => "International Standard Book Number",
        "022" => "International Standard Serial Number",
        "024" => "Other Standard Identifier",
        "035" => "System Control Number",
        "040" => "Cataloging Source",
        "041" => "Language Code",
        "043" => "Geographic Area Code",
        "050" => "Library of Congress Call Number",
        "060" => "National Library of Medicine Call Number",
        "082" => "Dewey Decimal Classification Number",
        "084" => "Other Classification Number",
        "090" => "Local Call Number (LC)",
        "092" => "Local Call Number (Dewey)",
        "100" => "Main Entry - Personal Name",
        "110" => "Main Entry - Corporate Name",
        "111" => "Main Entry - Meeting Name",
        "130" => "Main Entry - Uniform Title",
        "240" => "Uniform Title",
        "245" => "Title Statement",
        "246" => "Varying Form of Title",
        "250" => "Edition Statement",
        "260" => "Publication, Distribution (Imprint)",
        "264" => "Production, Publication, Distribution",
        "300" => "Physical Description",
        "336" => "Content Type",
        "337" => "Media Type",
        "338" => "Carrier Type",
        "490" => "Series Statement",
        "500" => "General Note",
        "504" => "Bibliography Note",
        "505" => "Formatted Contents Note",
        "520" => "Summary",
        "546" => "Language Note",
        "600" => "Subject - Personal Name",
        "610" => "Subject - Corporate Name",
        "650" => "Subject - Topical Term",
        "651" => "Subject - Geographic Name",
        "655" => "Index Term - Genre/Form",
        "700" => "Added Entry - Personal Name",
        "710" => "Added Entry - Corporate Name",
        "830" => "Series Added Entry - Uniform Title",
        "856" => "Electronic Location and Access",
        "942" => "Added Entry Elements (Koha)",
        "952" => "Location and Item Information (Koha)",
        "999" => "System Control Numbers (Koha)",
        _ => return None,
    };
    Some(name)
}

impl fmt::Display for MarcRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(leader) = &self.leader {
            writeln!(f, "LDR   {leader}")?;
        }
        for field in &self.fields {
            match describe_tag(&field.tag) {
                Some(desc) => writeln!(f, "{:<5} {desc}", field.tag)?,
                None => writeln!(f, "{}", field.tag)?,
            }
            match &field.content {
                FieldContent::Control(value) => writeln!(f, "      {value}")?,
                FieldContent::Data {
                    ind1,
                    ind2,
                    subfields,
                } => {
                    if *ind1 != ' ' || *ind2 != ' ' {
                        writeln!(f, "      Indicators: [{ind1}][{ind2}]")?;
                    }
                    for sf in subfields {
                        writeln!(f, "      ${} {}", sf.code, sf.value)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct MarcInJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    leader: Option<String>,
    #[serde(default)]
    fields: Vec<BTreeMap<String, FieldJson>>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum FieldJson {
    Control(String),
    Data {
        #[serde(default)]
        ind1: String,
        #[serde(default)]
        ind2: String,
        #[serde(default)]
        subfields: Vec<BTreeMap<String, String>>,
    },
}

fn indicator(raw: &str) -> char {
    raw.chars().next().unwrap_or(' ')
}

impl From<MarcInJson> for MarcRecord {
    fn from(raw: MarcInJson) -> Self {
        let fields = raw
            .fields
            .into_iter()
            .flat_map(BTreeMap::into_iter)
            .map(|(tag, content)| MarcField {
                tag,
                content: match content {
                    FieldJson::Control(v) => FieldContent::Control(v),
                    FieldJson::Data {
                        ind1,
                        ind2,
                        subfields,
                    } => FieldContent::Data {
                        ind1: indicator(&ind1),
                        ind2: indicator(&ind2),
                        subfields: subfields
                            .into_iter()
                            .flat_map(BTreeMap::into_iter)
                            .filter_map(|(code, value)| {
                                code.chars().next().map(|code| Subfield { code, value })
                            })
                            .collect(),
                    },
                },
            })
            .collect();
        Self {
            leader: raw.leader.filter(|l| !l.trim().is_empty()),
            fields,
        }
    }
}

impl From<MarcRecord> for MarcInJson {
    fn from(record: MarcRecord) -> Self {
        let fields = record
            .fields
            .into_iter()
            .map(|field| {
                let json = match field.content {
                    FieldContent::Control(v) => FieldJson::Control(v),
                    FieldContent::Data {
                        ind1,
                        ind2,
                        subfields,
                    } => FieldJson::Data {
                        ind1: ind1.to_string(),
                        ind2: ind2.to_string(),
                        subfields: subfields
                            .into_iter()
                            .map(|sf| BTreeMap::from([(sf.code.to_string(), sf.value)]))
                            .collect(),
                    },
                };
                BTreeMap::from([(field.tag, json)])
            })
            .collect();
        Self {
            leader: record.leader,
            fields,
        }
    }
}
