//! Bibliographic records in the normalized display model.

use serde::{Deserialize, Serialize};

use crate::call_number::{format_call_numbers, CallNumber, CallNumberDisplay, CallNumbers};
use crate::marc::MarcRecord;
use crate::types::RecordId;

/// One search hit, ready for a result list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicSummary {
    /// Catalog identifier.
    pub id: RecordId,
    /// Title, never empty (`Record #<id>` when the source had none).
    pub title: String,
    /// Main author or statement of responsibility.
    pub author: Option<String>,
    /// Four-digit publication year.
    pub publication_year: Option<String>,
    /// Material format / item type, e.g. `Book`.
    pub format: Option<String>,
    /// Call numbers visible under the configured display mode.
    pub call_numbers: Vec<CallNumber>,
}

impl BibliographicSummary {
    /// Single-line call number for list display, if any is visible.
    #[must_use]
    pub fn call_number(&self) -> Option<String> {
        format_call_numbers(&self.call_numbers)
    }
}

/// Where a record's descriptive data came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawRecord {
    /// Full MARC record from the structured endpoint.
    Marc(MarcRecord),
    /// Fields scraped from the OPAC detail page; no MARC available.
    OpacPage {
        /// Page the fields were read from.
        url: String,
    },
}

impl RawRecord {
    /// The MARC record, when the structured endpoint served this record.
    #[must_use]
    pub fn marc(&self) -> Option<&MarcRecord> {
        match self {
            Self::Marc(m) => Some(m),
            Self::OpacPage { .. } => None,
        }
    }
}

/// Full descriptive record for the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicDetail {
    /// List-row fields, with call numbers filtered by display mode.
    pub summary: BibliographicSummary,
    /// Every call number the record carries, unfiltered.
    pub all_call_numbers: CallNumbers,
    /// Place and publisher, e.g. `London: Bradbury and Evans`.
    pub publisher: Option<String>,
    /// First ISBN.
    pub isbn: Option<String>,
    /// Edition statement.
    pub edition: Option<String>,
    /// Extent and dimensions.
    pub physical_description: Option<String>,
    /// Series statement.
    pub series: Option<String>,
    /// Summary / abstract.
    pub abstract_note: Option<String>,
    /// General notes.
    pub notes: Vec<String>,
    /// Subject headings.
    pub subjects: Vec<String>,
    /// Raw record for inspection.
    pub raw: RawRecord,
}

impl BibliographicDetail {
    /// Catalog identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.summary.id
    }

    /// Call numbers under a display mode other than the one the summary used.
    #[must_use]
    pub fn call_numbers_for(&self, mode: CallNumberDisplay) -> Vec<CallNumber> {
        self.all_call_numbers.select(mode)
    }
}
