//! Item-level holdings and the fixed circulation status vocabulary.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Circulation status shown to patrons.
///
/// Source systems use many codes for the same situation; every code maps to
/// one of these, with [`HoldingStatus::Unavailable`] as the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingStatus {
    /// On the shelf and loanable.
    Available,
    /// On loan to a patron.
    CheckedOut,
    /// Moving between branches.
    InTransit,
    /// Ordered, not yet received.
    OnOrder,
    /// Library use only.
    ReferenceOnly,
    /// Damaged and out of circulation.
    Damaged,
    /// Lost or missing.
    Lost,
    /// Withdrawn from the collection.
    Withdrawn,
    /// Not available for an unrecognized reason.
    Unavailable,
}

impl HoldingStatus {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::CheckedOut => "Checked out",
            Self::InTransit => "In transit",
            Self::OnOrder => "On order",
            Self::ReferenceOnly => "Reference only",
            Self::Damaged => "Damaged",
            Self::Lost => "Lost",
            Self::Withdrawn => "Withdrawn",
            Self::Unavailable => "Unavailable",
        }
    }

    /// Map a source status code to the display vocabulary.
    ///
    /// Matching ignores case, spaces, hyphens and underscores. Unknown codes
    /// map to [`HoldingStatus::Unavailable`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let key: String = code
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "available" | "onshelf" | "in" | "checkedin" => Self::Available,
            "checkedout" | "onloan" | "loaned" | "out" | "issued" | "due" => Self::CheckedOut,
            "intransit" | "transit" | "transferring" => Self::InTransit,
            "onorder" | "ordered" | "acquisition" => Self::OnOrder,
            "referenceonly" | "reference" | "notforloan" | "libraryuseonly" => {
                Self::ReferenceOnly
            }
            "damaged" => Self::Damaged,
            "lost" | "missing" | "longoverdue" | "claimsreturned" => Self::Lost,
            "withdrawn" | "discarded" => Self::Withdrawn,
            _ => Self::Unavailable,
        }
    }

    /// `true` only for [`HoldingStatus::Available`].
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

impl fmt::Display for HoldingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One physical copy of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHolding {
    /// Source item identifier.
    pub item_id: u64,
    /// Barcode, when public.
    pub barcode: Option<String>,
    /// Owning library code.
    pub library_id: String,
    /// Owning library display name (the code when unknown).
    pub library_name: String,
    /// Shelving location.
    pub location: Option<String>,
    /// Item-level call number.
    pub call_number: Option<String>,
    /// Copy number.
    pub copy_number: Option<String>,
    /// Circulation status.
    pub status: HoldingStatus,
    /// Due date while checked out.
    pub due_date: Option<NaiveDate>,
    /// Public note.
    pub public_note: Option<String>,
}
