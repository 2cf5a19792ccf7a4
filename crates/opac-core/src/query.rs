//! Catalog search query, e.g. `author:dickens` on page 2 of 10-row pages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{ValidationError, MAX_PAGE_SIZE, MAX_TERM_LENGTH, MIN_PAGE_SIZE};

/// The index a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Any indexed field.
    #[default]
    Keyword,
    /// Title statement.
    Title,
    /// Personal or corporate author.
    Author,
    /// Subject headings.
    Subject,
    /// ISBN.
    Isbn,
    /// Series title.
    Series,
    /// Shelf call number.
    CallNumber,
}

impl SearchField {
    /// All fields, in menu order.
    pub const ALL: [Self; 7] = [
        Self::Keyword,
        Self::Title,
        Self::Author,
        Self::Subject,
        Self::Isbn,
        Self::Series,
        Self::CallNumber,
    ];

    /// Short lowercase name used on the command line and in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Title => "title",
            Self::Author => "author",
            Self::Subject => "subject",
            Self::Isbn => "isbn",
            Self::Series => "series",
            Self::CallNumber => "callnumber",
        }
    }

    /// Koha OPAC search index code (`idx` parameter).
    #[must_use]
    pub fn opac_index(self) -> &'static str {
        match self {
            Self::Keyword => "kw",
            Self::Title => "ti",
            Self::Author => "au",
            Self::Subject => "su",
            Self::Isbn => "nb",
            Self::Series => "se",
            Self::CallNumber => "callnum",
        }
    }
}

impl FromStr for SearchField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .or(match wanted.as_str() {
                "kw" | "any" => Some(Self::Keyword),
                "ti" => Some(Self::Title),
                "au" => Some(Self::Author),
                "su" => Some(Self::Subject),
                "nb" => Some(Self::Isbn),
                "se" => Some(Self::Series),
                "callnum" | "cn" => Some(Self::CallNumber),
                _ => None,
            })
            .ok_or_else(|| ValidationError::UnknownField(s.to_owned()))
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated search request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QueryFields")]
pub struct SearchQuery {
    term: String,
    field: SearchField,
    page: u32,
    page_size: u32,
}

impl SearchQuery {
    /// Build a query, normalising whitespace in `term`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the term has no usable terms or is too
    /// long, if `page` is zero, or if `page_size` is outside
    /// `MIN_PAGE_SIZE..=MAX_PAGE_SIZE`.
    pub fn new(
        term: &str,
        field: Option<SearchField>,
        page: u32,
        page_size: u32,
    ) -> Result<Self, ValidationError> {
        let term = term.split_whitespace().collect::<Vec<_>>().join(" ");
        if !term.chars().any(char::is_alphanumeric) {
            return Err(ValidationError::NoUsableTerms);
        }
        let len = term.chars().count();
        if len > MAX_TERM_LENGTH {
            return Err(ValidationError::TermTooLong {
                max: MAX_TERM_LENGTH,
                got: len,
            });
        }
        if page == 0 {
            return Err(ValidationError::PageOutOfRange);
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ValidationError::PageSizeOutOfRange {
                min: MIN_PAGE_SIZE,
                max: MAX_PAGE_SIZE,
                got: page_size,
            });
        }
        Ok(Self {
            term,
            field: field.unwrap_or_default(),
            page,
            page_size,
        })
    }

    /// The normalised search term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The index searched.
    #[must_use]
    pub fn field(&self) -> SearchField {
        self.field
    }

    /// The 1-indexed page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of hits preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// The same query moved to `page`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PageOutOfRange`] if `page` is zero.
    pub fn with_page(&self, page: u32) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::PageOutOfRange);
        }
        Ok(Self {
            page,
            ..self.clone()
        })
    }
}

/// Unchecked serialized form of [`SearchQuery`].
#[derive(Deserialize)]
struct QueryFields {
    term: String,
    #[serde(default)]
    field: SearchField,
    page: u32,
    page_size: u32,
}

impl TryFrom<QueryFields> for SearchQuery {
    type Error = ValidationError;

    fn try_from(raw: QueryFields) -> Result<Self, Self::Error> {
        Self::new(&raw.term, Some(raw.field), raw.page, raw.page_size)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (page {})", self.field, self.term, self.page)
    }
}
