//! Validated newtype wrappers for core catalog primitives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest search term accepted, in characters.
pub const MAX_TERM_LENGTH: usize = 500;
/// Smallest page size a viewport may request.
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest page size a viewport may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Error returned when a domain value fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The search term has no alphanumeric content.
    #[error("search query has no usable terms")]
    NoUsableTerms,
    /// The search term exceeds the maximum length.
    #[error("search query exceeds maximum length of {max} characters (got {got})")]
    TermTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        got: usize,
    },
    /// Page numbers start at 1.
    #[error("page number must be at least 1")]
    PageOutOfRange,
    /// The page size is outside the supported range.
    #[error("page size must be between {min} and {max} (got {got})")]
    PageSizeOutOfRange {
        /// Smallest allowed size.
        min: u32,
        /// Largest allowed size.
        max: u32,
        /// Requested size.
        got: u32,
    },
    /// Record identifiers are positive integers.
    #[error("record identifier must be a positive integer")]
    InvalidRecordId,
    /// The search field name is not recognized.
    #[error("unknown search field '{0}'")]
    UnknownField(String),
    /// The call-number display mode is not recognized.
    #[error("unknown call number display mode '{0}': expected both, lcc or dewey")]
    UnknownDisplayMode(String),
}

/// A catalog record identifier (Koha `biblionumber`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RecordId(u64);

impl RecordId {
    /// Create a `RecordId`, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRecordId`] if `id` is zero.
    pub fn new(id: u64) -> Result<Self, ValidationError> {
        if id == 0 {
            return Err(ValidationError::InvalidRecordId);
        }
        Ok(Self(id))
    }

    /// Return the numeric identifier.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for RecordId {
    type Error = ValidationError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidRecordId)?;
        Self::new(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
