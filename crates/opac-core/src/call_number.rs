//! Shelf call numbers and the configured display preference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Which classification schemes a viewer wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallNumberDisplay {
    /// Library of Congress and Dewey, whichever are present.
    #[default]
    Both,
    /// Library of Congress only.
    Lcc,
    /// Dewey Decimal only.
    Dewey,
}

impl FromStr for CallNumberDisplay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "lcc" | "lc" | "loc" => Ok(Self::Lcc),
            "dewey" | "ddc" => Ok(Self::Dewey),
            _ => Err(ValidationError::UnknownDisplayMode(s.to_owned())),
        }
    }
}

impl fmt::Display for CallNumberDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Both => "both",
            Self::Lcc => "lcc",
            Self::Dewey => "dewey",
        })
    }
}

/// Classification scheme of a single call number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallNumberScheme {
    /// Library of Congress Classification.
    Lcc,
    /// Dewey Decimal Classification.
    Dewey,
    /// Local number whose scheme the source did not state.
    Local,
}

impl CallNumberScheme {
    /// Short prefix shown when several schemes share one line.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Lcc => "LC",
            Self::Dewey => "DDC",
            Self::Local => "Local",
        }
    }
}

/// One call number tagged with its scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNumber {
    /// Classification scheme.
    pub scheme: CallNumberScheme,
    /// The number as catalogued, e.g. `PR4564 .A1`.
    pub value: String,
}

impl fmt::Display for CallNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scheme.prefix(), self.value)
    }
}

/// Every call number a record carries, by scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNumbers {
    /// Library of Congress number, if catalogued.
    pub lcc: Option<String>,
    /// Dewey number, if catalogued.
    pub dewey: Option<String>,
    /// Number with no stated scheme.
    pub local: Option<String>,
}

impl CallNumbers {
    /// Build from optional parts, dropping blank values.
    #[must_use]
    pub fn new(lcc: Option<String>, dewey: Option<String>, local: Option<String>) -> Self {
        Self {
            lcc: non_blank(lcc),
            dewey: non_blank(dewey),
            local: non_blank(local),
        }
    }

    /// `true` if no scheme carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lcc.is_none() && self.dewey.is_none() && self.local.is_none()
    }

    /// The call numbers visible under `mode`, LC before Dewey.
    ///
    /// A local number is only surfaced when the record has no classified
    /// number at all; a record holding only an LC number yields nothing under
    /// [`CallNumberDisplay::Dewey`].
    #[must_use]
    pub fn select(&self, mode: CallNumberDisplay) -> Vec<CallNumber> {
        let mut out = Vec::with_capacity(2);
        if matches!(mode, CallNumberDisplay::Both | CallNumberDisplay::Lcc) {
            if let Some(v) = &self.lcc {
                out.push(CallNumber {
                    scheme: CallNumberScheme::Lcc,
                    value: v.clone(),
                });
            }
        }
        if matches!(mode, CallNumberDisplay::Both | CallNumberDisplay::Dewey) {
            if let Some(v) = &self.dewey {
                out.push(CallNumber {
                    scheme: CallNumberScheme::Dewey,
                    value: v.clone(),
                });
            }
        }
        if self.lcc.is_none() && self.dewey.is_none() {
            if let Some(v) = &self.local {
                out.push(CallNumber {
                    scheme: CallNumberScheme::Local,
                    value: v.clone(),
                });
            }
        }
        out
    }
}

/// Render a selection for a single display line.
///
/// With one number the bare value is returned; with several each carries its
/// scheme prefix, joined by ` | `. Returns `None` for an empty selection.
#[must_use]
pub fn format_call_numbers(selected: &[CallNumber]) -> Option<String> {
    match selected {
        [] => None,
        [only] => Some(only.value.clone()),
        many => Some(
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
        ),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
