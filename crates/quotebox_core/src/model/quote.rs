//! Quote domain model.
//!
//! # Responsibility
//! - Define the quote record and its wire shape.
//! - Normalize loosely-shaped input (`QuoteDraft`) into canonical records.
//!
//! # Invariants
//! - `id` is assigned once and never rewritten by store operations.
//! - `text`, `category` and `id` are non-empty after trimming.
//! - Unknown wire fields are ignored on read and never written back.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Author used for records that arrive without one (storage, import, sync).
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Author used for records added interactively without one.
pub const USER_AUTHOR: &str = "User";

/// Stable string identifier of a quote.
///
/// Locally created ids are UUID v4 strings; remote ids keep whatever string
/// form the remote uses (numeric post ids become `"1"`, `"2"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(String);

impl QuoteId {
    /// Generates a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QuoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for QuoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QuoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for QuoteId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Validation errors for quote records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
    EmptyCategory,
    EmptyId,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text must not be empty"),
            Self::EmptyCategory => write!(f, "quote category must not be empty"),
            Self::EmptyId => write!(f, "quote id must not be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

/// Canonical quote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub text: String,
    pub author: String,
    pub category: String,
}

impl Quote {
    /// Creates a quote with a freshly generated id.
    ///
    /// Inputs are trimmed; a missing or blank author becomes `"User"`.
    ///
    /// # Errors
    /// - `EmptyText` / `EmptyCategory` when the trimmed value is empty.
    pub fn new(
        text: &str,
        category: &str,
        author: Option<&str>,
    ) -> Result<Self, QuoteValidationError> {
        let author = match author.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => USER_AUTHOR,
        };
        Self::with_id(QuoteId::generate(), text, category, Some(author))
    }

    /// Creates a quote with a caller-provided id.
    ///
    /// Used by sync/import paths where identity already exists externally.
    /// A missing or blank author becomes `"Unknown"`.
    pub fn with_id(
        id: QuoteId,
        text: &str,
        category: &str,
        author: Option<&str>,
    ) -> Result<Self, QuoteValidationError> {
        let quote = Self {
            id,
            text: text.trim().to_string(),
            author: normalize_author(author),
            category: category.trim().to_string(),
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(QuoteValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Name shown under the quote: author, or category when author is blank.
    pub fn attribution(&self) -> &str {
        if self.author.trim().is_empty() {
            &self.category
        } else {
            &self.author
        }
    }
}

/// Loosely-shaped quote as found in storage, import files, or old variants.
///
/// `id` and `author` may be absent; `text` and `category` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub category: String,
}

impl QuoteDraft {
    /// Whether this draft still needs an id assigned.
    pub fn needs_id(&self) -> bool {
        self.id
            .as_ref()
            .map_or(true, |id| id.as_str().trim().is_empty())
    }

    /// Converts the draft into a canonical quote, assigning a fresh id if
    /// none is present.
    pub fn into_quote(self) -> Result<Quote, QuoteValidationError> {
        let id = match self.id {
            Some(id) if !id.as_str().trim().is_empty() => id,
            _ => QuoteId::generate(),
        };
        Quote::with_id(id, &self.text, &self.category, self.author.as_deref())
    }
}

impl From<Quote> for QuoteDraft {
    fn from(value: Quote) -> Self {
        Self {
            id: Some(value.id),
            text: value.text,
            author: Some(value.author),
            category: value.category,
        }
    }
}

fn normalize_author(author: Option<&str>) -> String {
    match author.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}
