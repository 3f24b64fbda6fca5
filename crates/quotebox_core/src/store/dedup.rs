//! Duplicate detection strategies for batch imports.
//!
//! Older collections were deduplicated by `(text, category)` while newer ones
//! use the record id. Both are supported and selected by configuration.

use crate::model::quote::{Quote, QuoteId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How two quote records are recognized as the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Same `id`.
    #[default]
    Id,
    /// Same `text` and `category` (exact match).
    TextCategory,
}

/// Comparable key derived from a quote under one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(QuoteId),
    TextCategory(String, String),
}

impl DedupStrategy {
    pub fn key(self, quote: &Quote) -> DedupKey {
        match self {
            Self::Id => DedupKey::Id(quote.id.clone()),
            Self::TextCategory => DedupKey::TextCategory(quote.text.clone(), quote.category.clone()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::TextCategory => "text_category",
        }
    }
}

impl Display for DedupStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "text_category" | "text-category" => Ok(Self::TextCategory),
            other => Err(format!(
                "unsupported dedup strategy `{other}`; expected id|text_category"
            )),
        }
    }
}
