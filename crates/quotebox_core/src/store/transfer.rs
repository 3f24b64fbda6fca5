//! JSON import/export of quote collections.
//!
//! # Responsibility
//! - Render the collection as a pretty-printed JSON array.
//! - Validate import files as a whole before any record reaches the store.
//!
//! # Invariants
//! - An import is all-or-nothing: one malformed element rejects the file.
//! - Only `id`, `text`, `author`, `category` survive a round trip; any other
//!   field in the input is dropped.

use crate::model::quote::{Quote, QuoteDraft, QuoteId};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Default file name used by export.
pub const EXPORT_FILE_NAME: &str = "quotes.json";

#[derive(Debug)]
pub enum TransferError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidFormat(String),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "quote file io failed: {err}"),
            Self::Parse(err) => write!(f, "quote file is not valid JSON: {err}"),
            Self::InvalidFormat(details) => write!(
                f,
                "invalid quote file format: {details}; expected an array of objects with string `text` and `category`"
            ),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Renders quotes as a pretty-printed (2-space) JSON array.
pub fn export_json(quotes: &[Quote]) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// Writes the export file to `path`.
pub fn export_to_path(quotes: &[Quote], path: impl AsRef<Path>) -> Result<(), TransferError> {
    let content = export_json(quotes)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Reads and validates an import file.
pub fn import_from_path(path: impl AsRef<Path>) -> Result<Vec<QuoteDraft>, TransferError> {
    let content = std::fs::read_to_string(path)?;
    parse_import(&content)
}

/// Parses a JSON array of quote objects.
///
/// Each element must be an object with string `text` and `category`.
/// `id` may be a string or a number; a non-string `author` is ignored.
pub fn parse_import(content: &str) -> Result<Vec<QuoteDraft>, TransferError> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(TransferError::InvalidFormat(
            "top-level value is not an array".to_string(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => draft_from_object(index, fields),
            _ => Err(TransferError::InvalidFormat(format!(
                "element {index} is not an object"
            ))),
        })
        .collect()
}

fn draft_from_object(index: usize, fields: &Map<String, Value>) -> Result<QuoteDraft, TransferError> {
    let text = required_string(index, fields, "text")?;
    let category = required_string(index, fields, "category")?;
    let id = match fields.get("id") {
        Some(Value::String(id)) => Some(QuoteId::from(id.as_str())),
        Some(Value::Number(id)) => Some(QuoteId::from(id.to_string())),
        _ => None,
    };
    let author = fields
        .get("author")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(QuoteDraft {
        id,
        text,
        author,
        category,
    })
}

fn required_string(
    index: usize,
    fields: &Map<String, Value>,
    name: &str,
) -> Result<String, TransferError> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            TransferError::InvalidFormat(format!("element {index} has no string `{name}`"))
        })
}
