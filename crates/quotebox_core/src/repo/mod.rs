//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key/value contract used for durable and session storage.
//! - Isolate SQLite query details from store/service orchestration.
//!
//! # Invariants
//! - Values are opaque strings; JSON encoding is the caller's concern.

pub mod kv_repo;

/// Durable key holding the JSON array of quote records.
pub const QUOTES_KEY: &str = "quotes";
/// Durable key holding the last selected category filter.
pub const LAST_CATEGORY_FILTER_KEY: &str = "lastCategoryFilter";
/// Session key holding the last displayed quote as JSON.
pub const LAST_VIEWED_QUOTE_KEY: &str = "lastViewedQuote";
