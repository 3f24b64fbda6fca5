//! Domain model for the quote collection.
//!
//! # Responsibility
//! - Define the canonical quote record shared by store, transfer and sync.
//!
//! # Invariants
//! - Every stored quote carries a non-empty, stable `QuoteId`.
//! - `text` and `category` are never empty after trimming.

pub mod quote;
