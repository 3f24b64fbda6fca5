//! In-memory quote collection mirrored to durable storage.
//!
//! # Responsibility
//! - Own the ordered quote collection and every mutation path over it.
//! - Persist the full collection after each mutation.
//! - Convert between the collection and import/export files.
//!
//! # Invariants
//! - Validation failures never touch the collection.
//! - Storage failures keep the in-memory collection and mark it dirty.

pub mod dedup;
pub mod defaults;
pub mod quote_store;
pub mod transfer;
