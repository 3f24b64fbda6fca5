//! Remote synchronization for the quote collection.
//!
//! # Responsibility
//! - Define the remote collaborator contract (`RemoteQuoteSource`).
//! - Reconcile the local store against a remote snapshot, server wins.
//! - Provide concrete remotes (in-memory mock, JSONPlaceholder) and the
//!   fixed-interval schedule that drives periodic cycles.
//!
//! # Invariants
//! - A failed fetch never mutates or persists the store.
//! - The remote snapshot is authoritative: local-only records are removed.

pub mod jsonplaceholder;
pub mod merge;
pub mod merger;
pub mod mock_remote;
pub mod provider_registry;
pub mod remote;
pub mod schedule;
