//! In-memory remote holding an authoritative snapshot.
//!
//! Used for offline runs (`provider = "mock"`) and as the test remote.

use crate::model::quote::{Quote, QuoteId};
use crate::sync::remote::{RemoteError, RemoteQuoteSource, RemoteResult, SyncStage};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const MOCK_SOURCE_ID: &str = "mock";

#[derive(Debug, Default)]
struct MockState {
    snapshot: Vec<Quote>,
    fail_next: Option<String>,
    fetch_calls: usize,
    append_calls: usize,
}

/// Mutable in-memory remote.
#[derive(Debug, Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Vec<Quote>) -> Self {
        let remote = Self::new();
        remote.set_snapshot(snapshot);
        remote
    }

    /// Replaces the whole remote collection.
    pub fn set_snapshot(&self, snapshot: Vec<Quote>) {
        self.lock().snapshot = snapshot;
    }

    pub fn snapshot(&self) -> Vec<Quote> {
        self.lock().snapshot.clone()
    }

    /// Removes the remote record with `id`; returns whether it existed.
    pub fn remove(&self, id: &QuoteId) -> bool {
        let mut state = self.lock();
        let before = state.snapshot.len();
        state.snapshot.retain(|quote| quote.id != *id);
        state.snapshot.len() != before
    }

    /// Makes the next remote call fail with `code`.
    pub fn fail_next(&self, code: &str) {
        self.lock().fail_next = Some(code.to_string());
    }

    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }

    pub fn append_calls(&self) -> usize {
        self.lock().append_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteQuoteSource for MockRemote {
    fn source_id(&self) -> &str {
        MOCK_SOURCE_ID
    }

    fn fetch_all(&self) -> RemoteResult<Vec<Quote>> {
        let mut state = self.lock();
        state.fetch_calls += 1;
        if let Some(code) = state.fail_next.take() {
            return Err(injected_failure(SyncStage::Fetch, code));
        }
        Ok(state.snapshot.clone())
    }

    fn append(&self, quote: &Quote) -> RemoteResult<()> {
        let mut state = self.lock();
        state.append_calls += 1;
        if let Some(code) = state.fail_next.take() {
            return Err(injected_failure(SyncStage::Append, code));
        }
        if !state.snapshot.iter().any(|existing| existing.id == quote.id) {
            state.snapshot.push(quote.clone());
        }
        Ok(())
    }
}

fn injected_failure(stage: SyncStage, code: String) -> RemoteError {
    RemoteError::new(MOCK_SOURCE_ID, stage, code, "injected mock failure", true)
}
