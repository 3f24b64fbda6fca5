//! One sync cycle: fetch, merge, persist when changed.
//!
//! # Responsibility
//! - Drive `merge_snapshot` against a live store and remote.
//! - Push locally created quotes to the remote and re-sync.
//! - Send a batch of new quotes, collecting per-quote failures.
//!
//! # Invariants
//! - Fetch failure abandons the cycle before the store is touched.
//! - An unchanged merge performs no persistence write.
//! - No retry is attempted; the next trigger simply runs again.

use crate::model::quote::{Quote, QuoteId};
use crate::repo::kv_repo::KvRepository;
use crate::store::quote_store::{QuoteStore, StoreError};
use crate::sync::merge::{merge_snapshot, MergeReport};
use crate::sync::remote::{RemoteError, RemoteQuoteSource};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Result of one completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Changed(MergeReport),
    Unchanged,
}

impl SyncOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

#[derive(Debug)]
pub enum SyncError {
    /// Remote call failed; nothing merged or persisted.
    Remote(RemoteError),
    /// Merge applied in memory but the write failed.
    Store(StoreError),
    /// Push target is not in the local store.
    UnknownQuote(QuoteId),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::UnknownQuote(id) => write!(f, "quote not found: {id}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::UnknownQuote(_) => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of sending several local quotes to the remote.
#[derive(Debug, Default)]
pub struct PushReport {
    /// Ids the remote accepted, in request order.
    pub pushed: Vec<QuoteId>,
    /// Ids that could not be sent, with the reason.
    pub failed: Vec<(QuoteId, SyncError)>,
}

/// Server-wins sync driver bound to one remote.
pub struct SyncMerger {
    remote: Arc<dyn RemoteQuoteSource>,
}

impl SyncMerger {
    pub fn new(remote: Arc<dyn RemoteQuoteSource>) -> Self {
        Self { remote }
    }

    pub fn source_id(&self) -> &str {
        self.remote.source_id()
    }

    /// Runs one fetch + merge cycle against `store`.
    ///
    /// The merge applies to the store contents current at merge time, so
    /// mutations made between cycles are reconciled like any other state.
    pub fn run_cycle<R: KvRepository>(
        &self,
        store: &mut QuoteStore<R>,
    ) -> Result<SyncOutcome, SyncError> {
        let started_at = Instant::now();
        let source_id = self.remote.source_id();
        info!("event=sync_cycle module=sync status=start source={source_id}");

        let snapshot = match self.remote.fetch_all() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(
                    "event=sync_cycle module=sync status=error source={} stage={} error_code={} retryable={} duration_ms={}",
                    source_id,
                    err.stage.as_str(),
                    err.code,
                    err.retryable,
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };

        let report = merge_snapshot(store.quotes_mut(), &snapshot);
        if !report.changed() {
            info!(
                "event=sync_cycle module=sync status=ok source={} changed=false remote_count={} duration_ms={}",
                source_id,
                snapshot.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(SyncOutcome::Unchanged);
        }

        store.persist()?;
        info!(
            "event=sync_cycle module=sync status=ok source={} changed=true added={} updated={} removed={} duration_ms={}",
            source_id,
            report.added,
            report.updated,
            report.removed,
            started_at.elapsed().as_millis()
        );
        Ok(SyncOutcome::Changed(report))
    }

    /// Appends one local quote to the remote, then runs a cycle.
    ///
    /// With a remote that does not retain appended records the follow-up
    /// cycle removes the quote locally again (server wins).
    pub fn push_quote<R: KvRepository>(
        &self,
        store: &mut QuoteStore<R>,
        id: &QuoteId,
    ) -> Result<SyncOutcome, SyncError> {
        let quote = store
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownQuote(id.clone()))?;
        self.append_one(&quote)?;
        self.run_cycle(store)
    }

    /// Sends each quote in `ids` to the remote without syncing afterwards.
    ///
    /// A failure affects only its own quote; the rest are still sent.
    pub fn append_quotes<R: KvRepository>(
        &self,
        store: &QuoteStore<R>,
        ids: &[QuoteId],
    ) -> PushReport {
        let mut report = PushReport::default();
        for id in ids {
            let result = match store.get(id) {
                Some(quote) => self.append_one(quote).map_err(SyncError::from),
                None => Err(SyncError::UnknownQuote(id.clone())),
            };
            match result {
                Ok(()) => report.pushed.push(id.clone()),
                Err(err) => report.failed.push((id.clone(), err)),
            }
        }
        info!(
            "event=sync_push_batch module=sync status=ok source={} pushed={} failed={}",
            self.remote.source_id(),
            report.pushed.len(),
            report.failed.len()
        );
        report
    }

    fn append_one(&self, quote: &Quote) -> Result<(), RemoteError> {
        if let Err(err) = self.remote.append(quote) {
            error!(
                "event=sync_push module=sync status=error source={} error_code={} retryable={}",
                self.remote.source_id(),
                err.code,
                err.retryable
            );
            return Err(err);
        }
        info!(
            "event=sync_push module=sync status=ok source={}",
            self.remote.source_id()
        );
        Ok(())
    }
}
