//! Quote store over a key/value repository.
//!
//! # Responsibility
//! - Load (or seed) the collection from the `quotes` key.
//! - Provide add/import/filter/random-pick operations.
//! - Write the full collection back after every mutation.
//!
//! # Invariants
//! - `load` never fails; it always leaves a valid collection.
//! - Record order is insertion order; merges keep surviving positions.
//! - Ids are unique within the collection and never rewritten once
//!   assigned. Incoming records with a taken id get a fresh one.

use crate::model::quote::{Quote, QuoteDraft, QuoteId, QuoteValidationError};
use crate::repo::kv_repo::{KvRepository, RepoError};
use crate::repo::QUOTES_KEY;
use crate::store::dedup::DedupStrategy;
use crate::store::defaults::default_quotes;
use crate::store::transfer::parse_import;
use log::{error, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected; collection untouched.
    Validation(QuoteValidationError),
    /// Write failed; collection keeps the in-memory state.
    Storage(RepoError),
    /// Collection could not be encoded for storage.
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "failed to persist quotes: {err}"),
            Self::Serialize(err) => write!(f, "failed to encode quotes: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for StoreError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Where the collection came from at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from durable storage.
    Stored,
    /// No stored collection; defaults seeded.
    SeededMissing,
    /// Stored collection unreadable or malformed; defaults seeded.
    SeededUnreadable,
}

/// Category selection for filtered views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Category(String),
}

impl CategoryFilter {
    /// Stored/wire value for the "all categories" selection.
    pub const ALL: &'static str = "all";

    /// Parses a stored or user-entered value; `all` (any case) or blank
    /// selects everything.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::ALL) {
            Self::All
        } else {
            Self::Category(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Category(name) => name,
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => quote.category == *name,
        }
    }
}

/// Outcome of a batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids of appended records, in input order.
    pub added: Vec<QuoteId>,
    /// Records dropped as duplicates.
    pub skipped: usize,
    /// Added records that arrived with an id already in use.
    pub rekeyed: usize,
}

/// Ordered quote collection mirrored to a key/value repository.
pub struct QuoteStore<R: KvRepository> {
    repo: R,
    quotes: Vec<Quote>,
    dedup: DedupStrategy,
    load_source: LoadSource,
    dirty: bool,
}

impl<R: KvRepository> QuoteStore<R> {
    /// Loads the collection from `repo`, seeding defaults when needed.
    ///
    /// # Contract
    /// - Never fails. Unreadable data falls back to the default set.
    /// - Seeded defaults and records that needed an id are written back.
    pub fn load(repo: R, dedup: DedupStrategy) -> Self {
        let (quotes, load_source, needs_write) = match repo.get(QUOTES_KEY) {
            Ok(Some(raw)) => match decode_stored(&raw) {
                Ok((quotes, repaired)) => (quotes, LoadSource::Stored, repaired),
                Err(err) => {
                    warn!(
                        "event=store_load module=store status=warn error_code=stored_quotes_unreadable error={}",
                        err
                    );
                    (default_quotes(), LoadSource::SeededUnreadable, true)
                }
            },
            Ok(None) => (default_quotes(), LoadSource::SeededMissing, true),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=warn error_code=storage_read_failed error={}",
                    err
                );
                (default_quotes(), LoadSource::SeededUnreadable, true)
            }
        };

        let mut store = Self {
            repo,
            quotes,
            dedup,
            load_source,
            dirty: needs_write,
        };
        if needs_write {
            // Failure is logged and leaves the store dirty.
            let _ = store.persist();
        }
        info!(
            "event=store_load module=store status=ok source={:?} count={}",
            store.load_source,
            store.quotes.len()
        );
        store
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Whether the in-memory collection has changes not yet written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, id: &QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.id == *id)
    }

    /// Adds one quote with a fresh id.
    ///
    /// # Errors
    /// - `Validation` when trimmed `text` or `category` is empty; nothing
    ///   changes.
    /// - `Storage`/`Serialize` when the write fails; the quote stays in
    ///   memory and the store is dirty.
    pub fn add(
        &mut self,
        text: &str,
        category: &str,
        author: Option<&str>,
    ) -> StoreResult<QuoteId> {
        let quote = Quote::new(text, category, author)?;
        let id = quote.id.clone();
        self.quotes.push(quote);
        info!(
            "event=quote_add module=store status=ok count={}",
            self.quotes.len()
        );
        self.persist()?;
        Ok(id)
    }

    /// Imports a validated batch, skipping duplicates under the active
    /// dedup strategy.
    ///
    /// # Contract
    /// - Any invalid draft rejects the whole batch before anything changes.
    /// - Drafts without id receive a fresh one.
    /// - Duplicates of existing records, or of earlier records in the same
    ///   batch, are dropped and counted.
    /// - A kept record whose id is already taken (possible when duplicates
    ///   are judged by text and category) is re-keyed with a fresh id.
    pub fn import_batch(&mut self, drafts: Vec<QuoteDraft>) -> StoreResult<ImportReport> {
        let incoming = drafts
            .into_iter()
            .map(QuoteDraft::into_quote)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = self
            .quotes
            .iter()
            .map(|quote| self.dedup.key(quote))
            .collect::<HashSet<_>>();
        let mut taken_ids = self
            .quotes
            .iter()
            .map(|quote| quote.id.clone())
            .collect::<HashSet<_>>();
        let mut report = ImportReport::default();

        for mut quote in incoming {
            if seen.insert(self.dedup.key(&quote)) {
                if !taken_ids.insert(quote.id.clone()) {
                    quote.id = fresh_id(&taken_ids);
                    taken_ids.insert(quote.id.clone());
                    report.rekeyed += 1;
                }
                report.added.push(quote.id.clone());
                self.quotes.push(quote);
            } else {
                report.skipped += 1;
            }
        }

        info!(
            "event=quote_import module=store status=ok added={} skipped={} rekeyed={} dedup={}",
            report.added.len(),
            report.skipped,
            report.rekeyed,
            self.dedup
        );
        if !report.added.is_empty() {
            self.persist()?;
        }
        Ok(report)
    }

    /// Returns quotes matching `filter`, in collection order.
    pub fn filter_by_category(&self, filter: &CategoryFilter) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|quote| filter.matches(quote))
            .collect()
    }

    /// Unique non-empty categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.quotes
            .iter()
            .map(|quote| quote.category.as_str())
            .filter(|category| !category.is_empty() && seen.insert(*category))
            .collect()
    }

    /// Writes the full collection to durable storage.
    pub fn persist(&mut self) -> StoreResult<()> {
        let result = serde_json::to_string(&self.quotes)
            .map_err(StoreError::from)
            .and_then(|json| self.repo.set(QUOTES_KEY, &json).map_err(StoreError::from));

        match result {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                error!(
                    "event=store_persist module=store status=error count={} error={}",
                    self.quotes.len(),
                    err
                );
                Err(err)
            }
        }
    }

    pub(crate) fn quotes_mut(&mut self) -> &mut Vec<Quote> {
        &mut self.quotes
    }
}

/// Picks one element uniformly at random; `None` for an empty slice.
pub fn pick_random<'a, T, G: Rng + ?Sized>(items: &'a [T], rng: &mut G) -> Option<&'a T> {
    items.choose(rng)
}

fn fresh_id(taken: &HashSet<QuoteId>) -> QuoteId {
    loop {
        let id = QuoteId::generate();
        if !taken.contains(&id) {
            return id;
        }
    }
}

fn decode_stored(raw: &str) -> Result<(Vec<Quote>, bool), String> {
    let drafts = parse_import(raw).map_err(|err| err.to_string())?;
    let mut repaired = false;
    let mut quotes = Vec::with_capacity(drafts.len());
    let mut taken_ids = HashSet::with_capacity(drafts.len());

    for draft in drafts {
        repaired |= draft.needs_id();
        match draft.into_quote() {
            Ok(mut quote) => {
                if !taken_ids.insert(quote.id.clone()) {
                    quote.id = fresh_id(&taken_ids);
                    taken_ids.insert(quote.id.clone());
                    repaired = true;
                    warn!(
                        "event=store_load module=store status=warn error_code=duplicate_id_rekeyed"
                    );
                }
                quotes.push(quote);
            }
            Err(err) => {
                repaired = true;
                warn!(
                    "event=store_load module=store status=warn error_code=stored_quote_dropped error={}",
                    err
                );
            }
        }
    }

    Ok((quotes, repaired))
}
