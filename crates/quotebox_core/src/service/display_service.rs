//! Quote selection for display plus filter and last-viewed bookkeeping.
//!
//! # Responsibility
//! - Pick the quote to show for a category filter.
//! - Remember the last selected filter (durable) and the last displayed
//!   quote (session-scoped).
//!
//! # Invariants
//! - Preference reads and writes never fail the caller; problems are logged.
//! - A restored filter always names `all` or a category present right now.

use crate::model::quote::Quote;
use crate::repo::kv_repo::KvRepository;
use crate::repo::{LAST_CATEGORY_FILTER_KEY, LAST_VIEWED_QUOTE_KEY};
use crate::store::quote_store::{pick_random, CategoryFilter, QuoteStore};
use log::warn;
use rand::Rng;

/// What to show after a selection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteView {
    Quote(Quote),
    /// The collection is empty.
    NoQuote,
}

impl QuoteView {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Self::Quote(quote) => Some(quote),
            Self::NoQuote => None,
        }
    }
}

/// Display bookkeeping over a durable and a session repository.
pub struct DisplayService<P: KvRepository, S: KvRepository> {
    prefs: P,
    session: S,
}

impl<P: KvRepository, S: KvRepository> DisplayService<P, S> {
    pub fn new(prefs: P, session: S) -> Self {
        Self { prefs, session }
    }

    /// Restores the saved filter if it is still meaningful.
    ///
    /// Falls back to `All` when nothing is saved, the read fails, or the
    /// saved category no longer exists in `categories`.
    pub fn restore_filter(&self, categories: &[&str]) -> CategoryFilter {
        let saved = match self.prefs.get(LAST_CATEGORY_FILTER_KEY) {
            Ok(saved) => saved,
            Err(err) => {
                warn!(
                    "event=filter_restore module=service status=warn error_code=storage_read_failed error={}",
                    err
                );
                None
            }
        };

        match saved.map(|value| CategoryFilter::parse(&value)) {
            Some(filter) if is_known(&filter, categories) => filter,
            _ => CategoryFilter::All,
        }
    }

    /// Saves `filter` when it names `all` or one of `categories`.
    ///
    /// Returns whether it was known; unknown filters are left unsaved.
    pub fn choose_filter(&self, filter: &CategoryFilter, categories: &[&str]) -> bool {
        if !is_known(filter, categories) {
            return false;
        }
        self.save_filter(filter);
        true
    }

    fn save_filter(&self, filter: &CategoryFilter) {
        if let Err(err) = self.prefs.set(LAST_CATEGORY_FILTER_KEY, filter.as_str()) {
            warn!(
                "event=filter_save module=service status=warn error_code=storage_write_failed error={}",
                err
            );
        }
    }

    /// Picks a random quote for `filter` and records it as last viewed.
    ///
    /// An empty filtered subset falls back to the whole collection.
    pub fn next_quote<R, G>(
        &self,
        store: &QuoteStore<R>,
        filter: &CategoryFilter,
        rng: &mut G,
    ) -> QuoteView
    where
        R: KvRepository,
        G: Rng + ?Sized,
    {
        let subset = store.filter_by_category(filter);
        let picked = if subset.is_empty() {
            pick_random(store.quotes(), rng)
        } else {
            pick_random(subset.as_slice(), rng).copied()
        };

        match picked {
            Some(quote) => {
                self.remember_viewed(quote);
                QuoteView::Quote(quote.clone())
            }
            None => QuoteView::NoQuote,
        }
    }

    /// Last displayed quote of this session, if readable.
    pub fn last_viewed(&self) -> Option<Quote> {
        let raw = self.session.get(LAST_VIEWED_QUOTE_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(quote) => Some(quote),
            Err(err) => {
                warn!(
                    "event=last_viewed_load module=service status=warn error_code=session_value_unreadable error={}",
                    err
                );
                None
            }
        }
    }

    fn remember_viewed(&self, quote: &Quote) {
        let result = serde_json::to_string(quote)
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.session
                    .set(LAST_VIEWED_QUOTE_KEY, &json)
                    .map_err(|err| err.to_string())
            });
        if let Err(err) = result {
            warn!(
                "event=last_viewed_save module=service status=warn error_code=session_write_failed error={}",
                err
            );
        }
    }
}

fn is_known(filter: &CategoryFilter, categories: &[&str]) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::Category(name) => categories.contains(&name.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayService, QuoteView};
    use crate::repo::kv_repo::{KvRepository, MemoryKvRepository};
    use crate::repo::{LAST_CATEGORY_FILTER_KEY, LAST_VIEWED_QUOTE_KEY, QUOTES_KEY};
    use crate::store::dedup::DedupStrategy;
    use crate::store::quote_store::{CategoryFilter, QuoteStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store_with<'a>(
        repo: &'a MemoryKvRepository,
        json: &str,
    ) -> QuoteStore<&'a MemoryKvRepository> {
        repo.seed(QUOTES_KEY, json);
        QuoteStore::load(repo, DedupStrategy::Id)
    }

    #[test]
    fn restore_filter_drops_vanished_category() {
        let prefs = MemoryKvRepository::new();
        let session = MemoryKvRepository::new();
        let service = DisplayService::new(&prefs, &session);

        assert_eq!(service.restore_filter(&["Life"]), CategoryFilter::All);

        prefs.seed(LAST_CATEGORY_FILTER_KEY, "Life");
        assert_eq!(
            service.restore_filter(&["Life", "Dreams"]),
            CategoryFilter::Category("Life".to_string())
        );
        assert_eq!(service.restore_filter(&["Dreams"]), CategoryFilter::All);
    }

    #[test]
    fn choose_filter_saves_only_known_filters() {
        let prefs = MemoryKvRepository::new();
        let session = MemoryKvRepository::new();
        let service = DisplayService::new(&prefs, &session);
        prefs.seed(LAST_CATEGORY_FILTER_KEY, "Life");

        let unknown = CategoryFilter::Category("Nope".to_string());
        assert!(!service.choose_filter(&unknown, &["Life"]));
        assert_eq!(
            prefs.get(LAST_CATEGORY_FILTER_KEY).unwrap().as_deref(),
            Some("Life")
        );
        assert_eq!(prefs.write_count(), 0);

        assert!(service.choose_filter(&CategoryFilter::All, &["Life"]));
        assert_eq!(
            prefs.get(LAST_CATEGORY_FILTER_KEY).unwrap().as_deref(),
            Some("all")
        );
        assert!(service.choose_filter(&CategoryFilter::Category("Life".into()), &["Life"]));
        assert_eq!(prefs.write_count(), 2);
    }

    #[test]
    fn next_quote_respects_filter_and_records_last_viewed() {
        let durable = MemoryKvRepository::new();
        let store = store_with(
            &durable,
            r#"[{"id":"1","text":"A","category":"X"},{"id":"2","text":"B","category":"Y"}]"#,
        );
        let prefs = MemoryKvRepository::new();
        let session = MemoryKvRepository::new();
        let service = DisplayService::new(&prefs, &session);
        let mut rng = StdRng::seed_from_u64(1);

        let filter = CategoryFilter::Category("Y".to_string());
        for _ in 0..10 {
            let view = service.next_quote(&store, &filter, &mut rng);
            assert_eq!(view.quote().map(|q| q.id.as_str()), Some("2"));
        }
        assert_eq!(
            service.last_viewed().map(|q| q.text),
            Some("B".to_string())
        );
    }

    #[test]
    fn empty_filter_result_falls_back_to_whole_collection() {
        let durable = MemoryKvRepository::new();
        let store = store_with(&durable, r#"[{"id":"1","text":"A","category":"X"}]"#);
        let prefs = MemoryKvRepository::new();
        let session = MemoryKvRepository::new();
        let service = DisplayService::new(&prefs, &session);
        let mut rng = StdRng::seed_from_u64(3);

        let view = service.next_quote(
            &store,
            &CategoryFilter::Category("Missing".to_string()),
            &mut rng,
        );
        assert_eq!(view.quote().map(|q| q.id.as_str()), Some("1"));
    }

    #[test]
    fn empty_collection_yields_no_quote() {
        let durable = MemoryKvRepository::new();
        let store = store_with(&durable, "[]");
        let prefs = MemoryKvRepository::new();
        let session = MemoryKvRepository::new();
        let service = DisplayService::new(&prefs, &session);
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            service.next_quote(&store, &CategoryFilter::All, &mut rng),
            QuoteView::NoQuote
        );
        assert!(service.last_viewed().is_none());
    }

    #[test]
    fn write_failures_are_swallowed() {
        let durable = MemoryKvRepository::new();
        let store = store_with(&durable, r#"[{"id":"1","text":"A","category":"X"}]"#);
        let prefs = MemoryKvRepository::new();
        let session = MemoryKvRepository::new();
        prefs.set_reject_writes(true);
        session.set_reject_writes(true);
        let service = DisplayService::new(&prefs, &session);
        let mut rng = StdRng::seed_from_u64(9);

        service.save_filter(&CategoryFilter::All);
        let view = service.next_quote(&store, &CategoryFilter::All, &mut rng);
        assert!(view.quote().is_some());
        assert!(prefs.get(LAST_CATEGORY_FILTER_KEY).unwrap().is_none());
        assert!(session.get(LAST_VIEWED_QUOTE_KEY).unwrap().is_none());
    }
}
