use quotebox_core::db::{open_db, open_db_in_memory};
use quotebox_core::repo::QUOTES_KEY;
use quotebox_core::{
    parse_import, CategoryFilter, DedupStrategy, KvRepository, LoadSource, MemoryKvRepository,
    QuoteId, QuoteStore, QuoteValidationError, SqliteKvRepository, StoreError,
};
use std::collections::HashSet;

fn seeded_repo(json: &str) -> MemoryKvRepository {
    let repo = MemoryKvRepository::new();
    repo.seed(QUOTES_KEY, json);
    repo
}

#[test]
fn load_seeds_defaults_when_nothing_is_stored() {
    let repo = MemoryKvRepository::new();
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.load_source(), LoadSource::SeededMissing);
    assert_eq!(store.len(), 9);
    assert!(!store.is_dirty());
    assert_eq!(repo.write_count(), 1);
    assert!(repo.get(QUOTES_KEY).unwrap().is_some());
}

#[test]
fn load_seeds_defaults_when_stored_value_is_corrupt() {
    let repo = seeded_repo("{not json");
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.load_source(), LoadSource::SeededUnreadable);
    assert_eq!(store.len(), 9);
    assert_eq!(repo.write_count(), 1);
}

#[test]
fn load_keeps_stored_collection_without_writing() {
    let repo = seeded_repo(r#"[{"id":"1","text":"A","author":"Ada","category":"X"}]"#);
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.load_source(), LoadSource::Stored);
    assert_eq!(store.len(), 1);
    assert_eq!(store.quotes()[0].author, "Ada");
    assert_eq!(repo.write_count(), 0);
}

#[test]
fn load_assigns_missing_ids_and_writes_back() {
    let repo = seeded_repo(r#"[{"text":"A","category":"X"},{"id":"2","text":"B","category":"Y"}]"#);
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.len(), 2);
    assert!(!store.quotes()[0].id.as_str().is_empty());
    assert_eq!(store.quotes()[0].author, "Unknown");
    assert_eq!(repo.write_count(), 1);

    let stored = parse_import(&repo.get(QUOTES_KEY).unwrap().unwrap()).unwrap();
    assert!(stored.iter().all(|draft| !draft.needs_id()));
}

#[test]
fn load_seeds_defaults_when_storage_read_fails() {
    let repo = seeded_repo(r#"[{"id":"1","text":"A","category":"X"}]"#);
    repo.set_reject_reads(true);
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.load_source(), LoadSource::SeededUnreadable);
    assert_eq!(store.len(), 9);
    assert!(!store.is_dirty());
    assert_eq!(repo.write_count(), 1);
}

#[test]
fn load_survives_rejected_seed_write() {
    let repo = MemoryKvRepository::new();
    repo.set_reject_writes(true);
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.len(), 9);
    assert!(store.is_dirty());
}

#[test]
fn add_appends_one_retrievable_record() {
    let repo = seeded_repo("[]");
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);

    let id = store.add("  Keep going.  ", " Grit ", None).unwrap();
    assert_eq!(store.len(), 1);
    let added = store.get(&id).expect("added quote is retrievable");
    assert_eq!(added.text, "Keep going.");
    assert_eq!(added.category, "Grit");
    assert_eq!(added.author, "User");
    assert_eq!(repo.write_count(), 1);

    let second = store.add("Another", "Grit", Some("Ada")).unwrap();
    assert_ne!(id, second);
    assert_eq!(store.len(), 2);
}

#[test]
fn add_rejects_empty_fields_without_touching_the_store() {
    let repo = seeded_repo("[]");
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);

    let err = store.add("   ", "Grit", None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(QuoteValidationError::EmptyText)
    ));
    let err = store.add("text", "", None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(QuoteValidationError::EmptyCategory)
    ));

    assert!(store.is_empty());
    assert_eq!(repo.write_count(), 0);
}

#[test]
fn add_keeps_record_in_memory_when_storage_rejects_write() {
    let repo = seeded_repo("[]");
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);
    repo.set_reject_writes(true);

    let err = store.add("A", "X", None).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(store.len(), 1);
    assert!(store.is_dirty());

    repo.set_reject_writes(false);
    store.persist().unwrap();
    assert!(!store.is_dirty());
}

#[test]
fn import_by_id_skips_known_ids_and_assigns_missing_ones() {
    let repo = seeded_repo(r#"[{"id":"1","text":"A","category":"X"}]"#);
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);

    let drafts = parse_import(
        r#"[
            {"id":"1","text":"A changed","category":"X"},
            {"text":"A","category":"X"},
            {"id":"3","text":"C","category":"Z"},
            {"id":"3","text":"C again","category":"Z"}
        ]"#,
    )
    .unwrap();
    let report = store.import_batch(drafts).unwrap();

    assert_eq!(report.added.len(), 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(&QuoteId::from("1")).unwrap().text, "A");
    assert_eq!(repo.write_count(), 1);
}

#[test]
fn import_by_text_category_ignores_ids_for_duplicates() {
    let repo = seeded_repo(r#"[{"id":"1","text":"A","category":"X"}]"#);
    let mut store = QuoteStore::load(&repo, DedupStrategy::TextCategory);

    let drafts = parse_import(
        r#"[{"id":"99","text":"A","category":"X"},{"id":"7","text":"B","category":"X"}]"#,
    )
    .unwrap();
    let report = store.import_batch(drafts).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.added, vec![QuoteId::from("7")]);
    assert_eq!(report.rekeyed, 0);
    assert_eq!(store.len(), 2);
}

#[test]
fn import_by_text_category_rekeys_taken_ids() {
    let repo = seeded_repo(r#"[{"id":"1","text":"A","category":"X"}]"#);
    let mut store = QuoteStore::load(&repo, DedupStrategy::TextCategory);

    let drafts = parse_import(
        r#"[{"id":"1","text":"B","category":"X"},{"id":"1","text":"C","category":"X"}]"#,
    )
    .unwrap();
    let report = store.import_batch(drafts).unwrap();

    assert_eq!(report.added.len(), 2);
    assert_eq!(report.rekeyed, 2);
    assert!(!report.added.contains(&QuoteId::from("1")));
    assert_ne!(report.added[0], report.added[1]);
    assert_eq!(store.get(&QuoteId::from("1")).unwrap().text, "A");

    let ids: HashSet<&QuoteId> = store.quotes().iter().map(|quote| &quote.id).collect();
    assert_eq!(ids.len(), store.len());
}

#[test]
fn load_rekeys_duplicate_stored_ids_and_writes_back() {
    let repo = seeded_repo(
        r#"[{"id":"1","text":"A","category":"X"},{"id":"1","text":"B","category":"X"}]"#,
    );
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.load_source(), LoadSource::Stored);
    assert_eq!(store.len(), 2);
    assert_eq!(store.quotes()[0].id, QuoteId::from("1"));
    assert_ne!(store.quotes()[1].id, QuoteId::from("1"));
    assert_eq!(store.quotes()[1].text, "B");
    assert_eq!(repo.write_count(), 1);
}

#[test]
fn importing_only_duplicates_adds_nothing_and_skips_all() {
    let repo = seeded_repo(
        r#"[{"id":"1","text":"A","category":"X"},{"id":"2","text":"B","category":"Y"}]"#,
    );
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);
    let drafts = parse_import(&repo.get(QUOTES_KEY).unwrap().unwrap()).unwrap();

    let report = store.import_batch(drafts).unwrap();
    assert!(report.added.is_empty());
    assert_eq!(report.skipped, 2);
    assert_eq!(store.len(), 2);
    assert_eq!(repo.write_count(), 0);
}

#[test]
fn import_rejects_whole_batch_with_blank_text() {
    let repo = seeded_repo("[]");
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);
    let drafts = parse_import(r#"[{"text":"A","category":"X"},{"text":" ","category":"X"}]"#)
        .unwrap();

    let err = store.import_batch(drafts).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.is_empty());
}

#[test]
fn filter_and_categories_follow_collection_order() {
    let repo = seeded_repo(
        r#"[
            {"id":"1","text":"A","category":"X"},
            {"id":"2","text":"B","category":"Y"},
            {"id":"3","text":"C","category":"X"}
        ]"#,
    );
    let store = QuoteStore::load(&repo, DedupStrategy::Id);

    assert_eq!(store.categories(), vec!["X", "Y"]);
    let ids: Vec<&str> = store
        .filter_by_category(&CategoryFilter::Category("X".to_string()))
        .iter()
        .map(|quote| quote.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(store.filter_by_category(&CategoryFilter::All).len(), 3);
    assert!(store
        .filter_by_category(&CategoryFilter::Category("Nope".to_string()))
        .is_empty());
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotebox.db");

    let id = {
        let conn = open_db(&path).unwrap();
        let mut store = QuoteStore::load(SqliteKvRepository::new(&conn), DedupStrategy::Id);
        assert_eq!(store.load_source(), LoadSource::SeededMissing);
        store.add("Persist me", "Durability", None).unwrap()
    };

    let conn = open_db(&path).unwrap();
    let store = QuoteStore::load(SqliteKvRepository::new(&conn), DedupStrategy::Id);
    assert_eq!(store.load_source(), LoadSource::Stored);
    assert_eq!(store.len(), 10);
    assert_eq!(store.get(&id).unwrap().text, "Persist me");
}

#[test]
fn sqlite_repo_shares_connection_between_store_and_preferences() {
    let conn = open_db_in_memory().unwrap();
    let prefs = SqliteKvRepository::new(&conn);
    let store = QuoteStore::load(SqliteKvRepository::new(&conn), DedupStrategy::Id);

    prefs.set("lastCategoryFilter", "Life").unwrap();
    assert_eq!(store.len(), 9);
    assert_eq!(
        prefs.get("lastCategoryFilter").unwrap().as_deref(),
        Some("Life")
    );
    assert!(prefs.get(QUOTES_KEY).unwrap().is_some());
}
