use quotebox_core::repo::QUOTES_KEY;
use quotebox_core::{
    export_to_path, import_from_path, DedupStrategy, MemoryKvRepository, QuoteStore, TransferError,
};

#[test]
fn export_then_import_reproduces_collection_by_id() {
    let source_repo = MemoryKvRepository::new();
    let mut source = QuoteStore::load(&source_repo, DedupStrategy::Id);
    source.add("Exported", "Transfer", Some("Ada")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotes.json");
    export_to_path(source.quotes(), &path).unwrap();

    let target_repo = MemoryKvRepository::new();
    target_repo.seed(QUOTES_KEY, "[]");
    let mut target = QuoteStore::load(&target_repo, DedupStrategy::Id);
    let report = target.import_batch(import_from_path(&path).unwrap()).unwrap();

    assert_eq!(report.added.len(), source.len());
    assert_eq!(report.skipped, 0);
    assert_eq!(target.quotes(), source.quotes());

    // A second import of the same file is entirely duplicate.
    let again = target.import_batch(import_from_path(&path).unwrap()).unwrap();
    assert!(again.added.is_empty());
    assert_eq!(again.skipped, source.len());
}

#[test]
fn extra_fields_in_import_file_do_not_reappear_on_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("with-timestamps.json");
    std::fs::write(
        &input,
        r#"[{"id":"a1","text":"A","author":"Ada","category":"X","createdAt":1700000000000,"updatedAt":"2024-01-01"}]"#,
    )
    .unwrap();

    let repo = MemoryKvRepository::new();
    repo.seed(QUOTES_KEY, "[]");
    let mut store = QuoteStore::load(&repo, DedupStrategy::Id);
    store.import_batch(import_from_path(&input).unwrap()).unwrap();

    let output = dir.path().join("quotes.json");
    export_to_path(store.quotes(), &output).unwrap();
    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();

    let record = &exported[0];
    assert_eq!(record["id"], "a1");
    assert!(record.get("createdAt").is_none());
    assert!(record.get("updatedAt").is_none());
}

#[test]
fn malformed_file_is_rejected_and_store_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"[{"text":"A"}]"#).unwrap();

    let repo = MemoryKvRepository::new();
    let store = QuoteStore::load(&repo, DedupStrategy::Id);
    let before = store.len();

    let err = import_from_path(&path).unwrap_err();
    assert!(matches!(err, TransferError::InvalidFormat(_)));
    assert_eq!(store.len(), before);
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = import_from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, TransferError::Io(_)));
}
