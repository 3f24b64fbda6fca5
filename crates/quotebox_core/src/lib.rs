//! Core domain logic for QuoteBox.
//! This crate owns the quote collection, its storage and its sync rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;

pub use config::{ConfigError, QuoteBoxConfig};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::quote::{Quote, QuoteDraft, QuoteId, QuoteValidationError};
pub use repo::kv_repo::{
    KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use service::display_service::{DisplayService, QuoteView};
pub use store::dedup::DedupStrategy;
pub use store::quote_store::{
    pick_random, CategoryFilter, ImportReport, LoadSource, QuoteStore, StoreError, StoreResult,
};
pub use store::transfer::{export_json, export_to_path, import_from_path, parse_import, TransferError};
pub use sync::jsonplaceholder::JsonPlaceholderRemote;
pub use sync::merge::{merge_snapshot, MergeReport};
pub use sync::merger::{PushReport, SyncError, SyncMerger, SyncOutcome};
pub use sync::mock_remote::MockRemote;
pub use sync::provider_registry::{ProviderRegistry, ProviderRegistryError};
pub use sync::remote::{RemoteError, RemoteQuoteSource, RemoteResult, SyncStage};
pub use sync::schedule::SyncSchedule;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
