//! Command-line host for the quote collection.
//!
//! # Responsibility
//! - Wire `quotebox_core` to a SQLite file, a remote provider and stdout.
//! - Report every outcome as a one-line notification.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::warn;
use quotebox_core::db::open_db;
use quotebox_core::store::transfer::EXPORT_FILE_NAME;
use quotebox_core::{
    export_to_path, import_from_path, init_logging, CategoryFilter, DedupStrategy,
    DisplayService, JsonPlaceholderRemote, KvRepository, MemoryKvRepository, MockRemote,
    ProviderRegistry, Quote, QuoteBoxConfig, QuoteId, QuoteStore, QuoteView, SqliteKvRepository,
    SyncMerger, SyncOutcome, SyncSchedule,
};
use std::fmt::{Display, Formatter};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "quotebox", version, about = "Quote of the day, stored locally and synced")]
struct Cli {
    /// SQLite database file (defaults to the configured data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/quotebox/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Remote provider: jsonplaceholder | mock
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Duplicate detection for imports: id | text_category
    #[arg(long, global = true)]
    dedup: Option<DedupStrategy>,

    /// Log level: trace | debug | info | warn | error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a random quote, optionally from one category ("all" for every)
    Show {
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a quote and send it to the remote
    Add {
        text: String,
        category: String,
        #[arg(long)]
        author: Option<String>,
        /// Keep the quote local; do not send it
        #[arg(long)]
        offline: bool,
    },
    /// List quotes
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// List categories
    Categories,
    /// Import quotes from a JSON file and send the new ones to the remote
    Import {
        file: PathBuf,
        /// Keep imported quotes local; do not send them
        #[arg(long)]
        offline: bool,
    },
    /// Export all quotes to a JSON file
    Export { file: Option<PathBuf> },
    /// Run one sync cycle against the remote
    Sync,
    /// Sync periodically
    Watch {
        /// Seconds between cycles (overrides config)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Send one local quote to the remote, then sync
    Push { id: String },
}

#[derive(Debug, Clone, Copy)]
enum NoticeKind {
    Info,
    Success,
    Error,
}

impl Display for NoticeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

fn notify(kind: NoticeKind, message: impl Display) {
    match kind {
        NoticeKind::Error => eprintln!("[{kind}] {message}"),
        _ => println!("[{kind}] {message}"),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        notify(NoticeKind::Error, format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = QuoteBoxConfig::load_or_default(cli.config.as_deref());
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(dedup) = cli.dedup {
        config.dedup = dedup;
    }
    if let Some(level) = cli.log_level {
        config.log_level = Some(level);
    }
    config.validate().context("invalid configuration")?;

    start_logging(&config);

    let db_path = cli.db.unwrap_or_else(|| config.db_path());
    let conn = open_db(&db_path)
        .with_context(|| format!("cannot open database `{}`", db_path.display()))?;
    let mut store = QuoteStore::load(SqliteKvRepository::new(&conn), config.dedup);
    let session = MemoryKvRepository::new();
    let display = DisplayService::new(SqliteKvRepository::new(&conn), &session);

    match cli.command {
        Command::Show { category } => {
            let filter = match category {
                Some(value) => {
                    let filter = CategoryFilter::parse(&value);
                    if !display.choose_filter(&filter, &store.categories()) {
                        notify(
                            NoticeKind::Info,
                            format!(
                                "Unknown category '{}'; showing a quote from all categories.",
                                filter.as_str()
                            ),
                        );
                    }
                    filter
                }
                None => display.restore_filter(&store.categories()),
            };
            show_next(&display, &store, &filter);
        }
        Command::Add {
            text,
            category,
            author,
            offline,
        } => {
            let id = store.add(&text, &category, author.as_deref())?;
            notify(NoticeKind::Success, format!("Quote added locally with id {id}."));
            if !offline {
                send_new_quotes(&config, &mut store, &[id]);
            }
        }
        Command::List { category } => {
            let filter = category
                .as_deref()
                .map_or(CategoryFilter::All, CategoryFilter::parse);
            for quote in store.filter_by_category(&filter) {
                println!(
                    "{}\t{}\t\"{}\" - {}",
                    quote.id,
                    quote.category,
                    quote.text,
                    quote.attribution()
                );
            }
        }
        Command::Categories => {
            for category in store.categories() {
                println!("{category}");
            }
        }
        Command::Import { file, offline } => {
            let drafts = import_from_path(&file)
                .with_context(|| format!("cannot import `{}`", file.display()))?;
            let report = store.import_batch(drafts)?;
            if report.added.is_empty() {
                notify(
                    NoticeKind::Info,
                    format!("Skipped all {} quotes as they were duplicates.", report.skipped),
                );
            } else {
                notify(
                    NoticeKind::Success,
                    format!(
                        "Imported {} quotes. Skipped {} duplicates.",
                        report.added.len(),
                        report.skipped
                    ),
                );
                if !offline {
                    send_new_quotes(&config, &mut store, &report.added);
                }
            }
        }
        Command::Export { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            export_to_path(store.quotes(), &path)
                .with_context(|| format!("cannot export to `{}`", path.display()))?;
            notify(
                NoticeKind::Success,
                format!("Quotes exported successfully to {}.", path.display()),
            );
        }
        Command::Sync => {
            let merger = build_merger(&config, store.quotes())?;
            notify(
                NoticeKind::Info,
                format!("Syncing with {}...", merger.source_id()),
            );
            let outcome = merger.run_cycle(&mut store)?;
            report_outcome(outcome);
        }
        Command::Watch { interval, cycles } => {
            let merger = build_merger(&config, store.quotes())?;
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sync_interval());
            let schedule = SyncSchedule::new(interval);
            notify(
                NoticeKind::Info,
                format!(
                    "Syncing with {} every {}s.",
                    merger.source_id(),
                    schedule.interval().as_secs()
                ),
            );
            let filter = display.restore_filter(&store.categories());
            show_next(&display, &store, &filter);
            schedule.run_blocking(cycles, |_| {
                match merger.run_cycle(&mut store) {
                    Ok(outcome) => {
                        let changed = outcome.is_changed();
                        report_outcome(outcome);
                        if changed {
                            show_last_viewed(&display);
                            let filter = display.restore_filter(&store.categories());
                            show_next(&display, &store, &filter);
                        }
                    }
                    Err(err) => notify(NoticeKind::Error, format!("Sync failed: {err}")),
                }
                ControlFlow::Continue(())
            });
        }
        Command::Push { id } => {
            let merger = build_merger(&config, store.quotes())?;
            let outcome = merger.push_quote(&mut store, &QuoteId::from(id))?;
            notify(NoticeKind::Success, "Quote sent to server.");
            report_outcome(outcome);
        }
    }

    if store.is_dirty() {
        bail!("quotes could not be saved; changes are kept only for this run");
    }
    Ok(())
}

fn start_logging(config: &QuoteBoxConfig) {
    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| quotebox_core::default_log_level().to_string());
    let log_dir = absolute(&config.log_dir());
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("logging disabled: {err}");
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Registers every known provider and binds a merger to the configured one.
///
/// The mock remote starts as a mirror of the local collection.
fn build_merger(config: &QuoteBoxConfig, local: &[Quote]) -> Result<SyncMerger> {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(JsonPlaceholderRemote::new(
        config.endpoint.clone(),
        config.fetch_limit,
    )))?;
    registry.register(Arc::new(MockRemote::with_snapshot(local.to_vec())))?;

    if let Err(err) = registry.select_active(&config.provider) {
        warn!(
            "event=provider_select module=cli status=error provider={} error={}",
            config.provider, err
        );
        bail!(
            "{err}; available providers: {}",
            registry.provider_ids().join(", ")
        );
    }
    Ok(registry.active_merger()?)
}

/// Sends freshly added quotes to the remote, then re-syncs.
///
/// Failures are reported as notices; the local change stays saved.
fn send_new_quotes<R: KvRepository>(
    config: &QuoteBoxConfig,
    store: &mut QuoteStore<R>,
    ids: &[QuoteId],
) {
    if ids.is_empty() {
        return;
    }
    let merger = match build_merger(config, store.quotes()) {
        Ok(merger) => merger,
        Err(err) => {
            notify(NoticeKind::Error, format!("Error sending quotes: {err:#}"));
            return;
        }
    };
    notify(
        NoticeKind::Info,
        format!("Sending {} quote(s) to {}...", ids.len(), merger.source_id()),
    );

    let report = merger.append_quotes(store, ids);
    for (id, err) in &report.failed {
        notify(NoticeKind::Error, format!("Error sending quote {id}: {err}"));
    }
    if report.pushed.is_empty() {
        return;
    }
    notify(
        NoticeKind::Success,
        format!("{} quote(s) sent to server.", report.pushed.len()),
    );
    match merger.run_cycle(store) {
        Ok(outcome) => report_outcome(outcome),
        Err(err) => notify(NoticeKind::Error, format!("Sync failed: {err}")),
    }
}

fn show_next<P, S, R>(
    display: &DisplayService<P, S>,
    store: &QuoteStore<R>,
    filter: &CategoryFilter,
) where
    P: KvRepository,
    S: KvRepository,
    R: KvRepository,
{
    match display.next_quote(store, filter, &mut rand::thread_rng()) {
        QuoteView::Quote(quote) => print_quote(&quote),
        QuoteView::NoQuote => notify(
            NoticeKind::Info,
            "No quotes available for this category. Add some or select 'all'.",
        ),
    }
}

fn show_last_viewed<P: KvRepository, S: KvRepository>(display: &DisplayService<P, S>) {
    if let Some(quote) = display.last_viewed() {
        println!("Last viewed: \"{}\" - {}", quote.text, quote.attribution());
    }
}

fn report_outcome(outcome: SyncOutcome) {
    match outcome {
        SyncOutcome::Changed(report) => notify(
            NoticeKind::Success,
            format!(
                "Quotes synced from server: {} added, {} updated, {} removed.",
                report.added, report.updated, report.removed
            ),
        ),
        SyncOutcome::Unchanged => notify(NoticeKind::Info, "Quotes already up to date."),
    }
}

fn print_quote(quote: &Quote) {
    println!("\"{}\"", quote.text);
    println!("- {}", quote.attribution());
}
