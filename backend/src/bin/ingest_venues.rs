//! Apply sailing venue batch files to the venue store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use sailing_venues::config::IngestSettings;
use sailing_venues::domain::VenueIngestionService;
use sailing_venues::domain::ports::{VenueIngestionCommand, VenueRepository};
use sailing_venues::outbound::batch_source::read_batch_file;
use sailing_venues::outbound::memory::InMemoryVenueRepository;
use sailing_venues::outbound::persistence::{DbPool, DieselVenueRepository, run_pending_migrations};
use sailing_venues::telemetry::init_tracing;
use tokio::runtime::Builder;
use tracing::info;

/// `ingest-venues` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ingest-venues",
    about = "Upsert sailing venue batches keyed by stable external id",
    version
)]
struct CliArgs {
    /// Batch files (JSON array or JSON Lines), applied in order.
    #[arg(value_name = "batch", required = true)]
    batches: Vec<PathBuf>,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Validate and apply against an in-memory store; the database is not touched.
    #[arg(long = "dry-run", conflicts_with_all = ["database_url", "migrate"])]
    dry_run: bool,
    /// Apply embedded schema migrations before ingesting.
    #[arg(long)]
    migrate: bool,
    /// Exit with an error when any record is rejected.
    #[arg(long)]
    strict: bool,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = IngestSettings::load_from_iter([OsString::from("ingest-venues")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    init_tracing(settings.log_json);

    if args.dry_run {
        info!("dry run: applying batches to an in-memory store");
        let repository = Arc::new(InMemoryVenueRepository::new());
        return run_batches(repository, &settings, &args).await;
    }

    let database_url = resolve_database_url(args.database_url.clone())?;
    if args.migrate {
        let url = database_url.clone();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .map_err(|error| io::Error::other(format!("migration task failed: {error}")))?
            .map_err(io::Error::other)?;
        info!(applied, "schema migrations complete");
    }

    let pool = DbPool::new(settings.pool_config(database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    run_batches(Arc::new(DieselVenueRepository::new(pool)), &settings, &args).await
}

async fn run_batches<R>(
    repository: Arc<R>,
    settings: &IngestSettings,
    args: &CliArgs,
) -> io::Result<()>
where
    R: VenueRepository + 'static,
{
    let command = VenueIngestionService::new(repository, Arc::new(DefaultClock))
        .with_retry_policy(settings.retry_policy());

    let mut rejected = 0_usize;
    for path in &args.batches {
        let batch = read_batch_file(path).map_err(io::Error::other)?;
        let report = command
            .ingest_batch(batch)
            .await
            .map_err(|error| io::Error::other(format!("ingest {} failed: {error}", path.display())))?;
        rejected += report.rejected.len();
        let line = serde_json::to_string(&report)
            .map_err(|error| io::Error::other(format!("encode report: {error}")))?;
        println!("{line}");
    }

    enforce_strict(args.strict, rejected)
}

fn enforce_strict(strict: bool, rejected: usize) -> io::Result<()> {
    if strict && rejected > 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{rejected} venue record(s) rejected"),
        ));
    }
    Ok(())
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
