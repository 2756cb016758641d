//! Embedded PostgreSQL helpers for the venue store suites.
//!
//! Every scenario gets its own temporary database with the embedded
//! migrations applied. Assertions read the table through the `postgres`
//! client so they do not share a pool with the code under test.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use sailing_venues::outbound::persistence::run_pending_migrations;

use super::format_postgres_error;

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Stored venue fields read back for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVenue {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub source_type: String,
    pub verified: bool,
}

/// Shared cluster for this test binary, retrying transient bootstrap errors.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut last_error = String::new();
    for attempt in 1..=CLUSTER_RETRIES {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) => last_error = format!("attempt {attempt}/{CLUSTER_RETRIES}: {error:?}"),
        }
        if attempt < CLUSTER_RETRIES {
            std::thread::sleep(CLUSTER_RETRY_DELAY);
        }
    }
    Err(format!("start embedded cluster: {last_error}"))
}

/// Create a temporary database and bring its schema up to date.
pub fn provision_venue_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let name = format!(
        "venues_test_{}_{}",
        std::process::id(),
        DATABASE_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|error| format!("create temporary database: {error:?}"))?;
    let applied =
        run_pending_migrations(database.url()).map_err(|error| format!("migrate: {error}"))?;
    if applied == 0 {
        return Err("no migrations were applied to a fresh database".to_owned());
    }
    Ok(database)
}

fn connect(url: &str) -> Result<Client, String> {
    Client::connect(url, NoTls).map_err(|error| format_postgres_error(&error))
}

/// Number of rows in `sailing_venues`.
pub fn count_rows(url: &str) -> Result<i64, String> {
    let mut client = connect(url)?;
    client
        .query_one("SELECT COUNT(*) FROM sailing_venues", &[])
        .map(|row| row.get::<_, i64>(0))
        .map_err(|error| format_postgres_error(&error))
}

/// Read one venue by id.
pub fn fetch_venue(url: &str, id: &str) -> Result<Option<StoredVenue>, String> {
    let mut client = connect(url)?;
    let row = client
        .query_opt(
            "SELECT name, coordinates_lat, coordinates_lng, country, source_type, verified \
             FROM sailing_venues WHERE id = $1",
            &[&id],
        )
        .map_err(|error| format_postgres_error(&error))?;
    Ok(row.map(|row| StoredVenue {
        name: row.get(0),
        latitude: row.get(1),
        longitude: row.get(2),
        country: row.get(3),
        source_type: row.get(4),
        verified: row.get(5),
    }))
}

/// Drop the venue table to simulate schema loss.
pub fn drop_venue_table(url: &str) -> Result<(), String> {
    let mut client = connect(url)?;
    client
        .batch_execute("DROP TABLE IF EXISTS sailing_venues;")
        .map_err(|error| format_postgres_error(&error))
}
