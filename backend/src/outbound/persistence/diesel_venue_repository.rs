//! PostgreSQL-backed sailing venue store.

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Bool, Double, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UpsertOutcome, VenueRepository, VenueRepositoryError};
use crate::domain::{VenueId, VenueRecord};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{UpsertResultRow, VenueRow};
use super::pool::DbPool;
use super::schema::sailing_venues;

/// Diesel-backed implementation of the venue store port.
#[derive(Clone)]
pub struct DieselVenueRepository {
    pool: DbPool,
}

impl DieselVenueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// The DO UPDATE guard skips rows held by another provenance triple; such a
// row returns nothing, which the adapter reports as a conflict.
const UPSERT_SQL: &str = r#"
INSERT INTO sailing_venues (
    id, name, coordinates_lat, coordinates_lng, country, region,
    venue_type, time_zone, data_quality, source_id, source_type,
    data_source, verified
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
ON CONFLICT (id)
DO UPDATE SET
    coordinates_lat = EXCLUDED.coordinates_lat,
    coordinates_lng = EXCLUDED.coordinates_lng
WHERE sailing_venues.source_id = EXCLUDED.source_id
  AND sailing_venues.source_type = EXCLUDED.source_type
  AND sailing_venues.data_source = EXCLUDED.data_source
RETURNING (xmax = 0) AS inserted
"#;

async fn load_venue(
    conn: &mut AsyncPgConnection,
    id: &str,
) -> Result<Option<VenueRow>, VenueRepositoryError> {
    sailing_venues::table
        .find(id)
        .select(VenueRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "venue lookup"))
}

fn conflict_for(record: &VenueRecord, holder: Option<VenueRow>) -> VenueRepositoryError {
    match holder {
        Some(row) => VenueRepositoryError::conflict(format!(
            "{} is held by {}/{}/{}",
            row.id, row.data_source, row.source_type, row.source_id
        )),
        None => VenueRepositoryError::conflict(format!(
            "{} was claimed by a concurrent writer",
            record.id
        )),
    }
}

fn row_to_record(row: VenueRow) -> Result<VenueRecord, VenueRepositoryError> {
    let id = row.id.clone();
    VenueRecord::try_from(row).map_err(|err| {
        VenueRepositoryError::query(format!("stored venue {id} is not readable: {err}"))
    })
}

#[async_trait::async_trait]
impl VenueRepository for DieselVenueRepository {
    async fn upsert_venue(
        &self,
        record: &VenueRecord,
    ) -> Result<UpsertOutcome, VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let applied = sql_query(UPSERT_SQL)
            .bind::<Text, _>(record.id.as_ref())
            .bind::<Text, _>(&record.name)
            .bind::<Double, _>(record.coordinates.latitude())
            .bind::<Double, _>(record.coordinates.longitude())
            .bind::<Text, _>(record.country.as_str())
            .bind::<Text, _>(record.region.as_str())
            .bind::<Text, _>(record.venue_type.as_str())
            .bind::<Text, _>(&record.time_zone)
            .bind::<Text, _>(record.data_quality.as_str())
            .bind::<Text, _>(&record.source_id)
            .bind::<Text, _>(&record.source_type)
            .bind::<Text, _>(&record.data_source)
            .bind::<Bool, _>(record.verified)
            .get_result::<UpsertResultRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "venue upsert"))?;

        match applied {
            Some(UpsertResultRow { inserted: true }) => Ok(UpsertOutcome::Inserted),
            Some(UpsertResultRow { inserted: false }) => Ok(UpsertOutcome::CoordinatesRefreshed),
            None => {
                let holder = load_venue(&mut conn, record.id.as_ref()).await?;
                debug!(venue_id = %record.id, "venue upsert skipped by provenance guard");
                Err(conflict_for(record, holder))
            }
        }
    }

    async fn find_venue(&self, id: &VenueId) -> Result<Option<VenueRecord>, VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_venue(&mut conn, id.as_ref())
            .await?
            .map(row_to_record)
            .transpose()
    }

    async fn count_venues(&self) -> Result<u64, VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = sailing_venues::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "venue count"))?;
        u64::try_from(count).map_err(|_| VenueRepositoryError::query("negative venue count"))
    }
}
