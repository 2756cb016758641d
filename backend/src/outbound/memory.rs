//! In-process venue store.
//!
//! Honours the same upsert contract as the PostgreSQL adapter. The ingestion
//! driver uses it for `--dry-run`; tests use it to check store-independent
//! properties.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UpsertOutcome, VenueRepository, VenueRepositoryError};
use crate::domain::{VenueId, VenueRecord};

/// Keyed venue store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVenueRepository {
    venues: Arc<RwLock<BTreeMap<VenueId, VenueRecord>>>,
}

impl InMemoryVenueRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record ordered by id.
    pub async fn snapshot(&self) -> Vec<VenueRecord> {
        self.venues.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl VenueRepository for InMemoryVenueRepository {
    async fn upsert_venue(
        &self,
        record: &VenueRecord,
    ) -> Result<UpsertOutcome, VenueRepositoryError> {
        let mut venues = self.venues.write().await;
        match venues.get_mut(&record.id) {
            None => {
                venues.insert(record.id.clone(), record.clone());
                Ok(UpsertOutcome::Inserted)
            }
            Some(existing) if existing.same_origin(record) => {
                existing.coordinates = record.coordinates;
                Ok(UpsertOutcome::CoordinatesRefreshed)
            }
            Some(existing) => Err(VenueRepositoryError::conflict(format!(
                "{} is held by {}/{}/{}",
                existing.id, existing.data_source, existing.source_type, existing.source_id
            ))),
        }
    }

    async fn find_venue(&self, id: &VenueId) -> Result<Option<VenueRecord>, VenueRepositoryError> {
        Ok(self.venues.read().await.get(id).cloned())
    }

    async fn count_venues(&self) -> Result<u64, VenueRepositoryError> {
        let count = self.venues.read().await.len();
        u64::try_from(count).map_err(|_| VenueRepositoryError::query("venue count overflow"))
    }
}
