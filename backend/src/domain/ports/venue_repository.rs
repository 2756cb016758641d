//! Driven port for the keyed sailing venue store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::{VenueId, VenueRecord};

/// Effect of one applied upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No record with this id existed; the full record was stored.
    Inserted,
    /// The id existed; only its coordinates were overwritten.
    CoordinatesRefreshed,
}

define_port_error! {
    /// Errors raised by venue store adapters.
    pub enum VenueRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "venue store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "venue store query failed: {message}",
        /// The id is already held by a record with a different provenance.
        Conflict { message: String } =>
            "venue id conflict: {message}",
    }
}

impl VenueRepositoryError {
    /// Whether a blind retry of the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Port for the `sailing_venues` collection.
///
/// Implementations must honour the upsert contract: insert when the id is
/// absent; when present and the provenance triple matches, overwrite only the
/// coordinates; otherwise fail with [`VenueRepositoryError::Conflict`] and
/// leave the stored record untouched. Each call is atomic on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueRepository: Send + Sync {
    /// Insert or refresh one venue keyed by its id.
    async fn upsert_venue(
        &self,
        record: &VenueRecord,
    ) -> Result<UpsertOutcome, VenueRepositoryError>;

    /// Read back a stored venue.
    async fn find_venue(&self, id: &VenueId) -> Result<Option<VenueRecord>, VenueRepositoryError>;

    /// Count distinct stored venues.
    async fn count_venues(&self) -> Result<u64, VenueRepositoryError>;
}
