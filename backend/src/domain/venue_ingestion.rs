//! Venue ingestion orchestration service.
//!
//! This service owns the ingestion behaviour around the store's upsert:
//! - record validation before any write;
//! - per-record rejection without aborting the batch;
//! - bounded retries for transient store failures.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    RejectedVenue, RejectionKind, UpsertOutcome, VenueBatch, VenueIngestionCommand,
    VenueIngestionReport, VenueRepository, VenueRepositoryError,
};
use crate::domain::{
    Error, RetryPolicy, RetrySleeper, TokioSleeper, VenueDraft, VenueRecord, VenueValidationError,
};

/// Domain service implementing venue ingestion command behaviour.
#[derive(Clone)]
pub struct VenueIngestionService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    sleeper: Arc<dyn RetrySleeper>,
}

impl<R> VenueIngestionService<R> {
    /// Create a new ingestion service with the default retry policy.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn RetrySleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

/// Failure of one record inside a batch.
enum RecordFailure {
    Rejected(RejectedVenue),
    Fatal(Error),
}

impl<R> VenueIngestionService<R>
where
    R: VenueRepository,
{
    async fn upsert_with_retry(
        &self,
        record: &VenueRecord,
    ) -> Result<UpsertOutcome, VenueRepositoryError> {
        let max_attempts = self.retry.attempts();
        let mut attempt = 1;
        loop {
            match self.repository.upsert_venue(record).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.backoff_after(attempt);
                    warn!(
                        venue_id = %record.id,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient venue store failure; retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn apply_entry(
        &self,
        position: usize,
        entry: Result<VenueDraft, VenueValidationError>,
    ) -> Result<UpsertOutcome, RecordFailure> {
        let draft = entry.map_err(|err| {
            RecordFailure::Rejected(rejected(
                position,
                None,
                RejectionKind::MalformedRecord,
                err.to_string(),
            ))
        })?;
        let candidate_id = draft.id.clone();
        let record = VenueRecord::try_from(draft).map_err(|err| {
            RecordFailure::Rejected(rejected(
                position,
                candidate_id,
                RejectionKind::MalformedRecord,
                err.to_string(),
            ))
        })?;

        match self.upsert_with_retry(&record).await {
            Ok(outcome) => {
                debug!(venue_id = %record.id, ?outcome, "venue applied");
                Ok(outcome)
            }
            Err(VenueRepositoryError::Conflict { message }) => Err(RecordFailure::Rejected(
                rejected(
                    position,
                    Some(record.id.to_string()),
                    RejectionKind::ConstraintViolation,
                    message,
                ),
            )),
            Err(err) => Err(RecordFailure::Fatal(map_repository_error(err))),
        }
    }
}

#[async_trait]
impl<R> VenueIngestionCommand for VenueIngestionService<R>
where
    R: VenueRepository,
{
    async fn upsert_venue(&self, draft: VenueDraft) -> Result<UpsertOutcome, Error> {
        let record = VenueRecord::try_from(draft)
            .map_err(|err| Error::invalid_request(format!("malformed venue record: {err}")))?;
        self.upsert_with_retry(&record)
            .await
            .map_err(map_repository_error)
    }

    async fn ingest_batch(&self, batch: VenueBatch) -> Result<VenueIngestionReport, Error> {
        let VenueBatch {
            label,
            digest,
            records,
        } = batch;
        let submitted = u64::try_from(records.len())
            .map_err(|_| Error::internal("batch size exceeds supported range"))?;

        let mut inserted = 0_u64;
        let mut refreshed = 0_u64;
        let mut rejections = Vec::new();

        for (position, entry) in records.into_iter().enumerate() {
            match self.apply_entry(position, entry).await {
                Ok(UpsertOutcome::Inserted) => inserted += 1,
                Ok(UpsertOutcome::CoordinatesRefreshed) => refreshed += 1,
                Err(RecordFailure::Rejected(rejection)) => {
                    warn!(
                        batch = %label,
                        position = rejection.position,
                        venue_id = rejection.id.as_deref().unwrap_or("<none>"),
                        kind = ?rejection.kind,
                        reason = %rejection.message,
                        "venue record rejected"
                    );
                    rejections.push(rejection);
                }
                Err(RecordFailure::Fatal(err)) => {
                    let applied = inserted + refreshed;
                    error!(
                        batch = %label,
                        position,
                        applied_before_failure = applied,
                        error = %err,
                        "venue batch aborted"
                    );
                    return Err(err.with_details(json!({
                        "batch": label,
                        "position": position,
                        "appliedBeforeFailure": applied,
                    })));
                }
            }
        }

        let report = VenueIngestionReport {
            label,
            digest,
            submitted,
            inserted,
            refreshed,
            rejected: rejections,
            completed_at: self.clock.utc(),
        };
        info!(
            batch = %report.label,
            submitted = report.submitted,
            inserted = report.inserted,
            refreshed = report.refreshed,
            rejected = report.rejected.len(),
            "venue batch applied"
        );
        Ok(report)
    }
}

fn rejected(
    position: usize,
    id: Option<String>,
    kind: RejectionKind,
    message: String,
) -> RejectedVenue {
    RejectedVenue {
        position,
        id,
        kind,
        message,
    }
}

fn map_repository_error(error: VenueRepositoryError) -> Error {
    match error {
        VenueRepositoryError::Connection { message }
        | VenueRepositoryError::Query { message } => {
            Error::service_unavailable(format!("failed to persist venue: {message}"))
        }
        VenueRepositoryError::Conflict { message } => {
            Error::conflict(format!("venue id conflict: {message}"))
        }
    }
}

#[cfg(test)]
#[path = "venue_ingestion_tests/mod.rs"]
mod tests;
