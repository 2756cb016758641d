//! Driving port for venue ingestion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UpsertOutcome;
use crate::domain::{Error, VenueDraft, VenueValidationError};

/// One batch of candidate records.
///
/// Batch boundaries carry no semantics for the upsert itself; the label and
/// digest only travel into the report for traceability.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueBatch {
    /// Human-readable batch label, typically the file name.
    pub label: String,
    /// SHA-256 of the raw batch payload, when read from a file.
    pub digest: Option<String>,
    /// Decoded drafts in input order; undecodable entries arrive as errors.
    pub records: Vec<Result<VenueDraft, VenueValidationError>>,
}

impl VenueBatch {
    /// Build a batch from already-decoded drafts.
    pub fn from_drafts(label: impl Into<String>, drafts: Vec<VenueDraft>) -> Self {
        Self {
            label: label.into(),
            digest: None,
            records: drafts.into_iter().map(Ok).collect(),
        }
    }
}

/// Why a record was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Missing field, undecodable entry, or out-of-range value.
    MalformedRecord,
    /// The id is held by a record from a different origin.
    ConstraintViolation,
}

/// A record skipped during batch ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedVenue {
    /// Zero-based position within the batch.
    pub position: usize,
    /// Candidate id when one could be read.
    pub id: Option<String>,
    /// Rejection category.
    pub kind: RejectionKind,
    /// Human-readable reason.
    pub message: String,
}

/// Summary of one applied batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueIngestionReport {
    /// Batch label.
    pub label: String,
    /// Batch payload digest, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Records submitted, including rejected ones.
    pub submitted: u64,
    /// Records inserted for the first time.
    pub inserted: u64,
    /// Existing records whose coordinates were refreshed.
    pub refreshed: u64,
    /// Records skipped, in input order.
    pub rejected: Vec<RejectedVenue>,
    /// When the batch finished.
    pub completed_at: DateTime<Utc>,
}

impl VenueIngestionReport {
    /// Records applied to the store.
    pub fn applied(&self) -> u64 {
        self.inserted + self.refreshed
    }
}

/// Driving port for venue ingestion.
#[async_trait]
pub trait VenueIngestionCommand: Send + Sync {
    /// Validate and upsert one venue.
    async fn upsert_venue(&self, draft: VenueDraft) -> Result<UpsertOutcome, Error>;

    /// Apply every record of a batch independently.
    ///
    /// Malformed and conflicting records are reported, not fatal. Storage
    /// failures abort the batch; rerunning it is safe.
    async fn ingest_batch(&self, batch: VenueBatch) -> Result<VenueIngestionReport, Error>;
}
