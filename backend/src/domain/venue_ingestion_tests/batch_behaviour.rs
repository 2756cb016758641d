//! Batch ingestion behaviour: per-record rejection and batch aborts.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    RejectionKind, UpsertOutcome, VenueBatch, VenueIngestionCommand, VenueRepositoryError,
};
use crate::domain::{ErrorCode, VenueValidationError};

#[rstest]
#[tokio::test]
async fn malformed_records_do_not_abort_the_batch() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .withf(|record| record.id.as_ref() != "osm-node-2")
        .times(2)
        .returning(|record| {
            if record.id.as_ref() == "osm-node-1" {
                Ok(UpsertOutcome::Inserted)
            } else {
                Ok(UpsertOutcome::CoordinatesRefreshed)
            }
        });

    let mut batch = VenueBatch::from_drafts(
        "batch-001.jsonl",
        vec![
            draft("osm-node-1", "Test Marina", 40.0, -74.0),
            draft("osm-node-2", "Bad Marina", 200.0, -74.0),
            draft("osm-node-3", "Coast Guard Basin", 41.0, -70.0),
        ],
    );
    batch.records.push(Err(VenueValidationError::Unparseable {
        message: "expected value at line 1 column 1".to_owned(),
    }));

    let service = make_service(repository, Arc::new(RecordingSleeper::default()));
    let report = service
        .ingest_batch(batch)
        .await
        .expect("batch should complete");

    assert_eq!(report.label, "batch-001.jsonl");
    assert_eq!(report.submitted, 4);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.refreshed, 1);
    assert_eq!(report.applied(), 2);
    assert_eq!(report.completed_at, fixture_timestamp());

    let positions: Vec<_> = report
        .rejected
        .iter()
        .map(|rejection| (rejection.position, rejection.id.as_deref(), rejection.kind))
        .collect();
    assert_eq!(
        positions,
        vec![
            (1, Some("osm-node-2"), RejectionKind::MalformedRecord),
            (3, None, RejectionKind::MalformedRecord),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn conflicting_ids_are_reported_as_constraint_violations() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .times(2)
        .returning(|record| {
            if record.id.as_ref() == "osm-node-5" {
                Err(VenueRepositoryError::conflict("osm-node-5 held by osm/way/5"))
            } else {
                Ok(UpsertOutcome::Inserted)
            }
        });

    let batch = VenueBatch::from_drafts(
        "batch-002.jsonl",
        vec![
            draft("osm-node-5", "Harbour", 50.0, -1.0),
            draft("osm-node-6", "Lake Club", 52.0, -2.0),
        ],
    );

    let service = make_service(repository, Arc::new(RecordingSleeper::default()));
    let report = service
        .ingest_batch(batch)
        .await
        .expect("batch should complete");

    assert_eq!(report.inserted, 1);
    assert_eq!(report.rejected.len(), 1);
    let rejection = report.rejected.first().expect("one rejection");
    assert_eq!(rejection.kind, RejectionKind::ConstraintViolation);
    assert_eq!(rejection.id.as_deref(), Some("osm-node-5"));
}

#[rstest]
#[tokio::test]
async fn storage_failure_aborts_with_progress_details() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .times(2)
        .returning(|record| {
            if record.id.as_ref() == "osm-node-1" {
                Ok(UpsertOutcome::Inserted)
            } else {
                Err(VenueRepositoryError::query("relation \"sailing_venues\" does not exist"))
            }
        });

    let batch = VenueBatch::from_drafts(
        "batch-003.jsonl",
        vec![
            draft("osm-node-1", "Test Marina", 40.0, -74.0),
            draft("osm-node-2", "Second Marina", 40.5, -74.5),
            draft("osm-node-3", "Never Reached", 41.0, -75.0),
        ],
    );

    let service = make_service(repository, Arc::new(RecordingSleeper::default()));
    let error = service
        .ingest_batch(batch)
        .await
        .expect_err("batch should abort");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    let details = error.details().expect("details should be attached");
    assert_eq!(details["batch"], "batch-003.jsonl");
    assert_eq!(details["position"], 1);
    assert_eq!(details["appliedBeforeFailure"], 1);
}

#[rstest]
#[tokio::test]
async fn empty_batch_reports_zero_counts() {
    let mut repository = MockVenueRepository::new();
    repository.expect_upsert_venue().times(0);

    let service = make_service(repository, Arc::new(RecordingSleeper::default()));
    let report = service
        .ingest_batch(VenueBatch::from_drafts("empty.jsonl", Vec::new()))
        .await
        .expect("empty batch should complete");

    assert_eq!(report.submitted, 0);
    assert_eq!(report.applied(), 0);
    assert!(report.rejected.is_empty());
}
