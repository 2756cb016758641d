//! Single-record upsert behaviour, including retries.

use std::sync::Arc;
use std::time::Duration;

use mockall::Sequence;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{UpsertOutcome, VenueIngestionCommand, VenueRepositoryError};

#[rstest]
#[tokio::test]
async fn valid_draft_is_upserted_once() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .withf(|record| {
            record.id.as_ref() == "osm-node-1"
                && record.name == "Test Marina"
                && record.coordinates.latitude() == 40.0
        })
        .times(1)
        .return_once(|_| Ok(UpsertOutcome::Inserted));

    let sleeper = Arc::new(RecordingSleeper::default());
    let service = make_service(repository, sleeper.clone());
    let outcome = service
        .upsert_venue(draft("osm-node-1", "Test Marina", 40.0, -74.0))
        .await
        .expect("upsert should succeed");

    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert!(sleeper.delays.lock().expect("lock").is_empty());
}

#[rstest]
#[tokio::test]
async fn out_of_range_latitude_never_reaches_the_store() {
    let mut repository = MockVenueRepository::new();
    repository.expect_upsert_venue().times(0);

    let service = make_service(repository, Arc::new(RecordingSleeper::default()));
    let error = service
        .upsert_venue(draft("osm-node-1", "Test Marina", 200.0, -74.0))
        .await
        .expect_err("latitude 200 should be rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().contains("latitude 200"));
}

#[rstest]
#[tokio::test]
async fn transient_failures_are_retried_with_backoff() {
    let mut repository = MockVenueRepository::new();
    let mut sequence = Sequence::new();
    repository
        .expect_upsert_venue()
        .times(2)
        .in_sequence(&mut sequence)
        .returning(|_| Err(VenueRepositoryError::connection("connection reset")));
    repository
        .expect_upsert_venue()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(UpsertOutcome::CoordinatesRefreshed));

    let sleeper = Arc::new(RecordingSleeper::default());
    let service = make_service(repository, sleeper.clone());
    let outcome = service
        .upsert_venue(draft("osm-node-7", "Harbour", 51.5, -1.2))
        .await
        .expect("third attempt should succeed");

    assert_eq!(outcome, UpsertOutcome::CoordinatesRefreshed);
    assert_eq!(
        *sleeper.delays.lock().expect("lock"),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
}

#[rstest]
#[tokio::test]
async fn exhausted_retries_surface_service_unavailable() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .times(3)
        .returning(|_| Err(VenueRepositoryError::connection("pool timed out")));

    let sleeper = Arc::new(RecordingSleeper::default());
    let service = make_service(repository, sleeper.clone());
    let error = service
        .upsert_venue(draft("osm-node-7", "Harbour", 51.5, -1.2))
        .await
        .expect_err("retries should be exhausted");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(sleeper.delays.lock().expect("lock").len(), 2);
}

#[rstest]
#[tokio::test]
async fn query_failures_are_not_retried() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .times(1)
        .return_once(|_| Err(VenueRepositoryError::query("relation does not exist")));

    let sleeper = Arc::new(RecordingSleeper::default());
    let service = make_service(repository, sleeper.clone());
    let error = service
        .upsert_venue(draft("osm-node-7", "Harbour", 51.5, -1.2))
        .await
        .expect_err("query failure should surface");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert!(sleeper.delays.lock().expect("lock").is_empty());
}

#[rstest]
#[tokio::test]
async fn provenance_conflict_maps_to_conflict() {
    let mut repository = MockVenueRepository::new();
    repository
        .expect_upsert_venue()
        .times(1)
        .return_once(|_| Err(VenueRepositoryError::conflict("osm-node-7 held by osm/way/7")));

    let service = make_service(repository, Arc::new(RecordingSleeper::default()));
    let error = service
        .upsert_venue(draft("osm-node-7", "Harbour", 51.5, -1.2))
        .await
        .expect_err("conflict should surface");

    assert_eq!(error.code(), ErrorCode::Conflict);
}
