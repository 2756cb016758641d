//! Shared test fixtures and module wiring for venue ingestion unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::MockVenueRepository;
use crate::domain::{RetryPolicy, RetrySleeper, VenueDraft, VenueIngestionService};

pub(super) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Sleeper that records requested delays instead of waiting.
#[derive(Default)]
pub(super) struct RecordingSleeper {
    pub(super) delays: Mutex<Vec<Duration>>,
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().expect("sleeper lock").push(duration);
    }
}

pub(super) fn draft(id: &str, name: &str, lat: f64, lng: f64) -> VenueDraft {
    let native = id.rsplit('-').next().unwrap_or(id).to_owned();
    VenueDraft {
        id: Some(id.to_owned()),
        name: Some(name.to_owned()),
        coordinates_lat: Some(lat),
        coordinates_lng: Some(lng),
        country: Some("unknown".to_owned()),
        region: Some("unknown".to_owned()),
        venue_type: Some("regional".to_owned()),
        time_zone: Some("UTC".to_owned()),
        data_quality: Some("osm".to_owned()),
        source_id: Some(native),
        source_type: Some("node".to_owned()),
        data_source: Some("osm".to_owned()),
        verified: Some(false),
    }
}

pub(super) fn make_service(
    repository: MockVenueRepository,
    sleeper: Arc<RecordingSleeper>,
) -> VenueIngestionService<MockVenueRepository> {
    let clock: Arc<dyn Clock> = Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    });
    VenueIngestionService::new(Arc::new(repository), clock)
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(25),
        })
        .with_sleeper(sleeper)
}

mod batch_behaviour;
mod upsert_behaviour;
