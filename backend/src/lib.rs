//! Idempotent ingestion of sailing venue reference data.
//!
//! The domain layer validates records and drives upserts through the
//! [`VenueRepository`](domain::ports::VenueRepository) port; outbound
//! adapters provide PostgreSQL and in-memory stores.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
