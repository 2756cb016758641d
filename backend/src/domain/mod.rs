//! Domain primitives, ports, and services.
//!
//! Purpose: define the venue record model and the idempotent upsert
//! behaviour independently of any storage technology. Adapters in
//! [`crate::outbound`] implement the ports declared in [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failures.
//! - `VenueRecord`, `VenueDraft` and value types: the record shape.
//! - `VenueIngestionService`: validation, retries, and batch reporting.

pub mod error;
pub mod ports;
pub mod retry;
pub mod venue;
mod venue_ingestion;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::retry::{RetryPolicy, RetrySleeper, TokioSleeper};
pub use self::venue::{
    Coordinates, DataQuality, LocationCode, VenueDraft, VenueId, VenueRecord, VenueType,
    VenueValidationError,
};
pub use self::venue_ingestion::VenueIngestionService;
