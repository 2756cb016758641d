//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod venue_ingestion_command;
mod venue_repository;

pub use venue_ingestion_command::{
    RejectedVenue, RejectionKind, VenueBatch, VenueIngestionCommand, VenueIngestionReport,
};
#[cfg(test)]
pub use venue_repository::MockVenueRepository;
pub use venue_repository::{UpsertOutcome, VenueRepository, VenueRepositoryError};
