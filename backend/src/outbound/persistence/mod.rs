//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Provides the venue store port backed by the `sailing_venues` table, with
//! async access through `diesel-async` and `bb8` pooling.
//!
//! Row structs (`models.rs`) and schema definitions (`schema.rs`) stay private
//! to this module. Every database error is mapped to
//! [`VenueRepositoryError`](crate::domain::ports::VenueRepositoryError).
//!
//! # Example
//!
//! ```ignore
//! use sailing_venues::outbound::persistence::{DbPool, DieselVenueRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/venues")).await?;
//! let repo = DieselVenueRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_venue_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_venue_repository::DieselVenueRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
