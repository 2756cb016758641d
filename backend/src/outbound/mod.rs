//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed venue store using Diesel ORM
//! - **memory**: in-process venue store with the same upsert contract
//! - **batch_source**: batch file decoding for the ingestion driver
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no ingestion logic.

pub mod batch_source;
pub mod memory;
pub mod persistence;
