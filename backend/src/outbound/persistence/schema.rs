//! Diesel table definitions.
//!
//! Mirrors `migrations/2026-10-01-000000_create_sailing_venues/up.sql`.

diesel::table! {
    /// Sailing venue reference data keyed by stable external id.
    sailing_venues (id) {
        /// Stable external identifier; sole conflict key.
        id -> Text,
        /// Human-readable label.
        name -> Text,
        /// Latitude in degrees; refreshed on re-ingestion.
        coordinates_lat -> Float8,
        /// Longitude in degrees; refreshed on re-ingestion.
        coordinates_lng -> Float8,
        /// Country code or `unknown`.
        country -> Text,
        /// Region code or `unknown`.
        region -> Text,
        /// Venue classification tag.
        venue_type -> Text,
        /// Fixed time zone label.
        time_zone -> Text,
        /// Provenance tier tag.
        data_quality -> Text,
        /// Identifier native to the originating dataset.
        source_id -> Text,
        /// Entity kind native to the originating dataset.
        source_type -> Text,
        /// Originating system name.
        data_source -> Text,
        /// Authoritative confirmation flag.
        verified -> Bool,
    }
}
