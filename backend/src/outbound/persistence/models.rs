//! Internal Diesel row structs for the venue store.
//!
//! These types never leave the persistence layer.

use diesel::prelude::*;
use diesel::sql_types::Bool;

use crate::domain::{
    Coordinates, DataQuality, LocationCode, VenueId, VenueRecord, VenueType, VenueValidationError,
};

use super::schema::sailing_venues;

/// Row struct for reading from the `sailing_venues` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sailing_venues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VenueRow {
    pub id: String,
    pub name: String,
    pub coordinates_lat: f64,
    pub coordinates_lng: f64,
    pub country: String,
    pub region: String,
    pub venue_type: String,
    pub time_zone: String,
    pub data_quality: String,
    pub source_id: String,
    pub source_type: String,
    pub data_source: String,
    pub verified: bool,
}

impl TryFrom<VenueRow> for VenueRecord {
    type Error = VenueValidationError;

    fn try_from(row: VenueRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VenueId::new(row.id)?,
            name: row.name,
            coordinates: Coordinates::new(row.coordinates_lat, row.coordinates_lng)?,
            country: LocationCode::parse("country", &row.country)?,
            region: LocationCode::parse("region", &row.region)?,
            venue_type: VenueType::parse(&row.venue_type)?,
            time_zone: row.time_zone,
            data_quality: DataQuality::parse(&row.data_quality)?,
            source_id: row.source_id,
            source_type: row.source_type,
            data_source: row.data_source,
            verified: row.verified,
        })
    }
}

/// Single-column result of the upsert statement.
///
/// `inserted` is `xmax = 0` on the returned tuple, which holds only for rows
/// created by this statement.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct UpsertResultRow {
    #[diesel(sql_type = Bool)]
    pub inserted: bool,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn row() -> VenueRow {
        VenueRow {
            id: "osm-node-1".to_owned(),
            name: "Test Marina".to_owned(),
            coordinates_lat: 40.0,
            coordinates_lng: -74.0,
            country: "unknown".to_owned(),
            region: "NY".to_owned(),
            venue_type: "regional".to_owned(),
            time_zone: "UTC".to_owned(),
            data_quality: "osm".to_owned(),
            source_id: "1".to_owned(),
            source_type: "node".to_owned(),
            data_source: "osm".to_owned(),
            verified: false,
        }
    }

    #[rstest]
    fn stored_rows_convert_to_records() {
        let record = VenueRecord::try_from(row()).expect("valid row");
        assert_eq!(record.id.as_ref(), "osm-node-1");
        assert_eq!(record.country, LocationCode::Unknown);
        assert_eq!(record.region, LocationCode::Known("NY".to_owned()));
        assert_eq!(record.data_quality, DataQuality::Osm);
    }

    #[rstest]
    fn unknown_tags_in_storage_are_reported() {
        let mut bad = row();
        bad.venue_type = "harbour".to_owned();
        let error = VenueRecord::try_from(bad).expect_err("unknown tag");
        assert!(matches!(error, VenueValidationError::UnknownVenueType { .. }));
    }
}
