//! Validation coverage for venue records.

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn draft() -> VenueDraft {
    VenueDraft {
        id: Some("osm-node-1".to_owned()),
        name: Some("Test Marina".to_owned()),
        coordinates_lat: Some(40.0),
        coordinates_lng: Some(-74.0),
        country: Some("unknown".to_owned()),
        region: Some("unknown".to_owned()),
        venue_type: Some("regional".to_owned()),
        time_zone: Some("UTC".to_owned()),
        data_quality: Some("osm".to_owned()),
        source_id: Some("1".to_owned()),
        source_type: Some("node".to_owned()),
        data_source: Some("osm".to_owned()),
        verified: None,
    }
}

#[rstest]
fn complete_draft_promotes_to_record(draft: VenueDraft) {
    let record = VenueRecord::try_from(draft).expect("draft should validate");
    assert_eq!(record.id.as_ref(), "osm-node-1");
    assert_eq!(record.name, "Test Marina");
    assert_eq!(record.coordinates.latitude(), 40.0);
    assert_eq!(record.coordinates.longitude(), -74.0);
    assert_eq!(record.country, LocationCode::Unknown);
    assert_eq!(record.venue_type, VenueType::Regional);
    assert_eq!(record.data_quality, DataQuality::Osm);
    assert!(!record.verified, "verified defaults to false");
}

#[rstest]
fn latitude_of_200_is_rejected(mut draft: VenueDraft) {
    draft.coordinates_lat = Some(200.0);
    let error = VenueRecord::try_from(draft).expect_err("latitude should fail");
    assert_eq!(error, VenueValidationError::LatitudeOutOfRange { value: 200.0 });
}

#[rstest]
#[case(-180.5)]
#[case(181.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn out_of_range_longitudes_are_rejected(#[case] longitude: f64) {
    let result = Coordinates::new(0.0, longitude);
    assert!(matches!(
        result,
        Err(VenueValidationError::LongitudeOutOfRange { .. })
    ));
}

#[rstest]
#[case(-90.0, -180.0)]
#[case(90.0, 180.0)]
#[case(0.0, 0.0)]
fn boundary_coordinates_are_accepted(#[case] latitude: f64, #[case] longitude: f64) {
    assert!(Coordinates::new(latitude, longitude).is_ok());
}

#[rstest]
fn missing_name_is_reported(mut draft: VenueDraft) {
    draft.name = None;
    let error = VenueRecord::try_from(draft).expect_err("name is required");
    assert_eq!(error, VenueValidationError::MissingField { field: "name" });
}

#[rstest]
fn blank_source_type_is_reported(mut draft: VenueDraft) {
    draft.source_type = Some("   ".to_owned());
    let error = VenueRecord::try_from(draft).expect_err("blank source type");
    assert_eq!(
        error,
        VenueValidationError::EmptyField {
            field: "source_type"
        }
    );
}

#[rstest]
fn missing_coordinate_is_reported(mut draft: VenueDraft) {
    draft.coordinates_lng = None;
    let error = VenueRecord::try_from(draft).expect_err("longitude required");
    assert_eq!(
        error,
        VenueValidationError::MissingField {
            field: "coordinates_lng"
        }
    );
}

#[rstest]
#[case("", VenueValidationError::EmptyField { field: "id" })]
#[case("osm node 1", VenueValidationError::InvalidId { reason: "contains whitespace or control characters" })]
#[case(" osm-node-1", VenueValidationError::InvalidId { reason: "contains whitespace or control characters" })]
fn malformed_ids_are_rejected(#[case] raw: &str, #[case] expected: VenueValidationError) {
    assert_eq!(VenueId::new(raw), Err(expected));
}

#[rstest]
fn overlong_ids_are_rejected() {
    let raw = "x".repeat(MAX_ID_LEN + 1);
    assert!(matches!(
        VenueId::new(raw),
        Err(VenueValidationError::InvalidId { .. })
    ));
}

#[rstest]
fn compose_joins_provenance_parts() {
    let id = VenueId::compose("osm", "way", " 4242 ").expect("composed id");
    assert_eq!(id.to_string(), "osm-way-4242");
}

#[rstest]
#[case("unknown", LocationCode::Unknown)]
#[case("UNKNOWN", LocationCode::Unknown)]
#[case(" GB ", LocationCode::Known("GB".to_owned()))]
fn location_codes_parse(#[case] raw: &str, #[case] expected: LocationCode) {
    assert_eq!(LocationCode::parse("country", raw), Ok(expected));
}

#[rstest]
fn blank_location_code_is_rejected() {
    assert_eq!(
        LocationCode::parse("region", " "),
        Err(VenueValidationError::EmptyField { field: "region" })
    );
}

#[rstest]
fn unknown_venue_type_is_rejected(mut draft: VenueDraft) {
    draft.venue_type = Some("harbour".to_owned());
    let error = VenueRecord::try_from(draft).expect_err("closed classification");
    assert_eq!(
        error,
        VenueValidationError::UnknownVenueType {
            value: "harbour".to_owned()
        }
    );
}

#[rstest]
fn verified_quality_tier_parses() {
    assert_eq!(DataQuality::parse("verified"), Ok(DataQuality::Verified));
    assert!(DataQuality::parse("scraped").is_err());
}

#[rstest]
fn draft_accepts_short_coordinate_aliases() {
    let draft: VenueDraft = serde_json::from_str(
        r#"{"id":"osm-node-1","name":"Test Marina","lat":40.0,"lng":-74.0}"#,
    )
    .expect("draft should decode");
    assert_eq!(draft.coordinates_lat, Some(40.0));
    assert_eq!(draft.coordinates_lng, Some(-74.0));
}

#[rstest]
fn same_origin_compares_provenance_triple(draft: VenueDraft) {
    let record = VenueRecord::try_from(draft.clone()).expect("valid record");
    let mut renamed = draft.clone();
    renamed.name = Some("Renamed Marina".to_owned());
    let renamed = VenueRecord::try_from(renamed).expect("valid record");
    assert!(record.same_origin(&renamed));

    let mut foreign = draft;
    foreign.source_type = Some("way".to_owned());
    let foreign = VenueRecord::try_from(foreign).expect("valid record");
    assert!(!record.same_origin(&foreign));
}

#[rstest]
fn record_serialises_location_codes_as_strings(draft: VenueDraft) {
    let record = VenueRecord::try_from(draft).expect("valid record");
    let value = serde_json::to_value(&record).expect("serialise record");
    assert_eq!(value["country"], "unknown");
    assert_eq!(value["venue_type"], "regional");
    assert_eq!(value["coordinates"]["latitude"], 40.0);
}
