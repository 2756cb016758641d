//! Sailing venue record model.
//!
//! A [`VenueRecord`] is the validated shape persisted in the `sailing_venues`
//! collection. Inbound data arrives as a loosely typed [`VenueDraft`] and is
//! promoted through [`VenueRecord::try_from`], which enforces:
//!
//! - `id` is non-empty, free of whitespace and control characters;
//! - coordinates are finite and within WGS84 bounds;
//! - `country` and `region` are a known code or the `unknown` sentinel;
//! - every provenance field is present and non-blank.

use std::fmt;

use serde::{Deserialize, Serialize};

const MAX_ID_LEN: usize = 255;
const UNKNOWN_SENTINEL: &str = "unknown";

/// Validation errors raised while promoting a [`VenueDraft`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VenueValidationError {
    /// A required field was absent.
    #[error("{field} is required")]
    MissingField {
        /// Field name as it appears in batch input.
        field: &'static str,
    },
    /// A required field was present but blank.
    #[error("{field} must not be blank")]
    EmptyField {
        /// Field name as it appears in batch input.
        field: &'static str,
    },
    /// The identifier is not a usable stable key.
    #[error("venue id is malformed: {reason}")]
    InvalidId {
        /// Why the identifier was rejected.
        reason: &'static str,
    },
    /// Latitude outside `[-90, 90]` or not finite.
    #[error("latitude {value} must be finite and within [-90, 90]")]
    LatitudeOutOfRange {
        /// Offending value.
        value: f64,
    },
    /// Longitude outside `[-180, 180]` or not finite.
    #[error("longitude {value} must be finite and within [-180, 180]")]
    LongitudeOutOfRange {
        /// Offending value.
        value: f64,
    },
    /// Venue type tag outside the closed classification.
    #[error("unknown venue type `{value}`")]
    UnknownVenueType {
        /// Offending tag.
        value: String,
    },
    /// Data quality tag outside the known provenance tiers.
    #[error("unknown data quality `{value}`")]
    UnknownDataQuality {
        /// Offending tag.
        value: String,
    },
    /// The raw input could not be decoded into a draft at all.
    #[error("record could not be decoded: {message}")]
    Unparseable {
        /// Decoder message.
        message: String,
    },
}

/// Stable external identifier and sole conflict key of a venue.
///
/// # Examples
/// ```
/// use sailing_venues::domain::VenueId;
///
/// let id = VenueId::compose("osm", "node", "123").expect("valid id");
/// assert_eq!(id.as_ref(), "osm-node-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VenueId(String);

impl VenueId {
    /// Validate and construct an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, VenueValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(VenueValidationError::EmptyField { field: "id" });
        }
        if id.len() > MAX_ID_LEN {
            return Err(VenueValidationError::InvalidId {
                reason: "longer than 255 bytes",
            });
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(VenueValidationError::InvalidId {
                reason: "contains whitespace or control characters",
            });
        }
        Ok(Self(id))
    }

    /// Build the `<source>-<kind>-<native>` identifier form.
    pub fn compose(
        data_source: &str,
        source_type: &str,
        source_id: &str,
    ) -> Result<Self, VenueValidationError> {
        Self::new(format!(
            "{}-{}-{}",
            data_source.trim(),
            source_type.trim(),
            source_id.trim()
        ))
    }
}

impl AsRef<str> for VenueId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VenueId {
    type Error = VenueValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VenueId> for String {
    fn from(value: VenueId) -> Self {
        value.0
    }
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    ///
    /// # Examples
    /// ```
    /// use sailing_venues::domain::Coordinates;
    ///
    /// assert!(Coordinates::new(40.0, -74.0).is_ok());
    /// assert!(Coordinates::new(200.0, -74.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, VenueValidationError> {
        if !valid_latitude(latitude) {
            return Err(VenueValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !valid_longitude(longitude) {
            return Err(VenueValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[rustfmt::skip]
fn valid_longitude(value: f64) -> bool { value.is_finite() && (-180.0..=180.0).contains(&value) }

#[rustfmt::skip]
fn valid_latitude(value: f64) -> bool { value.is_finite() && (-90.0..=90.0).contains(&value) }

/// Coarse location classifier: a known code or the explicit `unknown` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum LocationCode {
    /// A known country or region code, stored as given.
    Known(String),
    /// The source did not classify this venue.
    Unknown,
}

impl LocationCode {
    /// Parse a code, mapping the `unknown` sentinel case-insensitively.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, VenueValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VenueValidationError::EmptyField { field });
        }
        if trimmed.eq_ignore_ascii_case(UNKNOWN_SENTINEL) {
            return Ok(Self::Unknown);
        }
        Ok(Self::Known(trimmed.to_owned()))
    }

    /// Stored string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(code) => code.as_str(),
            Self::Unknown => UNKNOWN_SENTINEL,
        }
    }
}

impl From<LocationCode> for String {
    fn from(value: LocationCode) -> Self {
        match value {
            LocationCode::Known(code) => code,
            LocationCode::Unknown => UNKNOWN_SENTINEL.to_owned(),
        }
    }
}

/// Closed venue classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    /// Regional sailing venue.
    Regional,
}

impl VenueType {
    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regional => "regional",
        }
    }

    /// Parse a stored or inbound tag.
    pub fn parse(raw: &str) -> Result<Self, VenueValidationError> {
        match raw.trim() {
            "regional" => Ok(Self::Regional),
            other => Err(VenueValidationError::UnknownVenueType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Provenance confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    /// Community-sourced open map data.
    Osm,
    /// Confirmed by a curated or authoritative process.
    Verified,
}

impl DataQuality {
    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::Verified => "verified",
        }
    }

    /// Parse a stored or inbound tag.
    pub fn parse(raw: &str) -> Result<Self, VenueValidationError> {
        match raw.trim() {
            "osm" => Ok(Self::Osm),
            "verified" => Ok(Self::Verified),
            other => Err(VenueValidationError::UnknownDataQuality {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validated venue record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VenueRecord {
    /// Stable conflict key.
    pub id: VenueId,
    /// Human-readable label.
    pub name: String,
    /// WGS84 location; the only fields refreshed on re-ingestion.
    pub coordinates: Coordinates,
    /// Country classifier.
    pub country: LocationCode,
    /// Region classifier.
    pub region: LocationCode,
    /// Venue classification.
    pub venue_type: VenueType,
    /// Fixed time zone label, not derived from coordinates.
    pub time_zone: String,
    /// Provenance confidence tier.
    pub data_quality: DataQuality,
    /// Identifier native to the originating dataset.
    pub source_id: String,
    /// Entity kind native to the originating dataset (`node`, `way`, ...).
    pub source_type: String,
    /// Originating system name.
    pub data_source: String,
    /// Whether an authoritative process confirmed the record.
    pub verified: bool,
}

impl VenueRecord {
    /// True when `other` carries the same provenance triple.
    ///
    /// Two records sharing an id but not a provenance triple describe
    /// different logical entities.
    pub fn same_origin(&self, other: &Self) -> bool {
        self.data_source == other.data_source
            && self.source_type == other.source_type
            && self.source_id == other.source_id
    }
}

/// Unvalidated inbound venue shape as read from a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VenueDraft {
    /// Candidate conflict key.
    pub id: Option<String>,
    /// Human-readable label.
    pub name: Option<String>,
    /// Latitude in degrees.
    #[serde(alias = "lat")]
    pub coordinates_lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(alias = "lng")]
    pub coordinates_lng: Option<f64>,
    /// Country code or `unknown`.
    pub country: Option<String>,
    /// Region code or `unknown`.
    pub region: Option<String>,
    /// Venue classification tag.
    pub venue_type: Option<String>,
    /// Time zone label.
    pub time_zone: Option<String>,
    /// Provenance tier tag.
    pub data_quality: Option<String>,
    /// Native source identifier.
    pub source_id: Option<String>,
    /// Native source entity kind.
    pub source_type: Option<String>,
    /// Originating system name.
    pub data_source: Option<String>,
    /// Verification flag; absent means `false`.
    pub verified: Option<bool>,
}

impl TryFrom<VenueDraft> for VenueRecord {
    type Error = VenueValidationError;

    fn try_from(draft: VenueDraft) -> Result<Self, Self::Error> {
        let id = VenueId::new(required("id", draft.id)?)?;
        let latitude = draft
            .coordinates_lat
            .ok_or(VenueValidationError::MissingField {
                field: "coordinates_lat",
            })?;
        let longitude = draft
            .coordinates_lng
            .ok_or(VenueValidationError::MissingField {
                field: "coordinates_lng",
            })?;
        let coordinates = Coordinates::new(latitude, longitude)?;

        Ok(Self {
            id,
            name: required_text("name", draft.name)?,
            coordinates,
            country: LocationCode::parse("country", &required("country", draft.country)?)?,
            region: LocationCode::parse("region", &required("region", draft.region)?)?,
            venue_type: VenueType::parse(&required_text("venue_type", draft.venue_type)?)?,
            time_zone: required_text("time_zone", draft.time_zone)?,
            data_quality: DataQuality::parse(&required_text(
                "data_quality",
                draft.data_quality,
            )?)?,
            source_id: required_text("source_id", draft.source_id)?,
            source_type: required_text("source_type", draft.source_type)?,
            data_source: required_text("data_source", draft.data_source)?,
            verified: draft.verified.unwrap_or(false),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, VenueValidationError> {
    value.ok_or(VenueValidationError::MissingField { field })
}

fn required_text(
    field: &'static str,
    value: Option<String>,
) -> Result<String, VenueValidationError> {
    let value = required(field, value)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VenueValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests;
