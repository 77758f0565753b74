use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::coordinates::validate_coordinates;

/// One public weather station as returned by `getpublicdata`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    #[serde(rename = "_id")]
    #[validate(length(min = 1))]
    pub id: String,

    pub place: Place,

    /// Device id to device block, in document order.
    #[serde(default)]
    pub measures: Map<String, Value>,

    #[serde(default)]
    pub modules: Vec<String>,

    /// Data quality mark. Informational, kept as sent.
    #[serde(default)]
    pub mark: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub location: Location,

    #[serde(default)]
    pub altitude: Option<f64>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub street: Option<String>,

    #[serde(default)]
    pub timezone: Option<String>,
}

/// `[longitude, latitude]`, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location(pub f64, pub f64);

impl Location {
    pub fn longitude(&self) -> f64 {
        self.0
    }

    pub fn latitude(&self) -> f64 {
        self.1
    }
}

impl StationRecord {
    /// Build a station from the raw API value, rejecting anything that
    /// cannot be geohashed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let station_id = value
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();

        let record: StationRecord = serde_json::from_value(value.clone())
            .map_err(|e| ProcessingError::malformed(&station_id, e.to_string()))?;

        record
            .validate()
            .map_err(|e| ProcessingError::malformed(&station_id, e.to_string()))?;

        let location = record.place.location;
        validate_coordinates(location.longitude(), location.latitude())
            .map_err(|message| ProcessingError::malformed(&station_id, message))?;

        Ok(record)
    }

    pub fn location(&self) -> Location {
        self.place.location
    }
}
