use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

use crate::utils::constants::{GEOHASH_TAG, MEASUREMENT_NAME};

/// Numeric value of one field. JSON integers stay integers so the sink can
/// write them as integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn from_number(number: &Number) -> Option<Self> {
        if let Some(i) = number.as_i64() {
            Some(FieldValue::Integer(i))
        } else {
            number.as_f64().map(FieldValue::Float)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Integer(i) => i as f64,
            FieldValue::Float(f) => f,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// A normalized point ready for the time-series sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub fields: BTreeMap<String, FieldValue>,
}

impl MeasurementPoint {
    pub fn new(geohash: &str, timestamp_ms: i64) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(GEOHASH_TAG.to_string(), geohash.to_string());

        Self {
            measurement: MEASUREMENT_NAME.to_string(),
            tags,
            timestamp: timestamp_ms,
            fields: BTreeMap::new(),
        }
    }

    pub fn geohash(&self) -> Option<&str> {
        self.tags.get(GEOHASH_TAG).map(String::as_str)
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Every value seen per field during one run, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAccumulator {
    values: BTreeMap<String, Vec<f64>>,
}

impl FieldAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, field: &str, value: f64) {
        self.values.entry(field.to_string()).or_default().push(value);
    }

    pub fn get(&self, field: &str) -> Option<&[f64]> {
        self.values.get(field).map(Vec::as_slice)
    }

    /// Append another accumulator's values after this one's.
    pub fn merge(&mut self, other: FieldAccumulator) {
        for (field, values) in other.values {
            self.values.entry(field).or_default().extend(values);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.values
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<BTreeMap<String, Vec<f64>>> for FieldAccumulator {
    fn from(values: BTreeMap<String, Vec<f64>>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, Vec<f64>)> for FieldAccumulator {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_from_number() {
        let integer: Number = serde_json::from_str("95").unwrap();
        let float: Number = serde_json::from_str("7.7").unwrap();

        assert_eq!(
            FieldValue::from_number(&integer),
            Some(FieldValue::Integer(95))
        );
        assert_eq!(
            FieldValue::from_number(&float),
            Some(FieldValue::Float(7.7))
        );
        assert_eq!(FieldValue::Integer(95).as_f64(), 95.0);
    }

    #[test]
    fn test_point_carries_single_geohash_tag() {
        let point = MeasurementPoint::new("u140rwkt", 1_574_079_580_000);

        assert_eq!(point.measurement, "weather");
        assert_eq!(point.tags.len(), 1);
        assert_eq!(point.geohash(), Some("u140rwkt"));
        assert!(!point.has_fields());
    }

    #[test]
    fn test_point_serializes_like_source_payload() {
        let mut point = MeasurementPoint::new("u140rwkt", 1_574_079_594_000);
        point.fields.insert("pressure".to_string(), FieldValue::Float(1009.5));

        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(
            value,
            json!({
                "measurement": "weather",
                "tags": {"geohash": "u140rwkt"},
                "timestamp": 1_574_079_594_000_i64,
                "fields": {"pressure": 1009.5}
            })
        );
    }

    #[test]
    fn test_accumulator_record_and_merge() {
        let mut run = FieldAccumulator::new();
        run.record("humidity", 95.0);

        let mut station = FieldAccumulator::new();
        station.record("humidity", 85.0);
        station.record("pressure", 1009.5);
        run.merge(station);

        assert_eq!(run.get("humidity"), Some(&[95.0, 85.0][..]));
        assert_eq!(run.get("pressure"), Some(&[1009.5][..]));
        assert_eq!(run.get("temperature"), None);
        assert_eq!(run.len(), 2);
    }
}
