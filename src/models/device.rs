use serde_json::{Map, Value};

use crate::models::measurement::FieldValue;
use crate::utils::constants::{RES_KEY, TYPE_KEY};

/// Per-device payload inside a station's `measures`.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceBlock {
    /// Field names plus timestamped value lists aligned to them.
    TimeSeries(TimeSeriesBlock),
    /// Flat scalars such as rain gauge totals; not turned into points.
    Untyped(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesBlock {
    pub types: Vec<String>,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Seconds since the epoch
    pub timestamp: i64,
    pub values: Vec<FieldValue>,
}

impl DeviceBlock {
    /// Classify a raw device block. The error string describes the shape
    /// violation; the caller attaches station and device context.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let block = value
            .as_object()
            .ok_or_else(|| format!("device block is not an object: {}", value))?;

        let Some(res) = block.get(RES_KEY) else {
            return Ok(DeviceBlock::Untyped(block.clone()));
        };

        let types = parse_types(block.get(TYPE_KEY))?;

        let res = res
            .as_object()
            .ok_or_else(|| format!("'{}' is not an object", RES_KEY))?;

        let readings = res
            .iter()
            .map(|(timestamp, values)| parse_reading(timestamp, values))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DeviceBlock::TimeSeries(TimeSeriesBlock { types, readings }))
    }
}

fn parse_types(value: Option<&Value>) -> Result<Vec<String>, String> {
    let value = value.ok_or_else(|| format!("'{}' present without '{}'", RES_KEY, TYPE_KEY))?;

    value
        .as_array()
        .ok_or_else(|| format!("'{}' is not a list", TYPE_KEY))?
        .iter()
        .map(|name| {
            name.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("field name {} is not a string", name))
        })
        .collect()
}

fn parse_reading(timestamp: &str, values: &Value) -> Result<Reading, String> {
    let timestamp = timestamp
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("timestamp '{}' is not an integer", timestamp))?;

    let values = values
        .as_array()
        .ok_or_else(|| format!("values at {} are not a list", timestamp))?
        .iter()
        .map(|value| {
            match value {
                Value::Number(number) => FieldValue::from_number(number),
                _ => None,
            }
            .ok_or_else(|| format!("value {} at {} is not a number", value, timestamp))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Reading { timestamp, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_time_series_block() {
        let value = json!({
            "res": {"1574079580": [7.7, 95]},
            "type": ["temperature", "humidity"]
        });

        let block = DeviceBlock::from_value(&value).unwrap();
        assert_eq!(
            block,
            DeviceBlock::TimeSeries(TimeSeriesBlock {
                types: vec!["temperature".to_string(), "humidity".to_string()],
                readings: vec![Reading {
                    timestamp: 1_574_079_580,
                    values: vec![FieldValue::Float(7.7), FieldValue::Integer(95)],
                }],
            })
        );
    }

    #[test]
    fn test_rain_gauge_block_is_untyped() {
        let value = json!({
            "rain_24h": 0.404,
            "rain_60min": 0,
            "rain_live": 0,
            "rain_timeutc": 1574079586
        });

        let block = DeviceBlock::from_value(&value).unwrap();
        assert!(matches!(block, DeviceBlock::Untyped(_)));
    }

    #[test]
    fn test_res_without_type_is_rejected() {
        let value = json!({"res": {"1574079594": [1009.5]}});

        let err = DeviceBlock::from_value(&value).unwrap_err();
        assert!(err.contains("'type'"));
    }

    #[test]
    fn test_non_list_values_are_rejected() {
        let value = json!({"res": {"1574079594": 1009.5}, "type": ["pressure"]});
        assert!(DeviceBlock::from_value(&value).is_err());
    }

    #[test]
    fn test_non_numeric_timestamp_is_rejected() {
        let value = json!({"res": {"yesterday": [1009.5]}, "type": ["pressure"]});
        assert!(DeviceBlock::from_value(&value).is_err());
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let value = json!({"res": {"1574079594": ["high"]}, "type": ["pressure"]});
        assert!(DeviceBlock::from_value(&value).is_err());
    }

    #[test]
    fn test_non_object_block_is_rejected() {
        assert!(DeviceBlock::from_value(&json!([1, 2, 3])).is_err());
    }
}
