//! InfluxDB line protocol encoding.
//!
//! `weather,geohash=u140rwkt humidity=95i,temperature=7.7 1574079580000`

use crate::models::{FieldValue, MeasurementPoint};

/// Encode one point, or `None` when it has no representable field.
pub fn encode_point(point: &MeasurementPoint) -> Option<String> {
    if !point.has_fields() {
        return None;
    }

    let fields: Vec<String> = point
        .fields
        .iter()
        .filter_map(|(key, value)| {
            format_field_value(value).map(|value| format!("{}={}", escape_key(key), value))
        })
        .collect();

    if fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(&point.measurement);
    for (key, value) in &point.tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }
    line.push(' ');
    line.push_str(&fields.join(","));
    line.push(' ');
    line.push_str(&point.timestamp.to_string());

    Some(line)
}

/// Encode a batch, one line per point. Returns the body and how many points
/// had to be skipped.
pub fn encode_batch(points: &[MeasurementPoint]) -> (String, usize) {
    let lines: Vec<String> = points.iter().filter_map(encode_point).collect();
    let skipped = points.len() - lines.len();
    (lines.join("\n"), skipped)
}

fn format_field_value(value: &FieldValue) -> Option<String> {
    match *value {
        FieldValue::Integer(i) => Some(format!("{}i", i)),
        FieldValue::Float(f) if f.is_finite() => Some(format!("{}", f)),
        FieldValue::Float(_) => None,
    }
}

fn escape_measurement(name: &str) -> String {
    escape(name, &[',', ' '])
}

/// Tag keys, tag values and field keys share the same rules.
fn escape_key(key: &str) -> String {
    escape(key, &[',', '=', ' '])
}

fn escape(input: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
