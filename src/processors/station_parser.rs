use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GlobalSettings;
use crate::error::{ProcessingError, Result};
use crate::models::{
    DeviceBlock, FieldAccumulator, MeasurementPoint, StationRecord, TimeSeriesBlock,
};
use crate::processors::freshness::FreshnessWindow;
use crate::utils::constants::GEOHASH_PRECISION;
use crate::utils::geohash;

/// Points and accumulated field values for one run.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub stations: usize,
    pub points: Vec<MeasurementPoint>,
    pub accumulator: FieldAccumulator,
}

/// Turns raw station records into measurement points.
pub struct StationRecordParser {
    window: FreshnessWindow,
    strict_alignment: bool,
}

impl StationRecordParser {
    pub fn new(window: FreshnessWindow) -> Self {
        Self {
            window,
            strict_alignment: false,
        }
    }

    pub fn from_settings(global: &GlobalSettings) -> Self {
        Self::new(FreshnessWindow::new(global.interval))
            .with_strict_alignment(global.strict_alignment)
    }

    /// Fail on readings whose value count differs from the field names
    /// instead of truncating to the shorter list.
    pub fn with_strict_alignment(mut self, strict_alignment: bool) -> Self {
        self.strict_alignment = strict_alignment;
        self
    }

    /// Parse every station. The first malformed station aborts the whole
    /// batch.
    pub fn parse_all(&self, stations: &[Value], now: i64) -> Result<ParsedBatch> {
        let mut batch = ParsedBatch::default();

        for raw in stations {
            let points = self.parse_station(raw, now, &mut batch.accumulator)?;
            batch.points.extend(points);
            batch.stations += 1;
        }

        debug!(
            "Parsed {} point(s) from {} station(s)",
            batch.points.len(),
            batch.stations
        );
        Ok(batch)
    }

    pub fn parse_station(
        &self,
        raw: &Value,
        now: i64,
        accumulator: &mut FieldAccumulator,
    ) -> Result<Vec<MeasurementPoint>> {
        let station = StationRecord::from_value(raw)?;
        self.parse_record(&station, now, accumulator)
    }

    /// Accumulator updates are applied only when the whole station parses.
    pub fn parse_record(
        &self,
        station: &StationRecord,
        now: i64,
        accumulator: &mut FieldAccumulator,
    ) -> Result<Vec<MeasurementPoint>> {
        let location = station.location();
        debug!(
            "Coord: lon={} lat={}",
            location.longitude(),
            location.latitude()
        );
        let geohash = geohash::encode(location.longitude(), location.latitude(), GEOHASH_PRECISION);
        debug!("Coord: geohash={}", geohash);

        let mut points = Vec::new();
        let mut station_values = FieldAccumulator::new();

        for (device_id, raw_block) in &station.measures {
            debug!("Parsing data for device: {}", device_id);

            let block = DeviceBlock::from_value(raw_block).map_err(|message| {
                ProcessingError::malformed(
                    &station.id,
                    format!("device {}: {}", device_id, message),
                )
            })?;

            match block {
                DeviceBlock::TimeSeries(series) => {
                    debug!("Fields: {:?}", series.types);
                    self.parse_series(
                        &station.id,
                        device_id,
                        &series,
                        &geohash,
                        now,
                        &mut points,
                        &mut station_values,
                    )?;
                }
                DeviceBlock::Untyped(_) => {
                    debug!("Device {} has no time series, skipping", device_id);
                }
            }
        }

        accumulator.merge(station_values);
        Ok(points)
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_series(
        &self,
        station_id: &str,
        device_id: &str,
        series: &TimeSeriesBlock,
        geohash: &str,
        now: i64,
        points: &mut Vec<MeasurementPoint>,
        accumulator: &mut FieldAccumulator,
    ) -> Result<()> {
        for reading in &series.readings {
            if !self.window.contains(reading.timestamp, now) {
                debug!("Data is too old: {}", reading.timestamp);
                continue;
            }

            if reading.values.len() != series.types.len() {
                let message = format!(
                    "device {}: {} field name(s) but {} value(s) at {}",
                    device_id,
                    series.types.len(),
                    reading.values.len(),
                    reading.timestamp
                );
                if self.strict_alignment {
                    return Err(ProcessingError::malformed(station_id, message));
                }
                warn!("Station {}: {}, keeping the aligned prefix", station_id, message);
            }

            let timestamp_ms = reading.timestamp.checked_mul(1000).ok_or_else(|| {
                ProcessingError::malformed(
                    station_id,
                    format!("device {}: timestamp {} out of range", device_id, reading.timestamp),
                )
            })?;

            let mut point = MeasurementPoint::new(geohash, timestamp_ms);
            for (field, value) in series.types.iter().zip(&reading.values) {
                debug!("Working on {}={}", field, value.as_f64());
                point.fields.insert(field.clone(), *value);
                accumulator.record(field, value.as_f64());
            }
            points.push(point);
        }

        Ok(())
    }
}

impl Default for StationRecordParser {
    fn default() -> Self {
        Self::new(FreshnessWindow::default())
    }
}
