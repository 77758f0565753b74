use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{InfluxSettings, Settings, SinkBackend};
use crate::error::{ProcessingError, Result};
use crate::models::MeasurementPoint;
use crate::writers::influx_writer::InfluxWriter;

/// Destination for the normalized points of a run.
#[async_trait]
pub trait PointSink: Send + Sync {
    fn backend(&self) -> SinkBackend;

    /// Returns how many points the backend stored.
    async fn write(&self, points: &[MeasurementPoint]) -> Result<usize>;
}

/// Backend selection plus what the backend needs to connect.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub backend: SinkBackend,
    pub influxdb: Option<InfluxSettings>,
    pub timeout: Duration,
}

impl SinkConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            backend: settings.global.backend,
            influxdb: settings.influxdb.clone(),
            timeout: settings.global.timeout(),
        }
    }

    pub fn none() -> Self {
        Self {
            backend: SinkBackend::None,
            influxdb: None,
            timeout: Duration::from_secs(crate::utils::constants::DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub enum SinkAdapter {
    Noop,
    Influx(InfluxWriter),
}

impl SinkAdapter {
    pub fn new(config: &SinkConfig) -> Result<Self> {
        match config.backend {
            SinkBackend::None => Ok(SinkAdapter::Noop),
            SinkBackend::Influxdb => {
                let influxdb = config.influxdb.as_ref().ok_or_else(|| {
                    ProcessingError::Config("Missing InfluxDB configuration".to_string())
                })?;
                Ok(SinkAdapter::Influx(InfluxWriter::new(influxdb, config.timeout)))
            }
        }
    }
}

#[async_trait]
impl PointSink for SinkAdapter {
    fn backend(&self) -> SinkBackend {
        match self {
            SinkAdapter::Noop => SinkBackend::None,
            SinkAdapter::Influx(_) => SinkBackend::Influxdb,
        }
    }

    async fn write(&self, points: &[MeasurementPoint]) -> Result<usize> {
        match self {
            SinkAdapter::Noop => {
                debug!("No backend configured, dropping {} point(s)", points.len());
                Ok(0)
            }
            SinkAdapter::Influx(writer) => {
                info!("Pushing {} point(s) to InfluxDB", points.len());
                writer.write(points).await
            }
        }
    }
}

/// Push `points` to the backend selected by `config`. Returns how many
/// were stored.
pub async fn write_points(points: &[MeasurementPoint], config: &SinkConfig) -> Result<usize> {
    SinkAdapter::new(config)?.write(points).await
}
