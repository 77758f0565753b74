//! Collector configuration.
//!
//! Settings come from a JSON file with the `global`, `netatmo` and
//! `influxdb` sections, overridden by `NETATMO_COLLECTOR__<SECTION>__<KEY>`
//! environment variables. They are loaded once at startup and passed by
//! reference from then on.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_INFLUX_PORT, DEFAULT_INTERVAL_SECS, DEFAULT_LOG_LEVEL, DEFAULT_RETRIES,
    DEFAULT_RETRY_BACKOFF_SECS, DEFAULT_TIMEOUT_SECS, ENV_PREFIX, ENV_SEPARATOR,
};
use crate::utils::coordinates::validate_coordinates;

/// Where parsed points are pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    #[default]
    None,
    Influxdb,
}

impl fmt::Display for SinkBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkBackend::None => write!(f, "none"),
            SinkBackend::Influxdb => write!(f, "influxdb"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub global: GlobalSettings,

    #[serde(default)]
    pub netatmo: Option<NetatmoSettings>,

    #[serde(default)]
    pub influxdb: Option<InfluxSettings>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct GlobalSettings {
    pub logging: String,

    /// Freshness window in seconds
    pub interval: u64,

    pub backend: SinkBackend,

    #[validate(range(min = 1))]
    pub retries: u32,

    pub retry_backoff_secs: u64,

    /// Reject readings whose value count differs from the field names
    pub strict_alignment: bool,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            logging: DEFAULT_LOG_LEVEL.to_string(),
            interval: DEFAULT_INTERVAL_SECS,
            backend: SinkBackend::None,
            retries: DEFAULT_RETRIES,
            retry_backoff_secs: DEFAULT_RETRY_BACKOFF_SECS,
            strict_alignment: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GlobalSettings {
    /// Parse the configured level, accepting the `warning` and `critical`
    /// spellings older configuration files use.
    pub fn log_level(&self) -> Result<Level> {
        let level = match self.logging.to_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" | "fatal" => "error".to_string(),
            other => other.to_string(),
        };

        Level::from_str(&level)
            .map_err(|_| ProcessingError::Config(format!("Invalid log level: {}", self.logging)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Deserialize, Validate)]
pub struct NetatmoSettings {
    #[validate(length(min = 1))]
    pub client_id: String,

    #[validate(length(min = 1))]
    pub client_secret: String,

    #[validate(length(min = 1))]
    pub username: String,

    pub password: String,

    /// `[lat_ne, lon_ne, lat_sw, lon_sw]`
    #[validate(length(equal = 4))]
    pub area: Vec<f64>,
}

impl fmt::Debug for NetatmoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetatmoSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("area", &self.area)
            .finish()
    }
}

/// Area queried on the public data endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_ne: f64,
    pub lon_ne: f64,
    pub lat_sw: f64,
    pub lon_sw: f64,
}

impl NetatmoSettings {
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let &[lat_ne, lon_ne, lat_sw, lon_sw] = self.area.as_slice() else {
            return Err(ProcessingError::Config(format!(
                "netatmo.area must hold [lat_ne, lon_ne, lat_sw, lon_sw], got {} values",
                self.area.len()
            )));
        };

        for (lon, lat) in [(lon_ne, lat_ne), (lon_sw, lat_sw)] {
            validate_coordinates(lon, lat)
                .map_err(|message| ProcessingError::Config(format!("netatmo.area: {}", message)))?;
        }

        Ok(BoundingBox {
            lat_ne,
            lon_ne,
            lat_sw,
            lon_sw,
        })
    }
}

#[derive(Clone, Deserialize, Validate)]
pub struct InfluxSettings {
    #[validate(length(min = 1))]
    pub host: String,

    #[serde(default = "default_influx_port")]
    pub port: u16,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[validate(length(min = 1))]
    pub database: String,

    #[serde(default)]
    pub ssl: bool,
}

fn default_influx_port() -> u16 {
    DEFAULT_INFLUX_PORT
}

impl InfluxSettings {
    pub fn endpoint(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl fmt::Debug for InfluxSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .finish()
    }
}

impl Settings {
    /// Load and validate settings from a JSON file plus environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let source = File::from(path).format(FileFormat::Json).required(true);
        Self::build(Config::builder().add_source(source))
    }

    /// Load settings from an in-memory JSON document plus environment overrides.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let source = File::from_str(json, FileFormat::Json);
        Self::build(Config::builder().add_source(source))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    /// Validate every section and the cross-section rules.
    pub fn check(&self) -> Result<()> {
        self.global.validate()?;
        self.global.log_level()?;

        if let Some(netatmo) = &self.netatmo {
            netatmo.validate()?;
            netatmo.bounding_box()?;
        }

        if let Some(influxdb) = &self.influxdb {
            influxdb.validate()?;
        }

        if self.global.backend == SinkBackend::Influxdb && self.influxdb.is_none() {
            return Err(ProcessingError::Config(
                "Missing InfluxDB configuration".to_string(),
            ));
        }

        Ok(())
    }

    pub fn netatmo(&self) -> Result<&NetatmoSettings> {
        self.netatmo
            .as_ref()
            .ok_or_else(|| ProcessingError::Config("Missing Netatmo configuration".to_string()))
    }

    /// Human-readable summary with secrets left out.
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Configuration ===\n");
        summary.push_str(&format!("Log level: {}\n", self.global.logging));
        summary.push_str(&format!("Freshness window: {}s\n", self.global.interval));
        summary.push_str(&format!(
            "Fetch attempts: {} ({}s apart)\n",
            self.global.retries, self.global.retry_backoff_secs
        ));
        summary.push_str(&format!(
            "Strict field alignment: {}\n",
            self.global.strict_alignment
        ));
        summary.push_str(&format!("Backend: {}\n", self.global.backend));

        match &self.netatmo {
            Some(netatmo) => summary.push_str(&format!(
                "Netatmo: client {} as {}, area {:?}\n",
                netatmo.client_id, netatmo.username, netatmo.area
            )),
            None => summary.push_str("Netatmo: not configured\n"),
        }

        if let Some(influxdb) = &self.influxdb {
            summary.push_str(&format!(
                "InfluxDB: {} database {} as {}\n",
                influxdb.endpoint(),
                influxdb.database,
                if influxdb.user.is_empty() {
                    "<anonymous>"
                } else {
                    influxdb.user.as_str()
                }
            ));
        }

        summary
    }
}
