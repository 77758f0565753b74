/// Measurement name written for every point
pub const MEASUREMENT_NAME: &str = "weather";

/// Tag carrying the station location
pub const GEOHASH_TAG: &str = "geohash";

/// Geohash length used for station tags
pub const GEOHASH_PRECISION: usize = 8;

/// Device block keys in the Netatmo public data payload
pub const RES_KEY: &str = "res";
pub const TYPE_KEY: &str = "type";

/// Collection defaults
pub const DEFAULT_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment overrides, e.g. NETATMO_COLLECTOR__GLOBAL__INTERVAL=300
pub const ENV_PREFIX: &str = "NETATMO_COLLECTOR";
pub const ENV_SEPARATOR: &str = "__";

/// Netatmo API endpoints
pub const NETATMO_TOKEN_URL: &str = "https://api.netatmo.com/oauth2/token";
pub const NETATMO_PUBLIC_DATA_URL: &str = "https://api.netatmo.com/api/getpublicdata";

/// InfluxDB defaults
pub const DEFAULT_INFLUX_PORT: u16 = 8086;
pub const INFLUX_TIME_PRECISION: &str = "ms";
