use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Netatmo authentication failed: {0}")]
    Authentication(String),

    #[error("Weather data request failed: {0}")]
    Fetch(String),

    #[error("Malformed record for station {station}: {message}")]
    MalformedRecord { station: String, message: String },

    #[error("Cannot summarize field '{field}': no values recorded")]
    EmptySequence { field: String },

    #[error("Could not connect to InfluxDB at {endpoint}: {message}")]
    SinkConnection { endpoint: String, message: String },

    #[error("InfluxDB rejected the batch write: {0}")]
    SinkWrite(String),
}

impl ProcessingError {
    pub fn malformed(station: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            station: station.into(),
            message: message.into(),
        }
    }

    /// Which stage of a run the error belongs to.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::ConfigSource(_) | Self::Validation(_) => "config",
            Self::Authentication(_) | Self::Fetch(_) => "fetch",
            Self::MalformedRecord { .. } | Self::Json(_) => "parse",
            Self::SinkConnection { .. } | Self::SinkWrite(_) => "sink",
            Self::Io(_) | Self::EmptySequence { .. } => "internal",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            "config" => 2,
            "fetch" => 3,
            "parse" => 4,
            "sink" => 5,
            _ => 1,
        }
    }
}
