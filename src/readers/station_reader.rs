use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};
use crate::readers::StationSource;

/// Reads a saved station list: either a full `getpublicdata` response
/// (`{"body": [...]}`) or a bare array of stations.
pub struct StationReader {
    path: PathBuf,
}

impl StationReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_stations(&self) -> Result<Vec<Value>> {
        let content = fs::read_to_string(&self.path)?;
        parse_station_document(&content)
    }
}

/// Extract the station array from a JSON document.
pub fn parse_station_document(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(stations) => Ok(stations),
        Value::Object(mut response) => match response.remove("body") {
            Some(Value::Array(stations)) => Ok(stations),
            _ => Err(ProcessingError::malformed(
                "<document>",
                "expected a station array or an object with a 'body' array",
            )),
        },
        _ => Err(ProcessingError::malformed(
            "<document>",
            "expected a station array or an object with a 'body' array",
        )),
    }
}

#[async_trait]
impl StationSource for StationReader {
    async fn fetch_stations(&self) -> Result<Vec<Value>> {
        self.read_stations()
    }
}
