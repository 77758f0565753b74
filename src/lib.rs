//! Netatmo public weather data collector.
//!
//! Polls the Netatmo `getpublicdata` endpoint for an area, turns every
//! fresh device reading into a `weather` point tagged with the station's
//! geohash, reports per-field averages and pushes the points to InfluxDB.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use config::Settings;
pub use error::{ProcessingError, Result};
