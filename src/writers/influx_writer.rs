//! InfluxDB 1.x HTTP writer.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::InfluxSettings;
use crate::error::{ProcessingError, Result};
use crate::models::MeasurementPoint;
use crate::utils::constants::INFLUX_TIME_PRECISION;
use crate::writers::line_protocol::encode_batch;

pub struct InfluxWriter {
    settings: InfluxSettings,
    timeout: Duration,
}

impl InfluxWriter {
    pub fn new(settings: &InfluxSettings, timeout: Duration) -> Self {
        Self {
            settings: settings.clone(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> String {
        self.settings.endpoint()
    }

    /// Open a connection and check that the server answers.
    pub async fn connect(&self) -> Result<InfluxConnection> {
        let endpoint = self.endpoint();
        debug!(
            "Connecting to {} with user {} on db {}",
            endpoint, self.settings.user, self.settings.database
        );

        let connection_error = |message: String| ProcessingError::SinkConnection {
            endpoint: endpoint.clone(),
            message,
        };

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| connection_error(e.to_string()))?;

        let response = http
            .get(format!("{}/ping", endpoint))
            .send()
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(connection_error(format!(
                "ping returned {}",
                response.status()
            )));
        }

        Ok(InfluxConnection {
            http,
            endpoint: endpoint.clone(),
            database: self.settings.database.clone(),
            user: self.settings.user.clone(),
            password: self.settings.password.clone(),
        })
    }

    /// Write every point in one batch. The connection is released before
    /// returning, whatever the outcome.
    pub async fn write(&self, points: &[MeasurementPoint]) -> Result<usize> {
        if points.is_empty() {
            debug!("No points to push");
            return Ok(0);
        }

        let connection = self.connect().await?;
        connection.write_points(points).await
    }
}

/// A connection scoped to one batch write.
pub struct InfluxConnection {
    http: Client,
    endpoint: String,
    database: String,
    user: String,
    password: String,
}

impl InfluxConnection {
    pub async fn write_points(&self, points: &[MeasurementPoint]) -> Result<usize> {
        let (body, skipped) = encode_batch(points);
        if skipped > 0 {
            warn!("Skipping {} point(s) without writable fields", skipped);
        }
        let written = points.len() - skipped;
        if written == 0 {
            return Ok(0);
        }

        let mut request = self
            .http
            .post(format!("{}/write", self.endpoint))
            .query(&[
                ("db", self.database.as_str()),
                ("precision", INFLUX_TIME_PRECISION),
            ])
            .body(body);

        if !self.user.is_empty() {
            request = request.basic_auth(&self.user, Some(&self.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProcessingError::SinkWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessingError::SinkWrite(format!("{} {}", status, body)));
        }

        info!("Pushed {} point(s) to InfluxDB", written);
        Ok(written)
    }
}

impl Drop for InfluxConnection {
    fn drop(&mut self) {
        debug!("End of InfluxDB connection to {}", self.endpoint);
    }
}
