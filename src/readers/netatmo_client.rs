//! Netatmo public data client.
//!
//! One client serves one run: the access token is requested with the OAuth2
//! password grant on first use and reused for every retry. Token refresh is
//! not needed at that lifetime.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::{BoundingBox, NetatmoSettings};
use crate::error::{ProcessingError, Result};
use crate::readers::StationSource;
use crate::utils::constants::{NETATMO_PUBLIC_DATA_URL, NETATMO_TOKEN_URL};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PublicDataResponse {
    #[serde(default)]
    body: Vec<Value>,
}

pub struct NetatmoClient {
    http: Client,
    settings: NetatmoSettings,
    area: BoundingBox,
    token_url: String,
    public_data_url: String,
    access_token: OnceCell<String>,
}

impl NetatmoClient {
    pub fn new(settings: &NetatmoSettings, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessingError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            settings: settings.clone(),
            area: settings.bounding_box()?,
            token_url: NETATMO_TOKEN_URL.to_string(),
            public_data_url: NETATMO_PUBLIC_DATA_URL.to_string(),
            access_token: OnceCell::new(),
        })
    }

    /// Point the client at other endpoints, e.g. a proxy or a test server.
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        public_data_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.public_data_url = public_data_url.into();
        self
    }

    pub fn area(&self) -> BoundingBox {
        self.area
    }

    async fn access_token(&self) -> Result<&str> {
        let token = self
            .access_token
            .get_or_try_init(|| self.request_token())
            .await?;
        Ok(token.as_str())
    }

    async fn request_token(&self) -> Result<String> {
        info!("Request Netatmo access token");

        let form = [
            ("grant_type", "password"),
            ("username", self.settings.username.as_str()),
            ("password", self.settings.password.as_str()),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("scope", ""),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProcessingError::Authentication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessingError::Authentication(format!("{} {}", status, body)));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ProcessingError::Authentication(format!("Invalid token response: {}", e))
        })?;

        debug!("Access token received");
        if token.refresh_token.is_some() {
            debug!("Refresh token received (unused)");
        }
        if let Some(scope) = &token.scope {
            debug!("Scopes: {}", scope);
        }

        Ok(token.access_token)
    }

    async fn request_public_data(&self, access_token: &str) -> Result<Vec<Value>> {
        let params = [
            ("lat_ne", self.area.lat_ne.to_string()),
            ("lon_ne", self.area.lon_ne.to_string()),
            ("lat_sw", self.area.lat_sw.to_string()),
            ("lon_sw", self.area.lon_sw.to_string()),
            ("filter", "true".to_string()),
        ];

        let response = self
            .http
            .post(&self.public_data_url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| ProcessingError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessingError::Fetch(format!("{} {}", status, body)));
        }

        let data: PublicDataResponse = response.json().await.map_err(|e| {
            ProcessingError::Fetch(format!("Invalid public data response: {}", e))
        })?;

        Ok(data.body)
    }
}

#[async_trait]
impl StationSource for NetatmoClient {
    async fn fetch_stations(&self) -> Result<Vec<Value>> {
        let token = self.access_token().await?;
        self.request_public_data(token).await
    }
}
