//! HTTP weather fetcher

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Fetches a JSON document from an upstream weather API
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value>;
}

/// `reqwest`-backed fetcher
pub struct HttpWeatherFetcher {
    client: reqwest::Client,
}

impl HttpWeatherFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cosmos-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WeatherFetcher for HttpWeatherFetcher {
    async fn fetch_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        debug!(url, "fetching upstream weather");
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}
