//! 惑星気象サービス

use super::catalog::{self, LiveFeed, PlanetSource, MOCK_SOURCE, PLANET_KEYS};
use super::fetcher::WeatherFetcher;
use super::processing::{process_earth, process_mars};
use crate::config::WeatherConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// 惑星の気象データ
#[derive(Debug, Clone, Serialize)]
pub struct PlanetWeather {
    pub planet: String,
    pub data: Value,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// 惑星気象サービス
#[derive(Clone)]
pub struct WeatherService {
    config: WeatherConfig,
    fetcher: Arc<dyn WeatherFetcher>,
}

impl WeatherService {
    pub fn new(config: WeatherConfig, fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// 利用可能な惑星キー
    pub fn planets(&self) -> Vec<&'static str> {
        PLANET_KEYS.to_vec()
    }

    /// 惑星の気象データを取得
    pub async fn fetch_planet(&self, name: &str) -> Result<PlanetWeather> {
        let planet = catalog::lookup(name).ok_or_else(|| Error::UnknownPlanet(name.to_string()))?;

        match planet.source {
            PlanetSource::Mock(data) => Ok(PlanetWeather {
                planet: planet.name.to_string(),
                data,
                source: MOCK_SOURCE.to_string(),
                timestamp: Utc::now(),
            }),
            PlanetSource::Live(LiveFeed::OpenWeather) => {
                let location = self.config.default_location.clone();
                self.fetch_earth_location(&location).await
            }
            PlanetSource::Live(LiveFeed::NasaInsight) => self.fetch_mars().await,
        }
    }

    /// 指定地点の地球の天気を取得
    pub async fn fetch_earth_location(&self, location: &str) -> Result<PlanetWeather> {
        let api_key = self.config.openweather_api_key.clone().ok_or_else(|| {
            Error::InvalidConfiguration("OpenWeatherMap API key is not configured".to_string())
        })?;

        let params = [
            ("q", location.to_string()),
            ("units", "metric".to_string()),
            ("appid", api_key),
        ];
        let raw = self
            .fetcher
            .fetch_json(&self.config.openweather_url, &params)
            .await
            .inspect_err(|e| error!("Error fetching earth data: {}", e))?;

        info!(location, "🌍 earth weather fetched");
        Ok(PlanetWeather {
            planet: "Earth".to_string(),
            data: process_earth(&raw)?,
            source: self.config.openweather_url.clone(),
            timestamp: Utc::now(),
        })
    }

    async fn fetch_mars(&self) -> Result<PlanetWeather> {
        let params = [
            ("feedtype", "json".to_string()),
            ("ver", "1.0".to_string()),
            ("api_key", self.config.nasa_api_key.clone()),
        ];
        let raw = self
            .fetcher
            .fetch_json(&self.config.nasa_insight_url, &params)
            .await
            .inspect_err(|e| error!("Error fetching mars data: {}", e))?;

        Ok(PlanetWeather {
            planet: "Mars".to_string(),
            data: process_mars(&raw)?,
            source: self.config.nasa_insight_url.clone(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// 固定レスポンスを返し、受け取ったパラメータを記録する
    struct StubFetcher {
        response: Value,
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl StubFetcher {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl WeatherFetcher for StubFetcher {
        async fn fetch_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
            self.calls.lock().unwrap().push((
                url.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_mock_planet() {
        let service = WeatherService::new(WeatherConfig::default(), StubFetcher::new(json!({})));
        let weather = service.fetch_planet("Saturn").await.unwrap();

        assert_eq!(weather.planet, "Saturn");
        assert_eq!(weather.source, MOCK_SOURCE);
        assert_eq!(weather.data["ring_system"], "Ice and rock particles");
    }

    #[tokio::test]
    async fn test_unknown_planet() {
        let service = WeatherService::new(WeatherConfig::default(), StubFetcher::new(json!({})));
        let err = service.fetch_planet("pluto").await.unwrap_err();
        assert!(matches!(err, Error::UnknownPlanet(name) if name == "pluto"));
    }

    #[tokio::test]
    async fn test_mars_uses_nasa_params() {
        let stub = StubFetcher::new(json!({
            "sol_keys": ["400"],
            "400": { "AT": { "av": -70.2 }, "Season": "winter" }
        }));
        let service = WeatherService::new(WeatherConfig::default(), stub.clone());

        let weather = service.fetch_planet("mars").await.unwrap();
        assert_eq!(weather.planet, "Mars");
        assert_eq!(weather.data["sol"], "400");

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains(&("api_key".to_string(), "DEMO_KEY".to_string())));
    }

    #[tokio::test]
    async fn test_earth_requires_api_key() {
        let service = WeatherService::new(WeatherConfig::default(), StubFetcher::new(json!({})));
        let err = service.fetch_earth_location("Tokyo").await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_earth_location_query() {
        let stub = StubFetcher::new(json!({
            "name": "Tokyo",
            "coord": { "lat": 35.69, "lon": 139.69 },
            "main": { "temp": 21.0, "feels_like": 20.4, "temp_min": 19.8, "temp_max": 22.3 },
            "weather": [{ "description": "clear sky" }]
        }));
        let config = WeatherConfig {
            openweather_api_key: Some("key".to_string()),
            ..WeatherConfig::default()
        };
        let service = WeatherService::new(config, stub.clone());

        let weather = service.fetch_earth_location("Tokyo").await.unwrap();
        assert_eq!(weather.data["location"], "Tokyo");
        assert_eq!(weather.data["conditions"], "clear sky");

        let calls = stub.calls.lock().unwrap();
        assert!(calls[0].1.contains(&("q".to_string(), "Tokyo".to_string())));
        assert!(calls[0].1.contains(&("units".to_string(), "metric".to_string())));
    }
}
