use crate::error::{Error, Result};
use crate::monitoring::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 設定ファイルの探索候補（先に見つかったものを使う）
pub const CONFIG_CANDIDATES: [&str; 3] = ["cosmos-config.toml", "config.toml", "config/cosmos.toml"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CosmosConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub detector: DetectorConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub log_file: bool,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
            log_file: false,
            log_json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// 保持する最大読み取り数（M）
    pub max_readings: usize,
    /// シミュレーションの生成間隔（ミリ秒）
    pub interval_ms: u64,
    /// サンプルファイルが無い場合に起動時に生成する件数
    pub seed_readings: usize,
    /// 初期データの JSON ファイル
    pub sample_path: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_readings: 100,
            interval_ms: 1000,
            seed_readings: 20,
            sample_path: None,
        }
    }
}

impl TelemetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub openweather_url: String,
    pub openweather_api_key: Option<String>,
    pub nasa_insight_url: String,
    pub nasa_api_key: String,
    pub default_location: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            openweather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            openweather_api_key: None,
            nasa_insight_url: "https://api.nasa.gov/insight_weather/".to_string(),
            nasa_api_key: "DEMO_KEY".to_string(),
            default_location: "London,UK".to_string(),
            timeout_secs: 10,
        }
    }
}

impl CosmosConfig {
    /// 設定を読み込む
    ///
    /// 優先順位（後勝ち）: デフォルト値 → 設定ファイル → `COSMOS_` 環境変数
    /// (例: `COSMOS_SERVER__BIND_ADDR`) → `PORT` / `NASA_API_KEY` / `OWM_API_KEY`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(found) = CONFIG_CANDIDATES.iter().map(Path::new).find(|p| p.exists()) {
                    settings = settings.add_source(config::File::from(found));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("COSMOS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: CosmosConfig = settings.build()?.try_deserialize()?;
        loaded.apply_legacy_overrides(|key| std::env::var(key).ok());
        loaded.validate()?;
        Ok(loaded)
    }

    /// 旧来の環境変数による個別上書き
    pub fn apply_legacy_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => {
                    let host = self
                        .server
                        .bind_addr
                        .rsplit_once(':')
                        .map(|(host, _)| host.to_string())
                        .unwrap_or_else(|| self.server.bind_addr.clone());
                    self.server.bind_addr = format!("{}:{}", host, port);
                }
                Err(_) => tracing::warn!("ignoring invalid PORT value: {}", port),
            }
        }

        if let Some(key) = lookup("NASA_API_KEY") {
            self.weather.nasa_api_key = key;
        }

        if let Some(key) = lookup("OWM_API_KEY") {
            self.weather.openweather_api_key = Some(key);
        }
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<()> {
        let detector = &self.detector;
        if detector.window_size == 0 {
            return Err(Error::InvalidConfiguration(
                "detector.window_size must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("detector.z_score_threshold", detector.z_score_threshold),
            ("detector.deviation_threshold", detector.deviation_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfiguration(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.telemetry.max_readings == 0 {
            return Err(Error::InvalidConfiguration(
                "telemetry.max_readings must be at least 1".to_string(),
            ));
        }
        if self.telemetry.interval_ms == 0 {
            return Err(Error::InvalidConfiguration(
                "telemetry.interval_ms must be positive".to_string(),
            ));
        }
        if self.telemetry.max_readings <= detector.window_size {
            tracing::warn!(
                max_readings = self.telemetry.max_readings,
                window_size = detector.window_size,
                "history capacity does not exceed the detector window; analysis will stay insufficient"
            );
        }

        Ok(())
    }

    /// コメント付きのサンプル設定を生成
    pub fn sample_toml() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())
            .map_err(|e| Error::Internal(format!("failed to render sample config: {}", e)))?;

        Ok(format!(
            r#"# cosmos-rs configuration
#
# Save as cosmos-config.toml. Any value can be overridden from the environment,
# e.g. COSMOS_SERVER__BIND_ADDR=0.0.0.0:3001 or COSMOS_DETECTOR__WINDOW_SIZE=20.
# PORT, NASA_API_KEY and OWM_API_KEY are also honored.
#
# [detector]
# window_size         = readings used as the baseline (W)
# z_score_threshold   = |z| above this marks an anomaly (T)
# deviation_threshold = relative deviation from the moving average (D, 0.2 = 20%)
#
# [telemetry]
# max_readings = readings retained before the oldest is evicted (M)
# sample_path  = optional JSON array of readings loaded at startup

{}"#,
            body
        ))
    }

    /// サンプル設定をファイルに書き出す
    pub fn write_sample(path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, Self::sample_toml()?)?;
        Ok(())
    }
}
