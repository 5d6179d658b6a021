//! テレメトリ生成器
//!
//! 模擬データの上流ソース。電力は 100W ± 2.5W の一様分布で、5% の確率で
//! 0.7〜1.3 倍のスパイクが入る。

use super::reading::{round2, Reading};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// 読み取り値の供給元
pub trait ReadingSource: Send + 'static {
    /// 次の読み取り値を生成
    fn next_reading(&mut self) -> Reading;
}

/// 生成パラメータ
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// 電力の基準値（W）
    pub base_power: f64,
    /// 電力の揺らぎ幅（±W）
    pub power_jitter: f64,
    /// スパイク発生確率
    pub spike_probability: f64,
    /// スパイク倍率の範囲
    pub spike_range: (f64, f64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_power: 100.0,
            power_jitter: 2.5,
            spike_probability: 0.05,
            spike_range: (0.7, 1.3),
        }
    }
}

/// 乱数ベースの生成器
pub struct RandomTelemetryGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl RandomTelemetryGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// シード固定の生成器（テスト用）
    pub fn seeded(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample_power(&mut self) -> f64 {
        let jitter = self.config.power_jitter;
        let mut value = self.config.base_power
            + if jitter > 0.0 {
                self.rng.gen_range(-jitter..jitter)
            } else {
                0.0
            };

        let p = self.config.spike_probability.clamp(0.0, 1.0);
        if self.rng.gen_bool(p) {
            let (low, high) = self.config.spike_range;
            let factor = if high > low {
                self.rng.gen_range(low..high)
            } else {
                low
            };
            value *= factor;
        }
        value
    }
}

impl Default for RandomTelemetryGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl ReadingSource for RandomTelemetryGenerator {
    fn next_reading(&mut self) -> Reading {
        let power = round2(self.sample_power());
        let voltage = round2(28.0 + self.rng.gen_range(0.0..2.0));
        let temperature = round2(20.0 + self.rng.gen_range(0.0..10.0));

        Reading::new(power)
            .with_voltage(voltage)
            .with_temperature(temperature)
    }
}

/// JSON 配列形式のサンプルファイルから読み取り値を読み込む
pub fn load_sample_readings(path: impl AsRef<Path>) -> Result<Vec<Reading>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let readings: Vec<Reading> = serde_json::from_str(&content)?;
    Ok(readings)
}
