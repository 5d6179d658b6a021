//! テレメトリ読み取り値

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 1回分の観測値（作成後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// 読み取りID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// 観測時刻
    pub timestamp: DateTime<Utc>,
    /// 電力（W）。検知器が解析する主値
    pub power: f64,
    /// 電圧（V）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    /// 温度（°C）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Reading {
    /// 現在時刻で新しい読み取り値を作成
    pub fn new(power: f64) -> Self {
        Self::at(Utc::now(), power)
    }

    /// 指定時刻で新しい読み取り値を作成
    pub fn at(timestamp: DateTime<Utc>, power: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            power,
            voltage: None,
            temperature: None,
        }
    }

    /// 電圧を設定
    pub fn with_voltage(mut self, voltage: f64) -> Self {
        self.voltage = Some(voltage);
        self
    }

    /// 温度を設定
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// 小数点以下2桁に丸める
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_serializes_camel_case() {
        let reading = Reading::new(101.5).with_voltage(28.4);
        let json = serde_json::to_value(&reading).unwrap();

        assert_eq!(json["power"], 101.5);
        assert_eq!(json["voltage"], 28.4);
        assert!(json.get("temperature").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_reading_without_id_gets_one() {
        let json = r#"{"timestamp":"2024-05-01T12:00:00Z","power":99.2,"temperature":24.1}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.power, 99.2);
        assert_eq!(reading.temperature, Some(24.1));
        assert!(!reading.id.is_nil());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.604), 2.6);
        assert_eq!(round2(-1.236), -1.24);
        assert_eq!(round2(100.0), 100.0);
    }
}
