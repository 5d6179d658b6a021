//! 惑星カタログ
//!
//! 地球と火星は外部APIから取得し、それ以外の惑星は科学的推定値の固定テーブルを返す。

use serde_json::{json, Value};

/// 太陽からの順に並んだ惑星キー
pub const PLANET_KEYS: [&str; 8] = [
    "mercury", "venus", "earth", "mars", "jupiter", "saturn", "uranus", "neptune",
];

/// 固定データの出典
pub const MOCK_SOURCE: &str = "Scientific estimates";

/// ライブデータの取得先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveFeed {
    /// OpenWeatherMap 現在の天気
    OpenWeather,
    /// NASA InSight 火星気象
    NasaInsight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanetSource {
    Mock(Value),
    Live(LiveFeed),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub key: &'static str,
    pub name: &'static str,
    pub source: PlanetSource,
}

/// 惑星を名前で検索（大文字小文字を区別しない）
pub fn lookup(name: &str) -> Option<Planet> {
    let key = name.trim().to_ascii_lowercase();
    let (key, name, source) = match key.as_str() {
        "mercury" => (
            "mercury",
            "Mercury",
            PlanetSource::Mock(json!({
                "temperature": { "day": 430, "night": -180, "unit": "°C" },
                "gravity": "3.7 m/s²",
                "atmosphere": "Thin exosphere",
                "wind": "No significant wind"
            })),
        ),
        "venus" => (
            "venus",
            "Venus",
            PlanetSource::Mock(json!({
                "temperature": { "avg": 465, "unit": "°C" },
                "pressure": "92 bar",
                "atmosphere": "96.5% CO₂, 3.5% N₂",
                "wind": { "speed": "300 km/h", "direction": "Retrograde" }
            })),
        ),
        "earth" => ("earth", "Earth", PlanetSource::Live(LiveFeed::OpenWeather)),
        "mars" => ("mars", "Mars", PlanetSource::Live(LiveFeed::NasaInsight)),
        "jupiter" => (
            "jupiter",
            "Jupiter",
            PlanetSource::Mock(json!({
                "temperature": { "cloud_tops": -145, "unit": "°C" },
                "wind": { "speed": "600 km/h" },
                "great_red_spot": { "diameter": "16,350 km", "wind_speed": "432 km/h" }
            })),
        ),
        "saturn" => (
            "saturn",
            "Saturn",
            PlanetSource::Mock(json!({
                "temperature": { "avg": -178, "unit": "°C" },
                "wind": { "speed": "1800 km/h" },
                "ring_system": "Ice and rock particles"
            })),
        ),
        "uranus" => (
            "uranus",
            "Uranus",
            PlanetSource::Mock(json!({
                "temperature": { "avg": -216, "unit": "°C" },
                "wind": { "speed": "900 km/h" },
                "axial_tilt": "97.77°"
            })),
        ),
        "neptune" => (
            "neptune",
            "Neptune",
            PlanetSource::Mock(json!({
                "temperature": { "avg": -214, "unit": "°C" },
                "wind": { "speed": "2100 km/h (fastest in solar system)" }
            })),
        ),
        _ => return None,
    };

    Some(Planet { key, name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_resolves() {
        for key in PLANET_KEYS {
            let planet = lookup(key).unwrap();
            assert_eq!(planet.key, key);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let planet = lookup("  JuPiTeR ").unwrap();
        assert_eq!(planet.name, "Jupiter");
        assert!(matches!(planet.source, PlanetSource::Mock(_)));
    }

    #[test]
    fn test_live_planets() {
        assert_eq!(
            lookup("earth").unwrap().source,
            PlanetSource::Live(LiveFeed::OpenWeather)
        );
        assert_eq!(
            lookup("mars").unwrap().source,
            PlanetSource::Live(LiveFeed::NasaInsight)
        );
    }

    #[test]
    fn test_unknown_planet() {
        assert!(lookup("pluto").is_none());
    }
}
