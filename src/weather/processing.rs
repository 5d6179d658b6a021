//! 外部APIレスポンスの正規化

use crate::error::{Error, Result};
use chrono::DateTime;
use serde_json::{json, Value};

fn path<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(raw, |value, key| value.get(*key))
}

fn required_f64(raw: &Value, keys: &[&str]) -> Result<f64> {
    path(raw, keys)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::Upstream(format!("missing numeric field {}", keys.join("."))))
}

/// 0.5 は正の方向に丸める
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn rounded_or_na(raw: &Value, keys: &[&str]) -> Value {
    match path(raw, keys).and_then(Value::as_f64) {
        Some(v) => json!(round_half_up(v)),
        None => json!("N/A"),
    }
}

fn clock_time(unix_secs: Option<i64>) -> Value {
    unix_secs
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| json!(t.format("%H:%M:%S").to_string()))
        .unwrap_or(Value::Null)
}

fn percent(value: Option<&Value>) -> Value {
    match value {
        Some(v) if v.is_number() => json!(format!("{}%", v)),
        _ => json!("N/A"),
    }
}

/// OpenWeatherMap の現在の天気を正規化
pub fn process_earth(raw: &Value) -> Result<Value> {
    let visibility = path(raw, &["visibility"])
        .and_then(Value::as_f64)
        .map(|meters| format!("{:.1} km", meters / 1000.0))
        .unwrap_or_else(|| "N/A".to_string());

    let conditions = raw
        .get("weather")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|w| w.get("description").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let mut wind = json!({
        "speed": path(raw, &["wind", "speed"]).cloned().unwrap_or(Value::Null),
        "direction": path(raw, &["wind", "deg"]).cloned().unwrap_or(Value::Null),
        "unit": "m/s"
    });
    if let Some(gust) = path(raw, &["wind", "gust"]) {
        wind["gust"] = gust.clone();
    }

    Ok(json!({
        "location": raw.get("name").cloned().unwrap_or(Value::Null),
        "coordinates": {
            "lat": required_f64(raw, &["coord", "lat"])?,
            "lon": required_f64(raw, &["coord", "lon"])?
        },
        "temperature": {
            "current": round_half_up(required_f64(raw, &["main", "temp"])?),
            "feels_like": round_half_up(required_f64(raw, &["main", "feels_like"])?),
            "min": round_half_up(required_f64(raw, &["main", "temp_min"])?),
            "max": round_half_up(required_f64(raw, &["main", "temp_max"])?),
            "unit": "°C"
        },
        "pressure": {
            "value": path(raw, &["main", "pressure"]).cloned().unwrap_or(Value::Null),
            "unit": "hPa"
        },
        "humidity": percent(path(raw, &["main", "humidity"])),
        "wind": wind,
        "clouds": percent(path(raw, &["clouds", "all"])),
        "visibility": visibility,
        "conditions": conditions,
        "sunrise": clock_time(path(raw, &["sys", "sunrise"]).and_then(Value::as_i64)),
        "sunset": clock_time(path(raw, &["sys", "sunset"]).and_then(Value::as_i64))
    }))
}

/// NASA InSight の火星気象を最新のソルについて正規化
pub fn process_mars(raw: &Value) -> Result<Value> {
    let latest_sol = raw
        .get("sol_keys")
        .and_then(Value::as_array)
        .and_then(|keys| keys.last())
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Upstream("No Mars weather data available".to_string()))?;

    let sol = raw
        .get(latest_sol)
        .ok_or_else(|| Error::Upstream(format!("sol {} missing from response", latest_sol)))?;

    let compass = path(sol, &["WD", "most_common", "compass_point"])
        .and_then(Value::as_str)
        .unwrap_or("N/A");
    let season = sol.get("Season").and_then(Value::as_str).unwrap_or("N/A");

    Ok(json!({
        "sol": latest_sol,
        "temperature": {
            "average": rounded_or_na(sol, &["AT", "av"]),
            "min": rounded_or_na(sol, &["AT", "mn"]),
            "max": rounded_or_na(sol, &["AT", "mx"]),
            "unit": "°C"
        },
        "pressure": {
            "average": rounded_or_na(sol, &["PRE", "av"]),
            "unit": "Pa"
        },
        "wind": {
            "speed": rounded_or_na(sol, &["HWS", "av"]),
            "direction": compass,
            "unit": "m/s"
        },
        "season": season
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> Value {
        json!({
            "name": "London",
            "coord": { "lat": 51.51, "lon": -0.13 },
            "main": {
                "temp": 14.6, "feels_like": 13.9, "temp_min": 12.5,
                "temp_max": 16.2, "pressure": 1012, "humidity": 81
            },
            "wind": { "speed": 4.1, "deg": 240 },
            "clouds": { "all": 75 },
            "visibility": 10000,
            "weather": [
                { "description": "broken clouds" },
                { "description": "light rain" }
            ],
            "sys": { "sunrise": 1714536000, "sunset": 1714590000 }
        })
    }

    #[test]
    fn test_process_earth() {
        let data = process_earth(&london()).unwrap();

        assert_eq!(data["location"], "London");
        assert_eq!(data["temperature"]["current"], 15);
        assert_eq!(data["temperature"]["min"], 13);
        assert_eq!(data["humidity"], "81%");
        assert_eq!(data["clouds"], "75%");
        assert_eq!(data["visibility"], "10.0 km");
        assert_eq!(data["conditions"], "broken clouds, light rain");
        assert_eq!(data["sunrise"], "04:00:00");
        assert!(data["wind"].get("gust").is_none());
    }

    #[test]
    fn test_process_earth_missing_temperature() {
        let mut raw = london();
        raw["main"].as_object_mut().unwrap().remove("temp");

        let err = process_earth(&raw).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_process_mars_latest_sol() {
        let raw = json!({
            "sol_keys": ["259", "260"],
            "259": { "AT": { "av": -60.1 } },
            "260": {
                "AT": { "av": -62.3, "mn": -96.8, "mx": -15.5 },
                "PRE": { "av": 720.4 },
                "WD": { "most_common": { "compass_point": "WNW" } },
                "Season": "fall"
            }
        });

        let data = process_mars(&raw).unwrap();
        assert_eq!(data["sol"], "260");
        assert_eq!(data["temperature"]["average"], -62);
        assert_eq!(data["temperature"]["max"], -15);
        assert_eq!(data["pressure"]["average"], 720);
        assert_eq!(data["wind"]["speed"], "N/A");
        assert_eq!(data["wind"]["direction"], "WNW");
        assert_eq!(data["season"], "fall");
    }

    #[test]
    fn test_process_mars_without_sols() {
        let err = process_mars(&json!({ "sol_keys": [] })).unwrap_err();
        assert_eq!(err.to_string(), "Upstream error: No Mars weather data available");
    }
}
