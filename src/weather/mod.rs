//! 惑星気象データ
//!
//! 固定テーブルの惑星データと、地球（OpenWeatherMap）・火星（NASA InSight）の
//! ライブデータ取得を提供します。

pub mod catalog;
pub mod fetcher;
pub mod processing;
pub mod service;

pub use catalog::{LiveFeed, Planet, PlanetSource, PLANET_KEYS};
pub use fetcher::{HttpWeatherFetcher, WeatherFetcher};
pub use service::{PlanetWeather, WeatherService};
