//! # cosmos-rs
//!
//! Spacecraft telemetry service for a space dashboard.
//!
//! Telemetry readings are kept in a bounded history and the latest reading is
//! scored against a trailing window with a rolling z-score and a moving-average
//! deviation test. The HTTP layer also serves planetary weather data.

pub mod cli;
pub mod config;
pub mod error;
pub mod http_server;
pub mod logging;
pub mod monitoring;
pub mod telemetry;
pub mod weather;

pub use error::{Error, Result};
pub use monitoring::{Analysis, AnalysisResult, DetectorConfig, SlidingWindowAnomalyDetector};
pub use telemetry::{Reading, TelemetryHistory, TelemetryStore};
