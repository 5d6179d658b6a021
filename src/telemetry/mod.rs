//! テレメトリの取り込みと保持
//!
//! 読み取り値の型、容量制限付き履歴、共有ストア、模擬データ生成器、
//! 周期シミュレーションタスクを提供します。

pub mod generator;
pub mod history;
pub mod reading;
pub mod simulation;
pub mod store;

pub use generator::{load_sample_readings, GeneratorConfig, RandomTelemetryGenerator, ReadingSource};
pub use history::TelemetryHistory;
pub use reading::Reading;
pub use simulation::{SimulationController, SimulationStatus};
pub use store::{TelemetrySnapshot, TelemetryStats, TelemetryStore};
