//! テレメトリ異常監視
//!
//! このモジュールは、スライディングウィンドウ異常検知と
//! 重複抑制付きのアラート管理を提供します。

pub mod alerts;
pub mod detector;

pub use alerts::{AnomalyAlert, AnomalyAlertTracker};
pub use detector::{Analysis, AnalysisResult, DetectorConfig, SlidingWindowAnomalyDetector};
