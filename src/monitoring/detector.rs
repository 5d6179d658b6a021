//! 異常検知システム
//!
//! 直近 `W` 件の履歴をベースラインとして、現在の読み取り値の Z-score と
//! 移動平均からの相対偏差を計算する。どちらかが閾値を超えれば異常とする。

use crate::telemetry::reading::{round2, Reading};
use serde::{Deserialize, Serialize, Serializer};

/// 検知器の設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// ベースラインに使う直近の件数（W）
    pub window_size: usize,
    /// Z-score の閾値（T）
    pub z_score_threshold: f64,
    /// 移動平均からの相対偏差の閾値（D、0.20 = 20%）
    pub deviation_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            z_score_threshold: 2.5,
            deviation_threshold: 0.20,
        }
    }
}

/// 1回の解析結果
///
/// 内部値は丸めずに保持し、シリアライズ時のみ小数点以下2桁に丸める。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 異常フラグ
    pub is_anomaly: bool,
    /// Z-score（標準偏差が0の場合は0）
    #[serde(serialize_with = "serialize_rounded")]
    pub z_score: f64,
    /// 直近ウィンドウの移動平均
    #[serde(serialize_with = "serialize_rounded")]
    pub moving_avg: f64,
    /// 直近ウィンドウの母標準偏差
    #[serde(serialize_with = "serialize_rounded")]
    pub std_dev: f64,
    /// 移動平均からの相対偏差（比率）。JSONではパーセント表記
    #[serde(rename = "deviation", serialize_with = "serialize_percent")]
    pub deviation_ratio: f64,
}

impl AnalysisResult {
    /// 相対偏差をパーセントで返す
    pub fn deviation_percent(&self) -> f64 {
        self.deviation_ratio * 100.0
    }
}

fn serialize_rounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*value))
}

fn serialize_percent<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*value * 100.0))
}

/// 解析の結果。履歴不足は異常ではなく正常な戻り値
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Analysis {
    /// ベースラインを作るには履歴が足りない
    Insufficient { required: usize, available: usize },
    /// 判定済み
    Complete(AnalysisResult),
}

impl Analysis {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Analysis::Insufficient { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Analysis::Complete(result) => Some(result),
            Analysis::Insufficient { .. } => None,
        }
    }

    /// 判定済みかつ異常の場合のみ true
    pub fn is_anomaly(&self) -> bool {
        self.result().map(|r| r.is_anomaly).unwrap_or(false)
    }
}

/// スライディングウィンドウ異常検知器
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowAnomalyDetector {
    config: DetectorConfig,
}

impl SlidingWindowAnomalyDetector {
    /// 新しい検知器を作成（ウィンドウサイズは最低1）
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config: DetectorConfig {
                window_size: config.window_size.max(1),
                ..config
            },
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    /// `current` を、それ以前の読み取り値 `history` の末尾 W 件と比較する
    ///
    /// `history` は到着順に並んでいる前提で、並べ替えも変更もしない。
    pub fn analyze(&self, current: &Reading, history: &[Reading]) -> Analysis {
        let window = self.config.window_size;
        if history.len() < window {
            return Analysis::Insufficient {
                required: window,
                available: history.len(),
            };
        }

        let recent = &history[history.len() - window..];
        let n = window as f64;

        // 全て同値なら sum / n の丸め誤差を持ち込まず分散0とする
        let first = recent[0].power;
        let (mean, std_dev) = if recent.iter().all(|r| r.power == first) {
            (first, 0.0)
        } else {
            let mean = recent.iter().map(|r| r.power).sum::<f64>() / n;
            let variance = recent
                .iter()
                .map(|r| (r.power - mean).powi(2))
                .sum::<f64>()
                / n;
            (mean, variance.sqrt())
        };

        let z_score = if std_dev != 0.0 {
            (current.power - mean) / std_dev
        } else {
            0.0
        };

        let moving_avg = mean;
        // 移動平均が0(加算誤差の範囲内)の場合、偏差判定は行わない
        let scale = recent.iter().fold(0.0_f64, |acc, r| acc.max(r.power.abs()));
        let deviation_ratio = if moving_avg.abs() > f64::EPSILON * n * scale {
            (current.power - moving_avg).abs() / moving_avg
        } else {
            0.0
        };

        let is_anomaly = z_score.abs() > self.config.z_score_threshold
            || deviation_ratio > self.config.deviation_threshold;

        Analysis::Complete(AnalysisResult {
            is_anomaly,
            z_score,
            moving_avg,
            std_dev,
            deviation_ratio,
        })
    }
}
