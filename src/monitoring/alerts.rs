//! 異常アラート管理
//!
//! 同じ読み取り値が繰り返し解析されても通知が重複しないよう、
//! `(電力, Z-score)` を小数点以下2桁で丸めたキーで抑制する。

use crate::monitoring::detector::AnalysisResult;
use crate::telemetry::reading::{round2, Reading};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;
use uuid::Uuid;

/// 保持するアラート数のデフォルト
pub const DEFAULT_ALERT_HISTORY: usize = 10;

/// 異常アラート
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAlert {
    /// アラートID
    pub id: Uuid,
    /// 元になった読み取り値のID
    pub reading_id: Uuid,
    /// 発生時刻
    pub timestamp: DateTime<Utc>,
    pub power: f64,
    pub z_score: f64,
    /// 移動平均からの偏差（%）
    pub deviation: f64,
    pub message: String,
}

/// 重複抑制キー（丸めた値を100倍した整数）
type AlertKey = (i64, i64);

fn alert_key(power: f64, z_score: f64) -> AlertKey {
    (
        (round2(power) * 100.0).round() as i64,
        (round2(z_score) * 100.0).round() as i64,
    )
}

/// 重複抑制付きアラートトラッカー
#[derive(Debug)]
pub struct AnomalyAlertTracker {
    last_key: Option<AlertKey>,
    alerts: VecDeque<AnomalyAlert>,
    max_alerts: usize,
}

impl AnomalyAlertTracker {
    pub fn new(max_alerts: usize) -> Self {
        let max_alerts = max_alerts.max(1);
        Self {
            last_key: None,
            alerts: VecDeque::with_capacity(max_alerts),
            max_alerts,
        }
    }

    /// 解析結果を記録し、新しい異常であればアラートを返す
    ///
    /// 正常な結果は直前のキーをリセットするため、同じ値が後で再発すれば再通知される。
    pub fn observe(&mut self, reading: &Reading, result: &AnalysisResult) -> Option<AnomalyAlert> {
        if !result.is_anomaly {
            self.last_key = None;
            return None;
        }

        let key = alert_key(reading.power, result.z_score);
        if self.last_key == Some(key) {
            return None;
        }
        self.last_key = Some(key);

        let power = round2(reading.power);
        let z_score = round2(result.z_score);
        let alert = AnomalyAlert {
            id: Uuid::new_v4(),
            reading_id: reading.id,
            timestamp: Utc::now(),
            power,
            z_score,
            deviation: round2(result.deviation_percent()),
            message: format!("Anomaly Detected! Power: {}W (Z-score: {})", power, z_score),
        };

        warn!(
            reading_id = %reading.id,
            power,
            z_score,
            "🚨 anomaly detected"
        );

        self.alerts.push_front(alert.clone());
        self.alerts.truncate(self.max_alerts);
        Some(alert)
    }

    /// 最近のアラート（新しい順）
    pub fn recent(&self) -> Vec<AnomalyAlert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
        self.last_key = None;
    }
}

impl Default for AnomalyAlertTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_HISTORY)
    }
}
