//! 共有テレメトリストア
//!
//! 履歴の唯一の所有者。シミュレーションタスクが追記し、HTTPハンドラーは
//! 読み取りロック中に取得した一貫したコピーだけを検知器に渡す。

use super::history::TelemetryHistory;
use super::reading::Reading;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 履歴の統計情報
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryStats {
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// ある時点の履歴スナップショット
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub current: Option<Reading>,
    pub history: Vec<Reading>,
    pub stats: TelemetryStats,
}

impl TelemetrySnapshot {
    fn new(current: Option<Reading>, history: Vec<Reading>) -> Self {
        let stats = TelemetryStats {
            count: history.len(),
            last_updated: current.as_ref().map(|r| r.timestamp),
        };
        Self {
            current,
            history,
            stats,
        }
    }
}

#[derive(Debug)]
struct StoreState {
    history: TelemetryHistory,
    replay_cursor: usize,
}

/// テレメトリストア（クローン可能なハンドル）
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    state: Arc<RwLock<StoreState>>,
}

impl TelemetryStore {
    /// 最大保持数 `max_readings` のストアを作成
    pub fn new(max_readings: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                history: TelemetryHistory::with_capacity(max_readings),
                replay_cursor: 0,
            })),
        }
    }

    /// 初期データ付きでストアを作成
    pub fn with_readings(max_readings: usize, readings: impl IntoIterator<Item = Reading>) -> Self {
        let mut history = TelemetryHistory::with_capacity(max_readings);
        history.extend(readings);
        Self {
            state: Arc::new(RwLock::new(StoreState {
                history,
                replay_cursor: 0,
            })),
        }
    }

    /// 読み取り値を追記（容量超過時は最古の値を削除）
    pub async fn append(&self, reading: Reading) {
        let mut state = self.state.write().await;
        if let Some(evicted) = state.history.push(reading) {
            debug!(evicted_id = %evicted.id, "oldest reading evicted");
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.history.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.state.read().await.history.capacity()
    }

    /// 全履歴の一貫したコピー
    pub async fn readings(&self) -> Vec<Reading> {
        self.state.read().await.history.to_vec()
    }

    /// 最新値と、その直前の最大 `window` 件を同じロック内で取得
    pub async fn latest_with_preceding(&self, window: usize) -> Option<(Reading, Vec<Reading>)> {
        let state = self.state.read().await;
        let mut readings = state.history.last_n(window.saturating_add(1));
        let latest = readings.pop()?;
        Some((latest, readings))
    }

    /// 最新値と全履歴のスナップショット
    pub async fn snapshot(&self) -> TelemetrySnapshot {
        let state = self.state.read().await;
        TelemetrySnapshot::new(state.history.latest().cloned(), state.history.to_vec())
    }

    /// 再生カーソルを1つ進め、その位置の値とそこまでの履歴を返す
    ///
    /// カーソルが最後のインデックスに達すると先頭に戻る。
    pub async fn advance_replay(&self) -> Result<TelemetrySnapshot> {
        let mut state = self.state.write().await;
        let len = state.history.len();
        if len == 0 {
            return Err(Error::NoReadings);
        }

        if state.replay_cursor >= len - 1 {
            state.replay_cursor = 0;
        }

        let index = state.replay_cursor;
        let current = state.history.get(index).cloned();
        state.replay_cursor += 1;

        let prefix = state
            .history
            .iter()
            .take(state.replay_cursor)
            .cloned()
            .collect();

        Ok(TelemetrySnapshot::new(current, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(powers: &[f64]) -> TelemetryStore {
        TelemetryStore::with_readings(100, powers.iter().map(|&p| Reading::new(p)))
    }

    #[tokio::test]
    async fn test_snapshot_of_empty_store() {
        let store = TelemetryStore::new(10);
        let snapshot = store.snapshot().await;

        assert!(snapshot.current.is_none());
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.stats.count, 0);
        assert!(snapshot.stats.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_append_respects_capacity() {
        let store = TelemetryStore::new(3);
        for p in [1.0, 2.0, 3.0, 4.0, 5.0] {
            store.append(Reading::new(p)).await;
        }

        let powers: Vec<f64> = store.readings().await.iter().map(|r| r.power).collect();
        assert_eq!(powers, vec![3.0, 4.0, 5.0]);
        assert_eq!(store.capacity().await, 3);
    }

    #[tokio::test]
    async fn test_latest_with_preceding() {
        let store = store_of(&[1.0, 2.0, 3.0]);
        let (latest, preceding) = store.latest_with_preceding(10).await.unwrap();

        assert_eq!(latest.power, 3.0);
        assert_eq!(preceding.len(), 2);
        assert!(TelemetryStore::new(5).latest_with_preceding(10).await.is_none());
    }

    #[tokio::test]
    async fn test_latest_with_preceding_limits_to_window() {
        let store = store_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let (latest, preceding) = store.latest_with_preceding(3).await.unwrap();

        let powers: Vec<f64> = preceding.iter().map(|r| r.power).collect();
        assert_eq!(latest.power, 6.0);
        assert_eq!(powers, vec![3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_advance_replay_wraps() {
        let store = store_of(&[1.0, 2.0, 3.0]);

        let first = store.advance_replay().await.unwrap();
        assert_eq!(first.current.unwrap().power, 1.0);
        assert_eq!(first.stats.count, 1);

        let second = store.advance_replay().await.unwrap();
        assert_eq!(second.current.unwrap().power, 2.0);
        assert_eq!(second.history.len(), 2);

        // カーソルが最後のインデックスに達したので先頭に戻る
        let third = store.advance_replay().await.unwrap();
        assert_eq!(third.current.unwrap().power, 1.0);
        assert_eq!(third.stats.count, 1);
    }

    #[tokio::test]
    async fn test_advance_replay_empty_store() {
        let store = TelemetryStore::new(10);
        assert!(matches!(
            store.advance_replay().await,
            Err(Error::NoReadings)
        ));
    }
}
