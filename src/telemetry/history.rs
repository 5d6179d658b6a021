//! 容量制限付きテレメトリ履歴
//!
//! 到着順に読み取り値を保持し、容量 `M` を超えると最も古い値から削除する（FIFO）。

use super::reading::Reading;
use std::collections::VecDeque;

/// 容量制限付きの読み取り履歴
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl TelemetryHistory {
    /// 指定容量で空の履歴を作成（容量0は1として扱う）
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 読み取り値を追加し、容量超過で削除された値を返す
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = if self.readings.len() >= self.capacity {
            self.readings.pop_front()
        } else {
            None
        };
        self.readings.push_back(reading);
        evicted
    }

    /// 最新の読み取り値
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// 末尾 `n` 件を古い順に返す
    pub fn last_n(&self, n: usize) -> Vec<Reading> {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip).cloned().collect()
    }

    pub fn get(&self, index: usize) -> Option<&Reading> {
        self.readings.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 全履歴のコピーを古い順に返す
    pub fn to_vec(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }
}

impl Extend<Reading> for TelemetryHistory {
    fn extend<I: IntoIterator<Item = Reading>>(&mut self, iter: I) {
        for reading in iter {
            self.push(reading);
        }
    }
}
