//! テレメトリシミュレーション
//!
//! 一定間隔で生成器から読み取り値を取り出してストアに追記する周期タスク。
//! 開始は冪等で、実行中に再度開始しても何もしない。

use super::generator::ReadingSource;
use super::store::TelemetryStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 開始・停止要求の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationStatus {
    Started,
    AlreadyRunning,
    Stopped,
    NotRunning,
}

impl SimulationStatus {
    /// クライアント向けのメッセージ
    pub fn message(&self) -> &'static str {
        match self {
            Self::Started => "Simulation started",
            Self::AlreadyRunning => "Simulation already running",
            Self::Stopped => "Simulation stopped",
            Self::NotRunning => "Simulation not running",
        }
    }
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// シミュレーションタスクの制御
#[derive(Clone)]
pub struct SimulationController {
    store: TelemetryStore,
    source: Arc<Mutex<Box<dyn ReadingSource>>>,
    interval: Duration,
    task: Arc<Mutex<Option<RunningTask>>>,
}

impl SimulationController {
    pub fn new(store: TelemetryStore, source: Box<dyn ReadingSource>, interval: Duration) -> Self {
        Self {
            store,
            source: Arc::new(Mutex::new(source)),
            interval,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// 周期タスクを開始
    pub async fn start(&self) -> SimulationStatus {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return SimulationStatus::AlreadyRunning;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_simulation(
            self.store.clone(),
            self.source.clone(),
            self.interval,
            cancel.clone(),
        ));
        *task = Some(RunningTask { cancel, handle });

        info!(interval_ms = self.interval.as_millis() as u64, "🛰️ simulation started");
        SimulationStatus::Started
    }

    /// 周期タスクを停止し、終了を待つ
    pub async fn stop(&self) -> SimulationStatus {
        let Some(running) = self.task.lock().await.take() else {
            return SimulationStatus::NotRunning;
        };

        running.cancel.cancel();
        if let Err(e) = running.handle.await {
            debug!("simulation task ended abnormally: {}", e);
        }

        info!("🛑 simulation stopped");
        SimulationStatus::Stopped
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }
}

async fn run_simulation(
    store: TelemetryStore,
    source: Arc<Mutex<Box<dyn ReadingSource>>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let reading = source.lock().await.next_reading();
                debug!(reading_id = %reading.id, power = reading.power, "reading generated");
                store.append(reading).await;
            }
        }
    }
}
