//! 园区监控
//! 定时拉取区域占用，计算统计并发出占用提醒

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::api::ApiClient;
use crate::auth::{AuthApi, SessionManager};
use crate::error::{AppError, AppResult};
use crate::occupancy::{Alert, NotifiedState, OccupancyNotifier, PatioStats};
use crate::storage::KeyValueStore;

/// 监控循环结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    Shutdown,
    /// 没有有效会话，或后端拒绝了令牌
    SessionLost,
}

/// 单次拉取的结果
#[derive(Debug, Clone)]
pub struct PollReport {
    pub stats: PatioStats,
    pub alerts: Vec<Alert>,
}

pub struct Monitor {
    api: ApiClient,
    notifier: OccupancyNotifier,
    notified: NotifiedState,
}

impl Monitor {
    pub fn new(api: ApiClient, notifier: OccupancyNotifier) -> Self {
        Self {
            api,
            notifier,
            notified: NotifiedState::new(),
        }
    }

    /// 拉取一次占用数据并逐个区域判断提醒
    pub async fn poll_once(&mut self, token: &str) -> AppResult<PollReport> {
        let zones = self.api.fetch_zones(token).await?;

        let mut alerts = Vec::new();
        for zone in &zones {
            alerts.extend(self.notifier.notify(zone, &mut self.notified));
        }

        let stats = PatioStats::from_snapshots(&zones);
        tracing::info!(
            "Patio occupancy {}% ({} occupied, {} available, {} zones)",
            stats.percent,
            stats.occupied,
            stats.available,
            stats.zones.len()
        );
        Ok(PollReport { stats, alerts })
    }

    /// 按固定间隔拉取，直到收到关闭信号或会话失效
    ///
    /// 每次进入循环视为新的监控会话，已提醒记录会被清空。
    pub async fn run<S, A, F>(
        &mut self,
        session: &mut SessionManager<S, A>,
        interval: Duration,
        shutdown: F,
    ) -> MonitorExit
    where
        S: KeyValueStore,
        A: AuthApi,
        F: Future<Output = ()>,
    {
        self.notifier.reset(&mut self.notified);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Monitor shutting down");
                    return MonitorExit::Shutdown;
                }
                _ = ticker.tick() => {}
            }

            let Some(token) = session.current_token().map(str::to_owned) else {
                tracing::warn!("No active session, stopping monitor");
                return MonitorExit::SessionLost;
            };

            match self.poll_once(&token).await {
                Ok(_) => {}
                Err(AppError::Auth(reason)) => {
                    tracing::warn!("Backend rejected the session: {}", reason);
                    session.logout().await;
                    return MonitorExit::SessionLost;
                }
                Err(e) => {
                    tracing::error!("Failed to fetch zone occupancy: {}", e);
                }
            }
        }
    }
}
