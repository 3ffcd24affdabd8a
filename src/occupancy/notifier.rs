use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::dispatch::Dispatcher;
use super::snapshot::OccupancySnapshot;

pub const DEFAULT_HIGH_OCCUPANCY_THRESHOLD: u32 = 80;

/// 已提醒记录中的键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotifiedKey {
    /// 某区域在某个百分比上已提醒过
    Percent { zone: String, percent: u32 },
    /// 某区域已提醒过满员
    Full { zone: String },
}

/// 占用提醒
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    HighOccupancy { zone: String, percent: u32 },
    ZoneFull { zone: String },
}

impl Alert {
    pub fn zone(&self) -> &str {
        match self {
            Alert::HighOccupancy { zone, .. } | Alert::ZoneFull { zone } => zone,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Alert::HighOccupancy { .. } => "Ocupação alta",
            Alert::ZoneFull { .. } => "Setor lotado",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Alert::HighOccupancy { zone, percent } => {
                format!("O setor {} está com {}% de ocupação.", zone, percent)
            }
            Alert::ZoneFull { zone } => {
                format!("O setor {} atingiu a capacidade máxima.", zone)
            }
        }
    }

    pub fn metadata(&self) -> Value {
        match self {
            Alert::HighOccupancy { zone, percent } => json!({
                "type": "high_occupancy",
                "zone": zone,
                "percent": percent,
            }),
            Alert::ZoneFull { zone } => json!({
                "type": "zone_full",
                "zone": zone,
                "percent": 100,
            }),
        }
    }
}

/// 本进程内已发出的提醒记录
///
/// 由调用方持有，只有 `reset` 会清空，没有按时间过期。
#[derive(Debug, Default, Clone)]
pub struct NotifiedState {
    keys: HashSet<NotifiedKey>,
}

pub type SharedNotifiedState = Arc<Mutex<NotifiedState>>;

impl NotifiedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedNotifiedState {
        Arc::new(Mutex::new(Self::new()))
    }

    /// 判断快照需要发出哪些提醒，并记录对应的键
    ///
    /// 高占用按精确百分比去重；满员对每个区域只提醒一次。两者可以在同一次
    /// 判断中同时触发。`total == 0` 的区域不提醒。
    pub fn evaluate(&mut self, snapshot: &OccupancySnapshot, threshold: u32) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if snapshot.is_empty_zone() {
            return alerts;
        }

        let percent = snapshot.occupancy_percent();
        let zone = &snapshot.zone_name;

        if percent >= threshold
            && self.keys.insert(NotifiedKey::Percent {
                zone: zone.clone(),
                percent,
            })
        {
            alerts.push(Alert::HighOccupancy {
                zone: zone.clone(),
                percent,
            });
        }

        if percent == 100 && self.keys.insert(NotifiedKey::Full { zone: zone.clone() }) {
            alerts.push(Alert::ZoneFull { zone: zone.clone() });
        }

        alerts
    }

    pub fn reset(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, key: &NotifiedKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotifierConfig {
    pub high_threshold: u32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            high_threshold: DEFAULT_HIGH_OCCUPANCY_THRESHOLD,
        }
    }
}

/// 占用提醒器
#[derive(Clone)]
pub struct OccupancyNotifier {
    dispatcher: Arc<dyn Dispatcher>,
    config: NotifierConfig,
}

impl OccupancyNotifier {
    pub fn new(dispatcher: Arc<dyn Dispatcher>, config: NotifierConfig) -> Self {
        Self { dispatcher, config }
    }

    /// 判断并发出提醒
    ///
    /// 键在发送之前就已记录；每条提醒在独立的 tokio 任务里发送，失败只记日志。
    /// 必须在 tokio 运行时内调用。
    pub fn notify(&self, snapshot: &OccupancySnapshot, state: &mut NotifiedState) -> Vec<Alert> {
        let alerts = state.evaluate(snapshot, self.config.high_threshold);
        for alert in &alerts {
            self.dispatch(alert.clone());
        }
        alerts
    }

    /// 多任务共享记录时使用，判断与记录在同一把锁内完成
    pub async fn notify_shared(
        &self,
        snapshot: &OccupancySnapshot,
        state: &SharedNotifiedState,
    ) -> Vec<Alert> {
        let alerts = {
            let mut guard = state.lock().await;
            guard.evaluate(snapshot, self.config.high_threshold)
        };
        for alert in &alerts {
            self.dispatch(alert.clone());
        }
        alerts
    }

    pub fn reset(&self, state: &mut NotifiedState) {
        tracing::debug!("Clearing {} notified keys", state.len());
        state.reset();
    }

    fn dispatch(&self, alert: Alert) {
        tracing::info!("Occupancy alert for zone {}: {}", alert.zone(), alert.body());
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let body = alert.body();
            if let Err(e) = dispatcher
                .schedule_immediate(alert.title(), &body, &alert.metadata())
                .await
            {
                tracing::warn!("Failed to dispatch alert for zone {}: {}", alert.zone(), e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::{AppError, AppResult};

    /// 把收到的通知转发到通道
    struct ChannelDispatcher {
        tx: mpsc::UnboundedSender<(String, String, Value)>,
        fail: bool,
    }

    #[async_trait]
    impl Dispatcher for ChannelDispatcher {
        async fn schedule_immediate(
            &self,
            title: &str,
            body: &str,
            metadata: &Value,
        ) -> AppResult<()> {
            let _ = self
                .tx
                .send((title.to_string(), body.to_string(), metadata.clone()));
            if self.fail {
                return Err(AppError::Dispatch("permission revoked".into()));
            }
            Ok(())
        }
    }

    fn notifier(fail: bool) -> (OccupancyNotifier, mpsc::UnboundedReceiver<(String, String, Value)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(ChannelDispatcher { tx, fail });
        (OccupancyNotifier::new(dispatcher, NotifierConfig::default()), rx)
    }

    fn percent_key(zone: &str, percent: u32) -> NotifiedKey {
        NotifiedKey::Percent {
            zone: zone.to_string(),
            percent,
        }
    }

    #[test]
    fn eighty_percent_raises_one_high_alert() {
        let mut state = NotifiedState::new();
        let alerts = state.evaluate(&OccupancySnapshot::new("A", 80, 100), 80);

        assert_eq!(
            alerts,
            vec![Alert::HighOccupancy {
                zone: "A".into(),
                percent: 80
            }]
        );
        assert!(state.contains(&percent_key("A", 80)));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn identical_snapshot_does_not_realert() {
        let mut state = NotifiedState::new();
        let snap = OccupancySnapshot::new("A", 80, 100);

        assert_eq!(state.evaluate(&snap, 80).len(), 1);
        assert!(state.evaluate(&snap, 80).is_empty());
    }

    #[test]
    fn full_zone_raises_high_and_full_alerts() {
        let mut state = NotifiedState::new();
        let alerts = state.evaluate(&OccupancySnapshot::new("A", 100, 100), 80);

        assert_eq!(
            alerts,
            vec![
                Alert::HighOccupancy {
                    zone: "A".into(),
                    percent: 100
                },
                Alert::ZoneFull { zone: "A".into() },
            ]
        );
        assert!(state.contains(&percent_key("A", 100)));
        assert!(state.contains(&NotifiedKey::Full { zone: "A".into() }));
    }

    #[test]
    fn empty_zone_never_alerts() {
        let mut state = NotifiedState::new();
        assert!(state.evaluate(&OccupancySnapshot::new("B", 0, 0), 80).is_empty());
        assert!(state.evaluate(&OccupancySnapshot::new("B", 5, 0), 0).is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn below_threshold_is_silent() {
        let mut state = NotifiedState::new();
        assert!(state.evaluate(&OccupancySnapshot::new("A", 79, 100), 80).is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn reset_allows_fresh_alerts() {
        let mut state = NotifiedState::new();
        let snap = OccupancySnapshot::new("A", 80, 100);
        state.evaluate(&snap, 80);

        state.reset();
        assert_eq!(state.evaluate(&snap, 80).len(), 1);
    }

    #[test]
    fn each_unseen_percent_alerts_again() {
        let mut state = NotifiedState::new();
        let mut count = 0;
        for occupied in [82, 78, 82, 84, 78, 84] {
            count += state.evaluate(&OccupancySnapshot::new("A", occupied, 100), 80).len();
        }
        // 82 与 84 各提醒一次，78 低于阈值
        assert_eq!(count, 2);
    }

    #[test]
    fn zones_are_tracked_independently() {
        let mut state = NotifiedState::new();
        assert_eq!(state.evaluate(&OccupancySnapshot::new("A", 9, 10), 80).len(), 1);
        assert_eq!(state.evaluate(&OccupancySnapshot::new("B", 9, 10), 80).len(), 1);
        assert_eq!(state.evaluate(&OccupancySnapshot::new("B", 10, 10), 80).len(), 2);
        assert_eq!(state.evaluate(&OccupancySnapshot::new("A", 10, 10), 80).len(), 2);
    }

    #[test]
    fn alert_text_and_metadata() {
        let alert = Alert::HighOccupancy {
            zone: "Setor A".into(),
            percent: 85,
        };
        assert_eq!(alert.title(), "Ocupação alta");
        assert_eq!(alert.body(), "O setor Setor A está com 85% de ocupação.");
        assert_eq!(alert.metadata()["percent"], 85);
        assert_eq!(Alert::ZoneFull { zone: "B".into() }.metadata()["type"], "zone_full");
    }

    #[tokio::test]
    async fn notify_dispatches_each_alert() {
        let (notifier, mut rx) = notifier(false);
        let mut state = NotifiedState::new();

        let alerts = notifier.notify(&OccupancySnapshot::new("A", 10, 10), &mut state);
        assert_eq!(alerts.len(), 2);

        let mut titles = vec![rx.recv().await.unwrap().0, rx.recv().await.unwrap().0];
        titles.sort();
        assert_eq!(titles, vec!["Ocupação alta", "Setor lotado"]);
    }

    #[tokio::test]
    async fn dispatch_failure_still_records_key() {
        let (notifier, mut rx) = notifier(true);
        let mut state = NotifiedState::new();
        let snap = OccupancySnapshot::new("A", 80, 100);

        assert_eq!(notifier.notify(&snap, &mut state).len(), 1);
        rx.recv().await.unwrap();
        assert!(state.contains(&percent_key("A", 80)));
        assert!(notifier.notify(&snap, &mut state).is_empty());
    }

    #[tokio::test]
    async fn shared_state_deduplicates_across_tasks() {
        let (notifier, _rx) = notifier(false);
        let state = NotifiedState::shared();
        let snap = OccupancySnapshot::new("A", 90, 100);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let notifier = notifier.clone();
            let state = Arc::clone(&state);
            let snap = snap.clone();
            handles.push(tokio::spawn(async move {
                notifier.notify_shared(&snap, &state).await.len()
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn custom_threshold() {
        let mut state = NotifiedState::new();
        assert_eq!(state.evaluate(&OccupancySnapshot::new("A", 6, 10), 60).len(), 1);
    }
}
