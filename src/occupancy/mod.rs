//! 区域占用
//! 包含占用快照、派生统计和占用提醒

pub mod dispatch;
pub mod notifier;
pub mod snapshot;
pub mod stats;

pub use dispatch::{Dispatcher, LogDispatcher, WebhookDispatcher};
pub use notifier::{
    Alert, DEFAULT_HIGH_OCCUPANCY_THRESHOLD, NotifiedKey, NotifiedState, NotifierConfig,
    OccupancyNotifier, SharedNotifiedState,
};
pub use snapshot::{OccupancySnapshot, percent_of};
pub use stats::{PatioStats, ZoneStats};
