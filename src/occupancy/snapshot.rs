use serde::{Deserialize, Serialize};

/// 某一区域在某一时刻的占用情况
///
/// `occupied <= total` 由调用方保证，这里不做校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySnapshot {
    pub zone_name: String,
    pub occupied: u32,
    pub total: u32,
}

impl OccupancySnapshot {
    pub fn new(zone_name: impl Into<String>, occupied: u32, total: u32) -> Self {
        Self {
            zone_name: zone_name.into(),
            occupied,
            total,
        }
    }

    pub fn occupancy_percent(&self) -> u32 {
        percent_of(u64::from(self.occupied), u64::from(self.total))
    }

    pub fn available(&self) -> u32 {
        self.total.saturating_sub(self.occupied)
    }

    pub fn is_empty_zone(&self) -> bool {
        self.total == 0
    }
}

/// 四舍五入的百分比，`total == 0` 时为 0
pub fn percent_of(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    // round(part / total * 100)，半数向上
    let rounded = (part * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
