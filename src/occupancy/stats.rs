use serde::Serialize;

use super::snapshot::{OccupancySnapshot, percent_of};

/// 单个区域的派生统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneStats {
    pub zone_name: String,
    pub occupied: u32,
    pub total: u32,
    pub available: u32,
    pub percent: u32,
}

impl From<&OccupancySnapshot> for ZoneStats {
    fn from(snap: &OccupancySnapshot) -> Self {
        Self {
            zone_name: snap.zone_name.clone(),
            occupied: snap.occupied,
            total: snap.total,
            available: snap.available(),
            percent: snap.occupancy_percent(),
        }
    }
}

/// 整个园区的汇总统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatioStats {
    pub zones: Vec<ZoneStats>,
    pub occupied: u64,
    pub total: u64,
    pub available: u64,
    pub percent: u32,
}

impl PatioStats {
    pub fn from_snapshots(snapshots: &[OccupancySnapshot]) -> Self {
        let zones: Vec<ZoneStats> = snapshots.iter().map(ZoneStats::from).collect();
        let occupied = zones.iter().map(|z| u64::from(z.occupied)).sum();
        let total = zones.iter().map(|z| u64::from(z.total)).sum();
        let available = zones.iter().map(|z| u64::from(z.available)).sum();

        Self {
            percent: percent_of(occupied, total),
            zones,
            occupied,
            total,
            available,
        }
    }

    /// 占用率最高的区域，并列时取第一个
    pub fn fullest(&self) -> Option<&ZoneStats> {
        self.zones.iter().fold(None, |best: Option<&ZoneStats>, z| match best {
            Some(b) if b.percent >= z.percent => Some(b),
            _ => Some(z),
        })
    }

    pub fn full_zones(&self) -> impl Iterator<Item = &ZoneStats> {
        self.zones.iter().filter(|z| z.total > 0 && z.available == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snaps() -> Vec<OccupancySnapshot> {
        vec![
            OccupancySnapshot::new("A", 8, 10),
            OccupancySnapshot::new("B", 10, 10),
            OccupancySnapshot::new("C", 0, 0),
            OccupancySnapshot::new("D", 1, 20),
        ]
    }

    #[test]
    fn aggregates_counts() {
        let stats = PatioStats::from_snapshots(&snaps());
        assert_eq!(stats.occupied, 19);
        assert_eq!(stats.total, 40);
        assert_eq!(stats.available, 21);
        assert_eq!(stats.percent, 48); // 47.5
        assert_eq!(stats.zones[2].percent, 0);
    }

    #[test]
    fn fullest_prefers_first_on_ties() {
        let mut list = snaps();
        list.push(OccupancySnapshot::new("E", 5, 5));
        let stats = PatioStats::from_snapshots(&list);
        assert_eq!(stats.fullest().unwrap().zone_name, "B");
        let full: Vec<_> = stats.full_zones().map(|z| z.zone_name.as_str()).collect();
        assert_eq!(full, vec!["B", "E"]);
    }

    #[test]
    fn empty_patio() {
        let stats = PatioStats::from_snapshots(&[]);
        assert_eq!(stats.percent, 0);
        assert!(stats.fullest().is_none());
    }
}
