use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters kept by a [`LayeredMap`](crate::LayeredMap).
#[derive(Debug, Default, Clone)]
pub struct MapMetrics {
    mutations: u64,
    rejected_writes: u64,
    notifications: u64,
    rotations: u64,
    loads: u64,
}

impl MapMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mutation(&mut self) {
        self.mutations = self.mutations.saturating_add(1);
    }

    pub fn record_rejected_write(&mut self) {
        self.rejected_writes = self.rejected_writes.saturating_add(1);
    }

    pub fn record_notification(&mut self) {
        self.notifications = self.notifications.saturating_add(1);
    }

    pub fn record_rotation(&mut self) {
        self.rotations = self.rotations.saturating_add(1);
    }

    pub fn record_load(&mut self) {
        self.loads = self.loads.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            mutations: self.mutations,
            rejected_writes: self.rejected_writes,
            notifications: self.notifications,
            rotations: self.rotations,
            loads: self.loads,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub mutations: u64,
    pub rejected_writes: u64,
    pub notifications: u64,
    pub rotations: u64,
    pub loads: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "map_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("mutations".to_string(), json!(self.mutations));
        map.insert("rejected_writes".to_string(), json!(self.rejected_writes));
        map.insert("notifications".to_string(), json!(self.notifications));
        map.insert("rotations".to_string(), json!(self.rotations));
        map.insert("loads".to_string(), json!(self.loads));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let mut metrics = MapMetrics::new();
        metrics.record_mutation();
        metrics.record_mutation();
        metrics.record_notification();
        metrics.record_rotation();
        metrics.record_rejected_write();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.mutations, 2);
        assert_eq!(snapshot.notifications, 1);
        assert_eq!(snapshot.rotations, 1);
        assert_eq!(snapshot.rejected_writes, 1);
        assert_eq!(snapshot.loads, 0);
    }

    #[test]
    fn snapshot_converts_to_log_event() {
        let mut metrics = MapMetrics::new();
        metrics.record_load();
        let event = metrics.snapshot().to_log_event("wall_grid::map.metrics");
        assert_eq!(event.message, "map_metrics");
        assert_eq!(event.target, "wall_grid::map.metrics");
        assert_eq!(event.field("loads"), Some(&json!(1)));
    }
}
