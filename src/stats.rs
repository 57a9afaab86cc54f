use serde::Serialize;

use crate::types::Duration;

/// Running totals, updated by the handlers and once per recorded snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub repairs_completed: u32,
    pub cumulative_repair_time: Duration,
    /// Largest request queue length seen at any snapshot
    pub peak_queue_len: usize,
    /// Largest running average repair time seen at any snapshot
    pub peak_average_repair_time: f64,
    pub drop_offs: u32,
    pub refused_drop_offs: u32,
    pub picked_up: u32,
    pub empty_pickups: u32,
}

impl Statistics {
    pub fn record_repair(&mut self, duration: Duration) {
        self.repairs_completed += 1;
        self.cumulative_repair_time += duration;
    }

    /// 0 until the first repair completes
    pub fn average_repair_time(&self) -> f64 {
        if self.repairs_completed == 0 {
            0.0
        } else {
            *self.cumulative_repair_time / self.repairs_completed as f64
        }
    }

    /// Fold the state seen by one snapshot into the peaks
    pub fn observe(&mut self, queue_len: usize) {
        self.peak_queue_len = self.peak_queue_len.max(queue_len);
        self.peak_average_repair_time = self.peak_average_repair_time.max(self.average_repair_time());
    }
}
