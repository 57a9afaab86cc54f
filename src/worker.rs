use parse_display::Display;
use serde::Serialize;

use crate::items::ItemId;
use crate::types::{Duration, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    #[display("Free")]
    Free,
    #[display("Serving")]
    Serving,
    #[display("Repairing")]
    Repairing,
}

impl Default for WorkerState {
    fn default() -> Self {
        WorkerState::Free
    }
}

/// The pair currently on the bench
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repair {
    pub item: ItemId,
    /// When work on the pair first began
    pub started: Time,
    /// Total repair time drawn for the pair
    pub duration: Duration,
    /// Expected completion, only meaningful while not interrupted
    pub ends: Time,
}

/// The shop's only worker.
///
/// A counter customer always preempts the bench: the remaining repair time is
/// parked until the counter is free again.
#[derive(Debug, Default)]
pub struct Worker {
    state: WorkerState,
    bench: Option<Repair>,
    /// Remaining time of the repair on the bench, while it is interrupted
    remaining: Option<Duration>,
}

impl Worker {
    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn bench(&self) -> Option<&Repair> {
        self.bench.as_ref()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    pub fn is_interrupted(&self) -> bool {
        self.remaining.is_some()
    }

    /// Put the repair in progress aside, returning the pair and how much work is left on it
    pub fn interrupt(&mut self, now: Time) -> (ItemId, Duration) {
        assert_eq!(self.state, WorkerState::Repairing, "only a running repair can be interrupted");
        assert!(self.remaining.is_none(), "a repair is already interrupted");
        let repair = self
            .bench
            .as_ref()
            .expect("a repairing worker has a pair on the bench");
        let left = repair.ends - now;
        self.remaining = Some(left);
        (repair.item, left)
    }

    /// Go to the counter
    pub fn serve(&mut self) {
        assert!(
            self.state != WorkerState::Repairing || self.is_interrupted(),
            "the running repair must be interrupted before serving"
        );
        self.state = WorkerState::Serving;
    }

    /// Pick the interrupted repair back up, if there is one
    pub fn resume(&mut self, now: Time) -> Option<Repair> {
        let left = self.remaining.take()?;
        let repair = self
            .bench
            .as_mut()
            .expect("an interrupted repair keeps its pair on the bench");
        repair.ends = now + left;
        self.state = WorkerState::Repairing;
        Some(*repair)
    }

    pub fn start_repair(&mut self, item: ItemId, now: Time, duration: Duration) -> Repair {
        assert!(self.bench.is_none(), "bench is occupied");
        let repair = Repair {
            item,
            started: now,
            duration,
            ends: now + duration,
        };
        self.bench = Some(repair);
        self.state = WorkerState::Repairing;
        repair
    }

    /// Take the completed pair off the bench
    pub fn finish_repair(&mut self) -> Repair {
        assert_eq!(self.state, WorkerState::Repairing, "no repair is running");
        let repair = self.bench.take().expect("a repairing worker has a pair on the bench");
        self.state = WorkerState::Free;
        repair
    }

    pub fn idle(&mut self) {
        assert!(self.remaining.is_none(), "cannot idle with an interrupted repair");
        self.state = WorkerState::Free;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_and_resume_keep_remaining_time() {
        let mut w = Worker::default();
        let repair = w.start_repair(ItemId(3), Time(10.0), Duration(15.0));
        assert_eq!(repair.ends, Time(25.0));

        let (item, left) = w.interrupt(Time(12.0));
        assert_eq!(item, ItemId(3));
        assert_eq!(left, Duration(13.0));
        w.serve();
        assert_eq!(w.state(), WorkerState::Serving);
        assert!(w.is_interrupted());

        let resumed = w.resume(Time(16.0)).unwrap();
        assert_eq!(resumed.item, ItemId(3));
        assert_eq!(resumed.started, Time(10.0));
        assert_eq!(resumed.duration, Duration(15.0));
        assert_eq!(resumed.ends, Time(29.0));
        assert_eq!(w.state(), WorkerState::Repairing);
        assert!(!w.is_interrupted());

        let done = w.finish_repair();
        assert_eq!(done.item, ItemId(3));
        assert_eq!(w.state(), WorkerState::Free);
        assert!(w.bench().is_none());
    }

    #[test]
    fn resume_without_interruption_is_none() {
        let mut w = Worker::default();
        w.serve();
        assert!(w.resume(Time(1.0)).is_none());
        w.idle();
        assert_eq!(w.state(), WorkerState::Free);
    }

    #[test]
    #[should_panic(expected = "must be interrupted before serving")]
    fn serving_requires_interrupting_first() {
        let mut w = Worker::default();
        w.start_repair(ItemId(1), Time::ZERO, Duration(10.0));
        w.serve();
    }
}
