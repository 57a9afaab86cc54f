//! Records produced by a run: one [`Snapshot`] per event, plus a [`Summary`].

use std::collections::BTreeMap;

use parse_display::Display;
use serde::Serialize;

use crate::items::{ItemId, ItemRecord};
use crate::randvars::Draw;
use crate::simulator::PendingEvents;
use crate::types::{Duration, Time};
use crate::worker::WorkerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalKind {
    #[display("Drop-off")]
    DropOff,
    #[display("Pickup")]
    Pickup,
}

/// What became of an arriving customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArrivalOutcome {
    /// Drop-off accepted, pair joined the request queue
    Queued { item: ItemId },
    /// Drop-off turned away by the cutoff policy
    Refused,
    /// Pickup took the oldest finished pair
    PickedUp { item: ItemId },
    /// Pickup found no finished pair and left
    EmptyStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventTag {
    #[display("Initial")]
    Initial,
    #[display("Arrival")]
    Arrival {
        /// Draw used to classify the customer
        rnd: f64,
        class: ArrivalKind,
        outcome: ArrivalOutcome,
    },
    #[display("End of service")]
    EndOfService,
    #[display("End of repair")]
    EndOfRepair,
}

impl EventTag {
    pub fn arrival_class(&self) -> Option<ArrivalKind> {
        match self {
            EventTag::Arrival { class, .. } => Some(*class),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Counters {
    pub repairs_completed: u32,
    pub ready_for_pickup: usize,
    pub queue_len: usize,
    pub peak_queue_len: usize,
    pub cumulative_repair_time: Duration,
    pub average_repair_time: f64,
    pub drop_offs: u32,
    pub picked_up: u32,
}

/// One row of the state vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub seq: u64,
    pub event: EventTag,
    pub clock: Time,
    /// Interarrival draw, when this event scheduled the next arrival
    pub next_arrival_draw: Option<Draw>,
    /// Service draw, when this event put the worker at the counter
    pub service_draw: Option<Draw>,
    /// Repair draw, when this event started a fresh repair
    pub repair_draw: Option<Draw>,
    pub pending: PendingEvents,
    pub worker: WorkerState,
    /// Work left on an interrupted repair
    pub interrupted_remaining: Option<Duration>,
    pub counters: Counters,
    pub items: BTreeMap<ItemId, ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub average_repair_time: f64,
    pub peak_queue_len: usize,
    pub ready_for_pickup: usize,
    pub repairs_completed: u32,
    pub peak_average_repair_time: f64,
    pub drop_offs: u32,
    pub refused_drop_offs: u32,
    pub picked_up: u32,
    pub empty_pickups: u32,
    /// Number of recorded snapshots, including the initial one
    pub events: u64,
    /// Clock value of the last recorded event
    pub closed_at: Time,
    /// Whether the event cap stopped the run early
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub snapshots: Vec<Snapshot>,
    pub summary: Summary,
}
