use parse_display::Display;
use serde::Serialize;

use crate::config::ShopParams;
use crate::items::{ItemRegistry, ItemState};
use crate::randvars::{Draw, UniformSource, VariateGenerator};
use crate::stats::Statistics;
use crate::stock::{ReadyStock, RequestQueue};
use crate::trace::{ArrivalKind, ArrivalOutcome, Counters, EventTag, RunResult, Snapshot, Summary};
use crate::types::Time;
use crate::utils::prelude::*;
use crate::worker::{Worker, WorkerState};

/// The three kinds of scheduled events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EventKind {
    Arrival,
    EndOfService,
    EndOfRepair,
}

/// When each kind of event fires next, `None` when it is not scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PendingEvents {
    pub arrival: Option<Time>,
    pub end_of_service: Option<Time>,
    pub end_of_repair: Option<Time>,
}

impl PendingEvents {
    /// The earliest pending event.
    ///
    /// Ties go to the arrival, then the end of service, then the end of repair.
    pub fn next(&self) -> Option<(EventKind, Time)> {
        let candidates = [
            (EventKind::Arrival, self.arrival),
            (EventKind::EndOfService, self.end_of_service),
            (EventKind::EndOfRepair, self.end_of_repair),
        ];
        candidates
            .iter()
            .fold(None, |best, &(kind, time)| match (best, time) {
                (None, Some(t)) => Some((kind, t)),
                (Some((_, earliest)), Some(t)) if t < earliest => Some((kind, t)),
                _ => best,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.next().is_none()
    }
}

/// Draws consumed while handling one event
#[derive(Debug, Default)]
struct EventDraws {
    next_arrival: Option<Draw>,
    service: Option<Draw>,
    repair: Option<Draw>,
}

/// All state of one simulated day. Built fresh for every run.
#[derive(Debug)]
pub struct SimulationRun<S> {
    params: ShopParams,
    variates: VariateGenerator<S>,

    clock: Time,
    seq: u64,
    pending: PendingEvents,

    worker: Worker,
    requests: RequestQueue,
    ready: ReadyStock,
    items: ItemRegistry,
    stats: Statistics,

    snapshots: Vec<Snapshot>,
}

impl<S: UniformSource> SimulationRun<S> {
    /// Validate the parameters, open the shop and record the initial snapshot
    pub fn new(params: ShopParams, source: S) -> Result<Self> {
        params.validate()?;

        let mut items = ItemRegistry::new();
        let ready = ReadyStock::with_initial(items.seed_stock(params.initial_stock));

        let mut this = Self {
            params,
            variates: VariateGenerator::new(source),
            clock: Time::ZERO,
            seq: 0,
            pending: Default::default(),
            worker: Default::default(),
            requests: Default::default(),
            ready,
            items,
            stats: Default::default(),
            snapshots: vec![],
        };

        let first = this.variates.exponential(this.params.mean_interarrival);
        this.pending.arrival = Some(this.clock + first.duration());
        this.record(
            EventTag::Initial,
            EventDraws {
                next_arrival: Some(first),
                ..Default::default()
            },
        );

        Ok(this)
    }

    pub fn clock(&self) -> Time {
        self.clock
    }

    pub fn pending(&self) -> &PendingEvents {
        &self.pending
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Handle the earliest pending event. Returns `None` once nothing is pending.
    pub fn step(&mut self) -> Option<EventKind> {
        let (kind, time) = self.pending.next()?;
        assert!(
            time >= self.clock,
            "clock would move backwards from {} to {}",
            self.clock,
            time
        );
        self.clock = time;

        let _s = trace_span!("event", seq = self.seq, %kind, %time).entered();
        match kind {
            EventKind::Arrival => self.on_arrival(),
            EventKind::EndOfService => self.on_end_of_service(),
            EventKind::EndOfRepair => self.on_end_of_repair(),
        }
        Some(kind)
    }

    /// Run until no event is pending, or until `max_events` events were handled
    pub fn run(mut self, max_events: Option<u64>) -> RunResult {
        let mut truncated = false;
        while self.step().is_some() {
            let handled = self.seq - 1;
            if max_events.map_or(false, |max| handled >= max) && !self.pending.is_empty() {
                warn!(handled, time = %self.clock, "event cap reached, stopping early");
                truncated = true;
                break;
            }
        }
        self.into_result(truncated)
    }

    #[instrument(level = "debug", skip(self), fields(now = %self.clock))]
    fn on_arrival(&mut self) {
        let now = self.clock;
        let mut draws = EventDraws::default();

        let rnd = self.variates.uniform01();
        let class = if rnd < self.params.pickup_probability {
            ArrivalKind::Pickup
        } else {
            ArrivalKind::DropOff
        };

        // keep customers coming only while the shop is open
        self.pending.arrival = if *now < self.params.day_length {
            let draw = self.variates.exponential(self.params.mean_interarrival);
            draws.next_arrival = Some(draw);
            Some(now + draw.duration())
        } else {
            None
        };

        if class == ArrivalKind::DropOff && !self.params.cutoff.accepts_drop_off(now) {
            self.stats.refused_drop_offs += 1;
            info!(%now, "drop-off refused after cutoff");
            let event = EventTag::Arrival {
                rnd,
                class,
                outcome: ArrivalOutcome::Refused,
            };
            self.record(event, draws);
            return;
        }

        if self.worker.state() == WorkerState::Repairing {
            let (item, left) = self.worker.interrupt(now);
            self.pending.end_of_repair = None;
            self.items.interrupt(item);
            debug!(%item, remaining = %left, "repair interrupted");
        }

        let service = self
            .variates
            .uniform(self.params.service.low, self.params.service.high);
        draws.service = Some(service);
        self.pending.end_of_service = Some(now + service.duration());
        self.worker.serve();

        let outcome = match class {
            ArrivalKind::DropOff => {
                let item = self.items.create_queued();
                self.requests.push(item);
                self.stats.drop_offs += 1;
                ArrivalOutcome::Queued { item }
            }
            ArrivalKind::Pickup => match self.ready.pop() {
                Some(item) => {
                    self.items.pick_up(item);
                    self.stats.picked_up += 1;
                    ArrivalOutcome::PickedUp { item }
                }
                None => {
                    self.stats.empty_pickups += 1;
                    debug!("pickup found no finished pair");
                    ArrivalOutcome::EmptyStock
                }
            },
        };

        self.record(EventTag::Arrival { rnd, class, outcome }, draws);
    }

    #[instrument(level = "debug", skip(self), fields(now = %self.clock))]
    fn on_end_of_service(&mut self) {
        self.pending.end_of_service = None;
        let mut draws = EventDraws::default();

        // an interrupted repair always goes before the queue
        if let Some(repair) = self.worker.resume(self.clock) {
            self.pending.end_of_repair = Some(repair.ends);
            self.items.resume(repair.item, repair.started);
            debug!(item = %repair.item, ends = %repair.ends, "repair resumed");
        } else if let Some(draw) = self.start_next_repair() {
            draws.repair = Some(draw);
        } else {
            self.worker.idle();
        }

        self.record(EventTag::EndOfService, draws);
    }

    #[instrument(level = "debug", skip(self), fields(now = %self.clock))]
    fn on_end_of_repair(&mut self) {
        self.pending.end_of_repair = None;

        let repair = self.worker.finish_repair();
        self.stats.record_repair(repair.duration);
        self.items.finish_repair(repair.item);
        self.ready.push(repair.item);
        debug!(item = %repair.item, duration = %repair.duration, "repair finished");

        let draws = EventDraws {
            repair: self.start_next_repair(),
            ..Default::default()
        };
        self.record(EventTag::EndOfRepair, draws);
    }

    /// Move the head of the request queue onto the bench, if any
    fn start_next_repair(&mut self) -> Option<Draw> {
        let item = self.requests.pop()?;
        let draw = self
            .variates
            .uniform(self.params.repair.low, self.params.repair.high);
        let repair = self.worker.start_repair(item, self.clock, draw.duration());
        self.pending.end_of_repair = Some(repair.ends);
        self.items.start_repair(item, self.clock);
        debug!(%item, ends = %repair.ends, "repair started");
        Some(draw)
    }

    fn record(&mut self, event: EventTag, draws: EventDraws) {
        self.stats.observe(self.requests.len());

        let snapshot = Snapshot {
            seq: self.seq,
            event,
            clock: self.clock,
            next_arrival_draw: draws.next_arrival,
            service_draw: draws.service,
            repair_draw: draws.repair,
            pending: self.pending,
            worker: self.worker.state(),
            interrupted_remaining: self.worker.remaining(),
            counters: Counters {
                repairs_completed: self.stats.repairs_completed,
                ready_for_pickup: self.ready.len(),
                queue_len: self.requests.len(),
                peak_queue_len: self.stats.peak_queue_len,
                cumulative_repair_time: self.stats.cumulative_repair_time,
                average_repair_time: self.stats.average_repair_time(),
                drop_offs: self.stats.drop_offs,
                picked_up: self.stats.picked_up,
            },
            items: self.items.view(),
        };
        debug!(
            seq = self.seq,
            event = %event,
            time = %self.clock,
            worker = %snapshot.worker,
            queue_len = snapshot.counters.queue_len,
            ready = snapshot.counters.ready_for_pickup,
            "recorded snapshot"
        );
        self.snapshots.push(snapshot);

        self.items.retire_departed();
        self.seq += 1;
    }

    fn into_result(self, truncated: bool) -> RunResult {
        debug_assert_eq!(self.items.count(ItemState::ReadyForPickup), self.ready.len());
        let summary = Summary {
            average_repair_time: self.stats.average_repair_time(),
            peak_queue_len: self.stats.peak_queue_len,
            ready_for_pickup: self.ready.len(),
            repairs_completed: self.stats.repairs_completed,
            peak_average_repair_time: self.stats.peak_average_repair_time,
            drop_offs: self.stats.drop_offs,
            refused_drop_offs: self.stats.refused_drop_offs,
            picked_up: self.stats.picked_up,
            empty_pickups: self.stats.empty_pickups,
            events: self.seq,
            closed_at: self.clock,
            truncated,
        };
        info!(
            events = summary.events,
            repairs = summary.repairs_completed,
            avg_repair = summary.average_repair_time,
            peak_queue = summary.peak_queue_len,
            "day finished"
        );
        RunResult {
            snapshots: self.snapshots,
            summary,
        }
    }
}

/// Run one full day with a fresh simulation
pub fn simulate<S: UniformSource>(params: ShopParams, source: S, max_events: Option<u64>) -> Result<RunResult> {
    Ok(SimulationRun::new(params, source)?.run(max_events))
}
