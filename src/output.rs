use std::fs::File;
use std::io;
use std::io::BufWriter;

use itertools::Itertools;
use serde::Serialize;

use crate::config::{AppConfigExt, SimConfig};
use crate::items::{ItemId, ItemRecord, ItemState};
use crate::randvars::Draw;
use crate::trace::{ArrivalOutcome, EventTag, RunResult, Snapshot, Summary};
use crate::types::Time;
use crate::utils::float::{round2, truncate2};
use crate::utils::prelude::*;

const TRACE_FILE: &str = "trace.csv";
const SUMMARY_FILE: &str = "summary.json";

const FIXED_COLUMNS: &[&str] = &[
    "event_no",
    "event",
    "clock",
    "arrival_rnd",
    "interarrival_time",
    "next_arrival",
    "request_rnd",
    "request_type",
    "request_outcome",
    "service_rnd",
    "service_time",
    "end_of_service",
    "repair_rnd",
    "repair_time",
    "end_of_repair",
    "worker",
    "interrupted_remaining",
    "repairs_completed",
    "ready_for_pickup",
    "queue_len",
    "peak_queue_len",
    "cumulative_repair_time",
    "average_repair_time",
];

fn num(v: f64) -> String {
    format!("{:.2}", round2(v))
}

/// Random numbers are cut at two decimals, never rounded up
fn rnd(v: f64) -> String {
    format!("{:.2}", truncate2(v))
}

fn opt_num(v: Option<f64>) -> String {
    v.map(num).unwrap_or_default()
}

fn opt_time(t: Option<Time>) -> String {
    opt_num(t.map(|t| t.0))
}

fn draw_cells(draw: Option<Draw>) -> [String; 2] {
    [draw.map(|d| rnd(d.rnd)).unwrap_or_default(), opt_num(draw.map(|d| d.value))]
}

fn outcome_cell(outcome: &ArrivalOutcome) -> String {
    match outcome {
        ArrivalOutcome::Queued { item } => format!("Queued #{}", item),
        ArrivalOutcome::Refused => "Refused".into(),
        ArrivalOutcome::PickedUp { item } => format!("Picked up #{}", item),
        ArrivalOutcome::EmptyStock => "Nothing to pick up".into(),
    }
}

fn item_cell(record: Option<&ItemRecord>) -> String {
    match record {
        None => String::new(),
        Some(ItemRecord {
            state: ItemState::Repairing,
            repair_started: Some(started),
        }) => format!("{} since {}", ItemState::Repairing, num(started.0)),
        Some(record) => record.state.to_string(),
    }
}

fn snapshot_row(snap: &Snapshot, item_ids: &[ItemId]) -> Vec<String> {
    let (request_rnd, request_type, request_outcome) = match &snap.event {
        EventTag::Arrival { rnd: u, class, outcome } => (rnd(*u), class.to_string(), outcome_cell(outcome)),
        _ => Default::default(),
    };
    let [arrival_rnd, interarrival] = draw_cells(snap.next_arrival_draw);
    let [service_rnd, service_time] = draw_cells(snap.service_draw);
    let [repair_rnd, repair_time] = draw_cells(snap.repair_draw);
    let c = &snap.counters;

    let mut row = vec![
        snap.seq.to_string(),
        snap.event.to_string(),
        num(snap.clock.0),
        arrival_rnd,
        interarrival,
        opt_time(snap.pending.arrival),
        request_rnd,
        request_type,
        request_outcome,
        service_rnd,
        service_time,
        opt_time(snap.pending.end_of_service),
        repair_rnd,
        repair_time,
        opt_time(snap.pending.end_of_repair),
        snap.worker.to_string(),
        opt_num(snap.interrupted_remaining.map(|d| d.0)),
        c.repairs_completed.to_string(),
        c.ready_for_pickup.to_string(),
        c.queue_len.to_string(),
        c.peak_queue_len.to_string(),
        num(c.cumulative_repair_time.0),
        num(c.average_repair_time),
    ];
    row.extend(item_ids.iter().map(|id| item_cell(snap.items.get(id))));
    row
}

/// Write the state vector as CSV, one row per snapshot and one column per item ever tracked
pub fn write_trace(writer: impl io::Write, snapshots: &[Snapshot]) -> Result<()> {
    let item_ids = snapshots
        .iter()
        .flat_map(|s| s.items.keys().copied())
        .sorted()
        .dedup()
        .collect_vec();

    let mut csv = csv::Writer::from_writer(writer);
    let header = FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(item_ids.iter().map(|id| format!("item_{}", id)));
    csv.write_record(header)?;

    for snap in snapshots {
        csv.write_record(snapshot_row(snap, &item_ids))?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SummaryFile<'a> {
    summary: &'a Summary,
    config: &'a SimConfig,
}

pub fn write_summary(writer: impl io::Write, summary: &Summary, cfg: &SimConfig) -> Result<()> {
    serde_json::to_writer_pretty(writer, &SummaryFile { summary, config: cfg })?;
    Ok(())
}

/// Write trace and summary into the configured output directory
pub fn render(result: &RunResult, cfg: &SimConfig) -> Result<()> {
    let dir = config().output_dir()?;

    let path = dir.file(TRACE_FILE)?;
    write_trace(BufWriter::new(File::create(&path)?), &result.snapshots)?;
    info!(path = %path.display(), rows = result.snapshots.len(), "wrote trace");

    let path = dir.file(SUMMARY_FILE)?;
    write_summary(BufWriter::new(File::create(&path)?), &result.summary, cfg)?;
    info!(path = %path.display(), "wrote summary");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopParams;
    use crate::randvars::seeded_rng;
    use crate::simulator::simulate;

    fn day() -> (SimConfig, RunResult) {
        let cfg = SimConfig {
            seed: Some("output".into()),
            shop: ShopParams {
                initial_stock: 2,
                ..Default::default()
            },
            max_events: None,
        };
        let result = simulate(cfg.shop.clone(), seeded_rng(cfg.seed.as_deref()), None).unwrap();
        (cfg, result)
    }

    #[test]
    fn trace_has_one_row_per_snapshot() {
        let (_, result) = day();
        let mut buf = vec![];
        write_trace(&mut buf, &result.snapshots).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let header = reader.headers().unwrap().clone();
        assert_eq!(&header[0], "event_no");
        assert_eq!(&header[FIXED_COLUMNS.len()], "item_1");

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), result.snapshots.len());
        assert!(rows.iter().all(|r| r.len() == header.len()));

        let first = &rows[0];
        assert_eq!(&first[1], "Initial");
        assert_eq!(&first[2], "0.00");
        assert_eq!(&first[FIXED_COLUMNS.len()], "Ready for pickup");
    }

    #[test]
    fn summary_is_json() {
        let (cfg, result) = day();
        let mut buf = vec![];
        write_summary(&mut buf, &result.summary, &cfg).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            value["summary"]["peak_queue_len"].as_u64(),
            Some(result.summary.peak_queue_len as u64)
        );
        assert_eq!(value["config"]["shop"]["initial_stock"].as_u64(), Some(2));
        assert_eq!(value["config"]["shop"]["cutoff"]["policy"], "no_cutoff");
    }

    #[test]
    fn item_cells() {
        let repairing = ItemRecord {
            state: ItemState::Repairing,
            repair_started: Some(Time(12.3456)),
        };
        assert_eq!(item_cell(Some(&repairing)), "Repairing since 12.35");
        assert_eq!(item_cell(None), "");
    }
}
