use std::collections::BTreeMap;

use parse_display::Display;
use serde::Serialize;

use crate::types::Time;

/// Identifies one pair of shoes for the whole day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[display("{0}")]
pub struct ItemId(pub u32);

/// Lifecycle of a pair of shoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    #[display("Ready for pickup")]
    ReadyForPickup,
    #[display("Queued")]
    Queued,
    #[display("Repairing")]
    Repairing,
    #[display("Interrupted")]
    Interrupted,
    #[display("Picked up")]
    PickedUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemRecord {
    pub state: ItemState,
    /// Only set while the item is `Repairing`
    pub repair_started: Option<Time>,
}

impl ItemRecord {
    fn new(state: ItemState) -> Self {
        Self {
            state,
            repair_started: None,
        }
    }
}

/// Owns every tracked item and hands out ids in increasing order.
///
/// Picked-up items stay visible until [`ItemRegistry::retire_departed`] is
/// called, so the snapshot taken right after the pickup still shows them.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    last_id: u32,
    items: BTreeMap<ItemId, ItemRecord>,
    departing: Vec<ItemId>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    fn next_id(&mut self) -> ItemId {
        self.last_id += 1;
        ItemId(self.last_id)
    }

    /// Create `count` finished pairs, ids `1..=count`
    pub fn seed_stock(&mut self, count: u32) -> Vec<ItemId> {
        (0..count)
            .map(|_| {
                let id = self.next_id();
                self.items.insert(id, ItemRecord::new(ItemState::ReadyForPickup));
                id
            })
            .collect()
    }

    /// A dropped-off pair waiting for repair
    pub fn create_queued(&mut self) -> ItemId {
        let id = self.next_id();
        self.items.insert(id, ItemRecord::new(ItemState::Queued));
        id
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.get(&id)
    }

    fn transition(&mut self, id: ItemId, from: ItemState, to: ItemState) -> &mut ItemRecord {
        let record = self
            .items
            .get_mut(&id)
            .unwrap_or_else(|| panic!("item {} is not tracked", id));
        assert_eq!(
            record.state, from,
            "item {} must be {} to become {}",
            id, from, to
        );
        record.state = to;
        record
    }

    pub fn start_repair(&mut self, id: ItemId, now: Time) {
        self.transition(id, ItemState::Queued, ItemState::Repairing)
            .repair_started = Some(now);
    }

    pub fn interrupt(&mut self, id: ItemId) {
        self.transition(id, ItemState::Repairing, ItemState::Interrupted)
            .repair_started = None;
    }

    pub fn resume(&mut self, id: ItemId, started: Time) {
        self.transition(id, ItemState::Interrupted, ItemState::Repairing)
            .repair_started = Some(started);
    }

    pub fn finish_repair(&mut self, id: ItemId) {
        self.transition(id, ItemState::Repairing, ItemState::ReadyForPickup)
            .repair_started = None;
    }

    pub fn pick_up(&mut self, id: ItemId) {
        self.transition(id, ItemState::ReadyForPickup, ItemState::PickedUp);
        self.departing.push(id);
    }

    /// Forget items picked up before the last recorded snapshot
    pub fn retire_departed(&mut self) {
        for id in self.departing.drain(..) {
            self.items.remove(&id);
        }
    }

    pub fn count(&self, state: ItemState) -> usize {
        self.items.values().filter(|r| r.state == state).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy of the current item states, for a snapshot
    pub fn view(&self) -> BTreeMap<ItemId, ItemRecord> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_continue_after_seeded_stock() {
        let mut reg = ItemRegistry::new();
        assert_eq!(reg.seed_stock(3), vec![ItemId(1), ItemId(2), ItemId(3)]);
        assert_eq!(reg.create_queued(), ItemId(4));
        assert_eq!(reg.count(ItemState::ReadyForPickup), 3);
        assert_eq!(reg.count(ItemState::Queued), 1);
    }

    #[test]
    fn repair_lifecycle_with_interruption() {
        let mut reg = ItemRegistry::new();
        let id = reg.create_queued();

        reg.start_repair(id, Time(5.0));
        assert_eq!(reg.get(id).unwrap().repair_started, Some(Time(5.0)));

        reg.interrupt(id);
        let rec = reg.get(id).unwrap();
        assert_eq!(rec.state, ItemState::Interrupted);
        assert_eq!(rec.repair_started, None);

        reg.resume(id, Time(5.0));
        assert_eq!(reg.get(id).unwrap().state, ItemState::Repairing);

        reg.finish_repair(id);
        let rec = reg.get(id).unwrap();
        assert_eq!(rec.state, ItemState::ReadyForPickup);
        assert_eq!(rec.repair_started, None);
    }

    #[test]
    fn picked_up_items_linger_until_retired() {
        let mut reg = ItemRegistry::new();
        let ids = reg.seed_stock(2);

        reg.pick_up(ids[0]);
        assert_eq!(reg.get(ids[0]).unwrap().state, ItemState::PickedUp);
        assert_eq!(reg.len(), 2);

        reg.retire_departed();
        assert!(reg.get(ids[0]).is_none());
        assert_eq!(reg.len(), 1);

        // nothing left to retire
        reg.retire_departed();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    #[should_panic(expected = "must be Queued")]
    fn cannot_repair_finished_item() {
        let mut reg = ItemRegistry::new();
        let ids = reg.seed_stock(1);
        reg.start_repair(ids[0], Time::ZERO);
    }

    #[test]
    fn display_names() {
        assert_eq!(ItemState::ReadyForPickup.to_string(), "Ready for pickup");
        assert_eq!(ItemState::PickedUp.to_string(), "Picked up");
        assert_eq!(ItemId(7).to_string(), "7");
    }
}
