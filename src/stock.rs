//! The two FIFOs of item ids: pairs waiting for repair, and finished pairs
//! waiting for their owner.

use std::collections::VecDeque;

use crate::items::ItemId;

/// Dropped-off pairs awaiting repair, oldest first
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: VecDeque<ItemId>,
}

impl RequestQueue {
    pub fn push(&mut self, id: ItemId) {
        self.pending.push_back(id);
    }

    pub fn pop(&mut self) -> Option<ItemId> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.pending.iter()
    }
}

/// Finished pairs awaiting pickup, oldest first
#[derive(Debug, Clone, Default)]
pub struct ReadyStock {
    finished: VecDeque<ItemId>,
}

impl ReadyStock {
    /// Stock carried over from before the day started
    pub fn with_initial(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            finished: ids.into_iter().collect(),
        }
    }

    pub fn push(&mut self, id: ItemId) {
        self.finished.push_back(id);
    }

    pub fn pop(&mut self) -> Option<ItemId> {
        self.finished.pop_front()
    }

    pub fn len(&self) -> usize {
        self.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finished.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_queue_is_fifo() {
        let mut q = RequestQueue::default();
        q.push(ItemId(4));
        q.push(ItemId(5));
        assert_eq!(q.iter().copied().collect::<Vec<_>>(), vec![ItemId(4), ItemId(5)]);
        assert_eq!(q.pop(), Some(ItemId(4)));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(ItemId(5)));
        assert_eq!(q.pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn ready_stock_serves_oldest_first() {
        let mut stock = ReadyStock::with_initial(vec![ItemId(1), ItemId(2)]);
        stock.push(ItemId(9));
        assert_eq!(stock.len(), 3);
        assert_eq!(stock.pop(), Some(ItemId(1)));
        assert_eq!(stock.pop(), Some(ItemId(2)));
        assert_eq!(stock.pop(), Some(ItemId(9)));
        assert!(stock.pop().is_none());
        assert!(stock.is_empty());
    }
}
