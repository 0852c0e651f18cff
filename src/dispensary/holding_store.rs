//! Holding store for finished prescriptions
//!
//! Completed items wait here until a courier collects them. The store is
//! unbounded; a pickup takes everything at once.

use std::collections::VecDeque;

/// Outcome of a `get` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Get<T> {
    /// An item was available and has been removed
    Ready(T),
    /// The store was empty; the getter now waits for the next `put`
    Pending,
}

/// Unbounded FIFO store with blocking get and atomic drain
#[derive(Debug, Clone)]
pub struct HoldingStore<T, W = usize> {
    items: VecDeque<T>,
    getters: VecDeque<W>,
    total_put: u64,
}

impl<T, W> HoldingStore<T, W> {
    /// Create an empty store
    pub fn new() -> Self {
        Self { items: VecDeque::new(), getters: VecDeque::new(), total_put: 0 }
    }

    /// Insert an item
    ///
    /// If a getter is waiting, the item goes straight to the earliest one and is
    /// returned together with it instead of being stored.
    pub fn put(&mut self, item: T) -> Option<(W, T)> {
        self.total_put += 1;
        match self.getters.pop_front() {
            Some(getter) => Some((getter, item)),
            None => {
                self.items.push_back(item);
                None
            }
        }
    }

    /// Remove the oldest item, or register `getter` to wait for one
    pub fn get(&mut self, getter: W) -> Get<T> {
        match self.items.pop_front() {
            Some(item) => Get::Ready(item),
            None => {
                self.getters.push_back(getter);
                Get::Pending
            }
        }
    }

    /// Remove and return every stored item; the store is empty afterwards
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Items currently stored
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Getters blocked on an empty store
    pub fn waiting_getters(&self) -> usize {
        self.getters.len()
    }

    /// Items put over the store's lifetime
    pub fn total_put(&self) -> u64 {
        self.total_put
    }
}

impl<T, W> Default for HoldingStore<T, W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_drain() {
        let mut store: HoldingStore<u32> = HoldingStore::new();
        assert!(store.put(1).is_none());
        assert!(store.put(2).is_none());
        assert_eq!(store.len(), 2);

        assert_eq!(store.drain(), vec![1, 2]);
        assert!(store.is_empty());
        assert!(store.drain().is_empty());
        assert_eq!(store.total_put(), 2);
    }

    #[test]
    fn test_get_ready_in_fifo_order() {
        let mut store: HoldingStore<&str> = HoldingStore::new();
        store.put("a");
        store.put("b");
        assert_eq!(store.get(0), Get::Ready("a"));
        assert_eq!(store.get(0), Get::Ready("b"));
    }

    #[test]
    fn test_blocked_getter_receives_next_put() {
        let mut store: HoldingStore<u32, &str> = HoldingStore::new();
        assert_eq!(store.get("courier-1"), Get::Pending);
        assert_eq!(store.get("courier-2"), Get::Pending);
        assert_eq!(store.waiting_getters(), 2);

        assert_eq!(store.put(7), Some(("courier-1", 7)));
        assert_eq!(store.put(8), Some(("courier-2", 8)));
        assert!(store.put(9).is_none());
        assert_eq!(store.len(), 1);
    }
}
