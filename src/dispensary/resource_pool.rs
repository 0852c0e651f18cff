//! Finite-capacity staff pools
//!
//! A pool grants at most `capacity` concurrent [`Permit`]s and queues every
//! other request in arrival order. Releasing a permit hands the freed slot to
//! the earliest queued requester, who receives a fresh permit in the same step.

use crate::simulation::error::{SimulationError, SimulationResult};
use std::collections::{BTreeSet, VecDeque};

/// Proof of holding one slot of a pool
///
/// A permit can only be created by its pool and is consumed when released, so a
/// slot is never released twice.
#[must_use = "a permit must be released back to its pool"]
#[derive(Debug, PartialEq, Eq)]
pub struct Permit {
    pool: &'static str,
    serial: u64,
}

impl Permit {
    /// Name of the pool that granted this permit
    pub fn pool(&self) -> &'static str {
        self.pool
    }
}

/// Outcome of an acquisition request
#[derive(Debug, PartialEq, Eq)]
pub enum Acquire {
    /// A slot was free; the requester holds it now
    Granted(Permit),
    /// All slots are held; the requester waits at this queue position (0-based)
    Queued {
        /// Number of requesters ahead in the queue
        position: usize,
    },
}

/// A named pool of identical staff members
#[derive(Debug)]
pub struct ResourcePool<T> {
    name: &'static str,
    capacity: usize,
    holders: BTreeSet<u64>,
    waiters: VecDeque<T>,
    next_serial: u64,
    peak_queue_len: usize,
}

impl<T> ResourcePool<T> {
    /// Create a pool with `capacity` slots (must be at least 1)
    pub fn new(name: &'static str, capacity: usize) -> SimulationResult<Self> {
        if capacity == 0 {
            return Err(SimulationError::invariant_violation(format!(
                "pool {} needs at least one slot",
                name
            )));
        }
        Ok(Self {
            name,
            capacity,
            holders: BTreeSet::new(),
            waiters: VecDeque::new(),
            next_serial: 0,
            peak_queue_len: 0,
        })
    }

    /// Request a slot for `requester`
    ///
    /// A free slot is only granted directly when nobody is queued, so grants are
    /// strictly first come, first served.
    pub fn acquire(&mut self, requester: T) -> SimulationResult<Acquire> {
        if self.holders.len() < self.capacity && self.waiters.is_empty() {
            return Ok(Acquire::Granted(self.grant()?));
        }
        self.waiters.push_back(requester);
        self.peak_queue_len = self.peak_queue_len.max(self.waiters.len());
        Ok(Acquire::Queued { position: self.waiters.len() - 1 })
    }

    /// Return a slot; yields the next waiter together with its new permit
    pub fn release(&mut self, permit: Permit) -> SimulationResult<Option<(T, Permit)>> {
        if permit.pool != self.name || !self.holders.remove(&permit.serial) {
            return Err(SimulationError::invariant_violation(format!(
                "pool {} released a slot it never granted (permit from {})",
                self.name, permit.pool
            )));
        }
        match self.waiters.pop_front() {
            Some(next) => {
                let permit = self.grant()?;
                Ok(Some((next, permit)))
            }
            None => Ok(None),
        }
    }

    fn grant(&mut self) -> SimulationResult<Permit> {
        if self.holders.len() >= self.capacity {
            return Err(SimulationError::invariant_violation(format!(
                "pool {} over capacity ({} holders, {} slots)",
                self.name,
                self.holders.len() + 1,
                self.capacity
            )));
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.holders.insert(serial);
        Ok(Permit { pool: self.name, serial })
    }

    /// Pool name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    /// Requesters currently waiting
    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    /// Longest queue observed so far
    pub fn peak_queue_len(&self) -> usize {
        self.peak_queue_len
    }

    /// Total permits granted over the pool's lifetime
    pub fn total_granted(&self) -> u64 {
        self.next_serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(result: SimulationResult<Acquire>) -> Permit {
        match result.unwrap() {
            Acquire::Granted(permit) => permit,
            other => panic!("expected a grant, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ResourcePool::<u32>::new("pharmacists", 0).is_err());
    }

    #[test]
    fn test_grants_up_to_capacity_then_queues() {
        let mut pool = ResourcePool::new("labellers", 2).unwrap();
        let _a = granted(pool.acquire(1));
        let _b = granted(pool.acquire(2));
        assert_eq!(pool.acquire(3).unwrap(), Acquire::Queued { position: 0 });
        assert_eq!(pool.acquire(4).unwrap(), Acquire::Queued { position: 1 });
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.queue_len(), 2);
        assert_eq!(pool.peak_queue_len(), 2);
    }

    #[test]
    fn test_release_hands_slot_to_earliest_waiter() {
        let mut pool = ResourcePool::new("dispensers", 1).unwrap();
        let first = granted(pool.acquire("a"));
        pool.acquire("b").unwrap();
        pool.acquire("c").unwrap();

        let (next, permit) = pool.release(first).unwrap().unwrap();
        assert_eq!(next, "b");
        assert_eq!(pool.in_use(), 1);

        let (next, permit) = pool.release(permit).unwrap().unwrap();
        assert_eq!(next, "c");
        assert!(pool.release(permit).unwrap().is_none());
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.total_granted(), 3);
    }

    #[test]
    fn test_foreign_permit_rejected() {
        let mut pharmacists = ResourcePool::new("pharmacists", 1).unwrap();
        let mut checkers = ResourcePool::<u8>::new("final checkers", 1).unwrap();
        let permit = granted(pharmacists.acquire(1));

        let err = checkers.release(permit).unwrap_err();
        assert!(err.is_invariant_violation());
    }
}
