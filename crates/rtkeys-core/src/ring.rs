#![forbid(unsafe_code)]

//! Fixed-capacity ring buffer with tombstoned slots.
//!
//! [`EventRing`] keeps the most recent `capacity` writes. Slots have stable
//! indices until they are overwritten, so other structures can refer to an
//! entry by slot. Entries can be removed in place with [`take`](EventRing::take),
//! which leaves an empty slot behind instead of compacting.
//!
//! # Invariants
//!
//! 1. `len() <= capacity()` at all times.
//! 2. `len()` counts written slots, tombstoned or not; it is reset only by
//!    [`clear`](EventRing::clear).
//! 3. [`iter`](EventRing::iter) yields live entries oldest to newest.
//!
//! ```
//! use rtkeys_core::ring::EventRing;
//!
//! let mut ring = EventRing::new(2);
//! ring.push('a');
//! ring.push('b');
//! let (_, evicted) = ring.push('c');
//! assert_eq!(evicted, Some('a'));
//! let live: Vec<char> = ring.iter().map(|(_, c)| *c).collect();
//! assert_eq!(live, vec!['b', 'c']);
//! ```

/// Circular buffer of optional slots.
#[derive(Debug, Clone)]
pub struct EventRing<T> {
    slots: Vec<Option<T>>,
    /// Slot the next push writes to.
    head: usize,
    /// Written slots, capped at capacity.
    len: usize,
}

impl<T> EventRing<T> {
    /// Create a ring with `capacity` slots. A zero capacity is bumped to 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            len: 0,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of written slots (live or tombstoned), at most `capacity`.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written since creation or the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots currently holding an entry.
    pub fn live_len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Write `item` at the next slot, wrapping at capacity.
    ///
    /// Returns the slot written and whatever occupied it before.
    pub fn push(&mut self, item: T) -> (usize, Option<T>) {
        let slot = self.head;
        let evicted = self.slots[slot].replace(item);
        self.head = (self.head + 1) % self.capacity();
        self.len = (self.len + 1).min(self.capacity());
        (slot, evicted)
    }

    /// Slot the next push will write to.
    #[inline]
    pub fn next_slot(&self) -> usize {
        self.head
    }

    /// Entry at `slot`, if the slot exists and is live.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Remove the entry at `slot`, leaving a tombstone.
    pub fn take(&mut self, slot: usize) -> Option<T> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Slot of the most recent write, if any.
    #[cfg(test)]
    fn last_slot(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some((self.head + self.capacity() - 1) % self.capacity())
    }

    /// Slot of the oldest write still inside the window.
    fn oldest_slot(&self) -> usize {
        (self.head + self.capacity() - self.len) % self.capacity()
    }

    /// Live entries with their slot, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        let start = self.oldest_slot();
        let cap = self.capacity();
        (0..self.len).filter_map(move |offset| {
            let slot = (start + offset) % cap;
            self.slots[slot].as_ref().map(|item| (slot, item))
        })
    }

    /// Slots of live entries, oldest first.
    #[cfg(test)]
    fn slots(&self) -> Vec<usize> {
        self.iter().map(|(slot, _)| slot).collect()
    }

    /// Drop every entry and rewind to slot 0.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}
