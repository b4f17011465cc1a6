//! Versioned capture-boundary histories and the per-match memory holding
//! them
//!
//! A history is a mutable head value plus an immutable chain of committed
//! values.  Chains live in an append-only arena and are shared by index, so
//! aliasing one history onto another copies two words regardless of how
//! long either chain is, and memory grows only with the number of commits.

use std::fmt;

use crate::free::{Id, id_type};

id_type! {
    /// Names one history (a register, in TDFA terms)
    pub struct HistoryId("h");
}

#[derive(Debug, Clone, Copy)]
struct Node {
    value: isize,
    prev: Option<usize>,
}

/// The value of a single history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct History {
    cur: Option<isize>,
    prev: Option<usize>,
}

/// Storage for every history touched during one match attempt
#[derive(Debug, Default)]
pub struct Memory {
    histories: Vec<Option<History>>,
    nodes: Vec<Node>,
}

impl Memory {
    /// Create a memory in which the given histories exist but hold nothing
    pub fn new<I: IntoIterator<Item = HistoryId>>(initial: I) -> Self {
        let mut me = Self::default();
        for id in initial {
            *me.slot_mut(id) = Some(History::default());
        }
        me
    }

    fn slot_mut(&mut self, id: HistoryId) -> &mut Option<History> {
        let idx = id.index();
        if idx >= self.histories.len() {
            self.histories.resize(idx + 1, None);
        }
        &mut self.histories[idx]
    }

    fn get(&self, id: HistoryId) -> &History {
        self.histories
            .get(id.index())
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("History {id} read before initialization"))
    }

    fn get_mut(&mut self, id: HistoryId) -> &mut History {
        self.histories
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("History {id} written before initialization"))
    }

    /// Overwrite the head value of `id`
    pub fn set(&mut self, id: HistoryId, value: isize) { self.get_mut(id).cur = Some(value); }

    /// Make `to` an alias of the current contents of `from`
    pub fn reorder(&mut self, to: HistoryId, from: HistoryId) {
        let history = *self.get(from);
        *self.slot_mut(to) = Some(history);
    }

    /// Push the head value of `id` onto its committed chain
    ///
    /// # Panics
    /// Panics if the head of `id` was never set.
    pub fn commit(&mut self, id: HistoryId) {
        let History { cur, prev } = *self.get(id);
        let value = cur.unwrap_or_else(|| panic!("Committing history {id} with no value"));

        let idx = self.nodes.len();
        self.nodes.push(Node { value, prev });
        self.get_mut(id).prev = Some(idx);
    }

    /// Forget everything `id` holds
    pub fn reset(&mut self, id: HistoryId) { *self.slot_mut(id) = Some(History::default()); }

    /// The most recently committed value of `id`
    #[must_use]
    pub fn latest(&self, id: HistoryId) -> Option<isize> { self.committed(id).next() }

    /// Every committed value of `id`, newest first
    #[must_use]
    pub fn committed(&self, id: HistoryId) -> Committed<'_> {
        Committed {
            nodes: &self.nodes,
            next: self.get(id).prev,
        }
    }
}

#[derive(Clone)]
pub struct Committed<'a> {
    nodes: &'a [Node],
    next: Option<usize>,
}

impl fmt::Debug for Committed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl Iterator for Committed<'_> {
    type Item = isize;

    fn next(&mut self) -> Option<isize> {
        let Node { value, prev } = self.nodes[self.next?];
        self.next = prev;
        Some(value)
    }
}

#[cfg(test)]
mod test {
    use super::{HistoryId, Memory};
    use crate::free::Id;

    fn h(i: usize) -> HistoryId { HistoryId::from_index(i) }

    #[test]
    fn commits_share_tails() {
        let mut mem = Memory::new([h(0)]);

        mem.reorder(h(1), h(0));
        mem.set(h(1), 3);
        mem.commit(h(1));

        mem.reorder(h(2), h(1));
        mem.set(h(2), 7);
        mem.commit(h(2));

        assert_eq!(mem.committed(h(0)).next(), None);
        assert_eq!(mem.committed(h(1)).collect::<Vec<_>>(), [3]);
        assert_eq!(mem.committed(h(2)).collect::<Vec<_>>(), [7, 3]);
        assert_eq!(mem.latest(h(2)), Some(7));
    }

    #[test]
    fn set_only_touches_the_head() {
        let mut mem = Memory::new([h(0)]);
        mem.set(h(0), 1);
        mem.commit(h(0));
        mem.set(h(0), 2);
        assert_eq!(mem.latest(h(0)), Some(1));

        mem.commit(h(0));
        assert_eq!(mem.committed(h(0)).collect::<Vec<_>>(), [2, 1]);

        mem.reset(h(0));
        assert_eq!(mem.latest(h(0)), None);
    }

    #[test]
    #[should_panic = "read before initialization"]
    fn unknown_history() {
        let mut mem = Memory::new([h(0)]);
        mem.reorder(h(1), h(5));
    }

    #[test]
    #[should_panic = "with no value"]
    fn commit_needs_value() {
        let mut mem = Memory::new([h(0)]);
        mem.commit(h(0));
    }
}
