//! The set of DFA states discovered so far

use std::collections::BTreeMap;

use super::{DfaState, Key, remap::Mapping};

/// Every registered DFA state, numbered in order of registration and
/// bucketed by comparison key
#[derive(Debug, Default)]
pub struct Registry {
    states: Vec<DfaState>,
    by_key: BTreeMap<Key, Vec<usize>>,
}

impl Registry {
    #[must_use]
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize { self.states.len() }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    #[must_use]
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&DfaState> { self.states.get(idx) }

    /// # Panics
    /// Panics if `idx` was never handed out by [`register`](Self::register).
    #[must_use]
    pub fn state(&self, idx: usize) -> &DfaState {
        self.get(idx)
            .unwrap_or_else(|| panic!("DFA state {idx} was never registered"))
    }

    /// Add `state` under a new index without looking for an equivalent one
    pub fn register(&mut self, state: DfaState) -> usize {
        let idx = self.states.len();
        tracing::debug!(idx, %state, "Registering DFA state");

        self.by_key.entry(state.key().clone()).or_default().push(idx);
        self.states.push(state);
        idx
    }

    /// Find the first registered state, in registration order, onto which
    /// `candidate` can be renamed
    #[must_use]
    pub fn find_mappable(&self, candidate: &DfaState) -> Option<(usize, Mapping)> {
        self.by_key
            .get(candidate.key())?
            .iter()
            .find_map(|&idx| is_mappable(candidate, &self.states[idx]).map(|m| (idx, m)))
    }
}

/// Pair up the histories of `from` and `onto` slot by slot, failing if the
/// pairing is not one-to-one.  Both states must have the same key.
#[must_use]
pub fn is_mappable(from: &DfaState, onto: &DfaState) -> Option<Mapping> {
    debug_assert_eq!(from.key(), onto.key());

    let mut mapping = Mapping::new();
    for ((_, lhs), (_, rhs)) in from.threads().zip(onto.threads()) {
        debug_assert_eq!(lhs.len(), rhs.len());

        for (&l, &r) in lhs.iter().zip(rhs) {
            mapping.insert(l, r).ok()?;
        }
    }

    Some(mapping)
}
