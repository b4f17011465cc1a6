//! On-the-fly construction of a tagged DFA

use std::fmt;

use indexmap::IndexMap;

use crate::{history::HistoryId, tnfa::State};

pub mod closure;
pub mod registry;
pub mod remap;
pub mod table;

/// The comparison key of a [`DfaState`]: its TNFA states in priority order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<State>);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, state) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{state}")?;
        }
        f.write_str("}")
    }
}

/// A set of live TNFA states, each paired with one history per tag slot.
///
/// Threads are kept in priority order; the first thread is the one whose
/// captures win if several reach the accepting state.
#[derive(Debug, Clone)]
pub struct DfaState {
    threads: IndexMap<State, Vec<HistoryId>>,
    key: Key,
}

impl fmt::Display for DfaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (state, hists)) in self.threads.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }

            write!(f, "{state}: [")?;
            for (j, hist) in hists.iter().enumerate() {
                if j != 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{hist}")?;
            }
            f.write_str("]")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(State, Vec<HistoryId>)> for DfaState {
    fn from_iter<I: IntoIterator<Item = (State, Vec<HistoryId>)>>(it: I) -> Self {
        let threads: IndexMap<_, _> = it.into_iter().collect();
        let key = Key(threads.keys().copied().collect());
        Self { threads, key }
    }
}

impl DfaState {
    #[must_use]
    #[inline]
    pub fn key(&self) -> &Key { &self.key }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize { self.threads.len() }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool { self.threads.is_empty() }

    /// Every thread, highest priority first
    pub fn threads(&self) -> impl DoubleEndedIterator<Item = (State, &[HistoryId])> {
        self.threads.iter().map(|(&s, h)| (s, h.as_slice()))
    }

    #[must_use]
    pub fn histories_of(&self, state: State) -> Option<&[HistoryId]> {
        self.threads.get(&state).map(Vec::as_slice)
    }
}
