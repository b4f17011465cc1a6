//! One-to-one renamings of histories, and the copies that carry them out

use std::fmt;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;

use crate::{history::HistoryId, instr::Instruction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Clash {
    #[error("{from} is already mapped to {to}")]
    Source { from: HistoryId, to: HistoryId },
    #[error("{to} is already the image of {from}")]
    Target { from: HistoryId, to: HistoryId },
}

/// A bijection from the histories of a freshly computed DFA state onto the
/// histories of an equivalent, already registered one.
///
/// Pairs are kept in insertion order so the copies derived from a mapping
/// are reproducible.
#[derive(Clone, Default)]
pub struct Mapping {
    fwd: IndexMap<HistoryId, HistoryId>,
    bck: HashMap<HistoryId, HistoryId>,
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Pair(HistoryId, HistoryId);

        impl fmt::Debug for Pair {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} ⇒ {}", self.0, self.1)
            }
        }

        f.debug_set()
            .entries(self.fwd.iter().map(|(&l, &r)| Pair(l, r)))
            .finish()
    }
}

impl Mapping {
    #[must_use]
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    #[inline]
    pub fn image(&self, from: HistoryId) -> Option<HistoryId> { self.fwd.get(&from).copied() }

    #[must_use]
    #[inline]
    pub fn preimage(&self, to: HistoryId) -> Option<HistoryId> { self.bck.get(&to).copied() }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize { self.fwd.len() }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool { self.fwd.is_empty() }

    /// Returns true if a new pair was inserted
    ///
    /// # Errors
    /// Fails if either side is already paired with something else.
    pub fn insert(&mut self, from: HistoryId, to: HistoryId) -> Result<bool, Clash> {
        match (self.image(from), self.preimage(to)) {
            (None, None) => {
                self.fwd.insert(from, to);
                self.bck.insert(to, from);
                Ok(true)
            },
            (Some(t), _) if t != to => Err(Clash::Source { from, to: t }),
            (_, Some(f)) if f != from => Err(Clash::Target { from: f, to }),
            (Some(_), Some(_)) => Ok(false),
            (Some(_), None) | (None, Some(_)) => unreachable!(),
        }
    }

    /// Sequential instructions giving every target history the value its
    /// source held beforehand, as if all copies happened at once.
    ///
    /// Each chain `a → b → c` is copied back to front.  A cycle is broken by
    /// parking one value in `scratch`, which is reset afterwards.
    #[must_use]
    pub fn instructions(&self, scratch: HistoryId) -> Vec<Instruction> {
        let mut out = vec![];
        let mut done = HashSet::new();

        // Chains start at sources that are nobody's target
        for &from in self.fwd.keys() {
            if self.bck.contains_key(&from) {
                continue;
            }

            let mut chain = vec![from];
            while let Some(next) = self.image(chain[chain.len() - 1]) {
                chain.push(next);
            }

            for pair in chain.windows(2).rev() {
                out.push(Instruction::Reorder {
                    to: pair[1],
                    from: pair[0],
                });
            }
            done.extend(chain);
        }

        // Whatever is left lies on a cycle
        for &from in self.fwd.keys() {
            if done.contains(&from) || self.image(from) == Some(from) {
                continue;
            }

            let mut cycle = vec![from];
            loop {
                let next = self.image(cycle[cycle.len() - 1]).unwrap_or_else(|| unreachable!());
                if next == from {
                    break;
                }
                cycle.push(next);
            }

            let last = cycle[cycle.len() - 1];
            out.push(Instruction::Reorder {
                to: scratch,
                from: last,
            });
            for pair in cycle.windows(2).rev() {
                out.push(Instruction::Reorder {
                    to: pair[1],
                    from: pair[0],
                });
            }
            out.push(Instruction::Reorder {
                to: from,
                from: scratch,
            });
            out.push(Instruction::Reset(scratch));
            done.extend(cycle);
        }

        out
    }
}
