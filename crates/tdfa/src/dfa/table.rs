//! The compiled transition table

use std::fmt;

use crate::{
    input::InputRange,
    instr::{Instruction, List},
};

#[derive(Debug, Clone)]
pub struct Entry {
    pub from: usize,
    pub range: InputRange,
    pub to: usize,
    pub instrs: Vec<Instruction>,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            from,
            range,
            to,
            instrs,
        } = self;
        write!(f, "{from}-{range} -> {to} {}", List(instrs))
    }
}

/// Transitions compiled so far, sorted by source state and then by range.
///
/// A missing entry only means the transition has not been needed yet.
#[derive(Debug, Default)]
pub struct Table(Vec<Entry>);

impl Table {
    #[must_use]
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize { self.0.len() }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Position of the compiled transition out of state `from` on `c`
    #[must_use]
    pub fn find(&self, from: usize, c: char) -> Option<usize> {
        let idx = self
            .0
            .partition_point(|e| (e.from, e.range.to()) < (from, c));
        self.0
            .get(idx)
            .is_some_and(|e| e.from == from && e.range.contains(c))
            .then_some(idx)
    }

    #[must_use]
    #[inline]
    pub fn get(&self, from: usize, c: char) -> Option<&Entry> {
        self.find(from, c).map(|i| &self.0[i])
    }

    /// # Panics
    /// Panics if `idx` is out of bounds.
    #[must_use]
    #[inline]
    pub fn at(&self, idx: usize) -> &Entry { &self.0[idx] }

    /// Add a transition, returning its position
    ///
    /// # Panics
    /// Panics if `range` overlaps a range already compiled for `from`.
    pub fn insert(&mut self, entry: Entry) -> usize {
        let idx = self
            .0
            .partition_point(|e| (e.from, e.range) < (entry.from, entry.range));

        let disjoint = |e: &Entry| {
            e.from != entry.from
                || e.range.to() < entry.range.from()
                || e.range.from() > entry.range.to()
        };
        assert!(
            idx.checked_sub(1).and_then(|i| self.0.get(i)).is_none_or(disjoint)
                && self.0.get(idx).is_none_or(disjoint),
            "Transition {entry} overlaps one already compiled"
        );

        tracing::debug!(%entry, "Compiled transition");
        self.0.insert(idx, entry);
        idx
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.0 {
            writeln!(f, "{entry}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{Entry, Table};
    use crate::{free::Id, history::HistoryId, input::InputRange, instr::Instruction};

    fn entry(from: usize, lo: char, hi: char, to: usize) -> Entry {
        Entry {
            from,
            range: InputRange::new(lo, hi),
            to,
            instrs: vec![],
        }
    }

    #[test]
    fn lookup() {
        let mut table = Table::new();
        table.insert(entry(1, 'm', 'z', 2));
        table.insert(entry(0, 'a', 'c', 1));
        table.insert(entry(1, 'a', 'c', 0));
        table.insert(entry(0, 'x', 'x', 3));

        assert_eq!(table.get(0, 'b').map(|e| e.to), Some(1));
        assert_eq!(table.get(0, 'x').map(|e| e.to), Some(3));
        assert_eq!(table.get(1, 'q').map(|e| e.to), Some(2));
        assert_eq!(table.get(1, 'a').map(|e| e.to), Some(0));
        assert!(table.get(0, 'd').is_none());
        assert!(table.get(1, 'd').is_none());
        assert!(table.get(2, 'a').is_none());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn dump() {
        let mut table = Table::new();
        let h = HistoryId::from_index;
        table.insert(Entry {
            instrs: vec![
                Instruction::Reorder { to: h(3), from: h(1) },
                Instruction::Set(h(3), 0),
            ],
            ..entry(0, 'a', 'a', 1)
        });
        table.insert(entry(1, 'b', 'd', 1));

        assert_eq!(table.to_string(), "0-a-a -> 1 [h3<-h1, h3<-pos]\n1-b-d -> 1 []\n");
    }

    #[test]
    #[should_panic = "overlaps"]
    fn no_overlap() {
        let mut table = Table::new();
        table.insert(entry(0, 'a', 'f', 1));
        table.insert(entry(0, 'c', 'c', 1));
    }
}
