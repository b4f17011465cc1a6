//! Capture-tracking instructions attached to compiled transitions

use std::fmt;

use crate::history::{HistoryId, Memory};

/// One effect on [`Memory`].  Instructions are run in order; later ones may
/// read what earlier ones wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Set the head of a history to the current position plus an offset
    Set(HistoryId, isize),
    /// Alias one history onto another
    Reorder { to: HistoryId, from: HistoryId },
    /// Commit a group start
    OpeningCommit(HistoryId),
    /// Commit a group end
    ClosingCommit(HistoryId),
    /// Clear a history.  Only ever emitted when remapping histories.
    Reset(HistoryId),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Set(h, 0) => write!(f, "{h}<-pos"),
            Self::Set(h, off) => write!(f, "{h}<-pos{off:+}"),
            Self::Reorder { to, from } => write!(f, "{to}<-{from}"),
            Self::OpeningCommit(h) => write!(f, "c↑{h}"),
            Self::ClosingCommit(h) => write!(f, "c↓{h}"),
            Self::Reset(h) => write!(f, "reset {h}"),
        }
    }
}

impl Instruction {
    /// Apply this instruction with `pos` the index of the last consumed
    /// character (-1 before the first one)
    pub fn execute(self, mem: &mut Memory, pos: isize) {
        match self {
            Self::Set(h, off) => mem.set(h, pos + off),
            Self::Reorder { to, from } => mem.reorder(to, from),
            Self::OpeningCommit(h) | Self::ClosingCommit(h) => mem.commit(h),
            Self::Reset(h) => mem.reset(h),
        }
    }
}

pub fn execute_all(instrs: &[Instruction], mem: &mut Memory, pos: isize) {
    for instr in instrs {
        instr.execute(mem, pos);
    }
}

/// Renders an instruction list as `[a, b, c]`
#[derive(Debug, Clone, Copy)]
pub struct List<'a>(pub &'a [Instruction]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, instr) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{instr}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod test {
    use super::{Instruction, List, execute_all};
    use crate::{
        free::Id,
        history::{HistoryId, Memory},
    };

    fn h(i: usize) -> HistoryId { HistoryId::from_index(i) }

    #[test]
    fn order_matters() {
        let mut mem = Memory::new([h(0)]);
        execute_all(
            &[
                Instruction::Reorder { to: h(1), from: h(0) },
                Instruction::Set(h(1), 1),
                Instruction::OpeningCommit(h(1)),
                Instruction::Reorder { to: h(2), from: h(1) },
                Instruction::Set(h(2), 0),
                Instruction::ClosingCommit(h(2)),
            ],
            &mut mem,
            4,
        );

        assert_eq!(mem.latest(h(1)), Some(5));
        assert_eq!(mem.committed(h(2)).collect::<Vec<_>>(), [4, 5]);
        assert_eq!(mem.latest(h(0)), None);

        Instruction::Reset(h(2)).execute(&mut mem, 9);
        assert_eq!(mem.latest(h(2)), None);
    }

    #[test]
    fn display() {
        let instrs = [
            Instruction::Reorder { to: h(4), from: h(1) },
            Instruction::Set(h(4), 1),
            Instruction::Set(h(5), 0),
            Instruction::OpeningCommit(h(4)),
            Instruction::ClosingCommit(h(5)),
            Instruction::Reset(h(2)),
        ];

        assert_eq!(
            List(&instrs).to_string(),
            "[h4<-h1, h4<-pos+1, h5<-pos, c↑h4, c↓h5, reset h2]"
        );
    }
}
