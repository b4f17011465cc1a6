//! Transition labels and the input alphabet

use std::{cmp::Ordering, collections::BTreeMap, fmt};

const SURROGATES: std::ops::RangeInclusive<u32> = 0xd800..=0xdfff;

/// The next Unicode scalar after `c`, skipping the surrogate gap
#[must_use]
pub fn succ_char(c: char) -> Option<char> {
    let next = u32::from(c) + 1;
    if next == *SURROGATES.start() {
        Some('\u{e000}')
    } else {
        char::from_u32(next)
    }
}

/// The Unicode scalar before `c`, skipping the surrogate gap
#[must_use]
pub fn pred_char(c: char) -> Option<char> {
    let prev = u32::from(c).checked_sub(1)?;
    if prev == *SURROGATES.end() {
        Some('\u{d7ff}')
    } else {
        char::from_u32(prev)
    }
}

fn escape(c: char, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if c.is_alphanumeric() || c.is_ascii_punctuation() && c != '-' {
        write!(f, "{c}")
    } else {
        write!(f, "{}", c.escape_default())
    }
}

/// A non-empty, inclusive range of characters
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputRange {
    from: char,
    to: char,
}

impl fmt::Debug for InputRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(self, f) }
}

impl fmt::Display for InputRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        escape(self.from, f)?;
        f.write_str("-")?;
        escape(self.to, f)
    }
}

impl Ord for InputRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.from
            .cmp(&other.from)
            .then_with(|| self.to.cmp(&other.to))
    }
}

impl PartialOrd for InputRange {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl InputRange {
    /// Every character
    pub const ANY: Self = Self {
        from: '\0',
        to: char::MAX,
    };

    /// # Panics
    /// Panics if `from > to`.
    #[must_use]
    pub fn new(from: char, to: char) -> Self {
        assert!(from <= to, "Inverted input range {from:?}-{to:?}");
        Self { from, to }
    }

    #[must_use]
    #[inline]
    pub const fn single(c: char) -> Self { Self { from: c, to: c } }

    #[must_use]
    #[inline]
    pub fn from(&self) -> char { self.from }

    #[must_use]
    #[inline]
    pub fn to(&self) -> char { self.to }

    #[must_use]
    #[inline]
    pub fn contains(&self, c: char) -> bool { (self.from..=self.to).contains(&c) }

    /// Every character not covered by any of `ranges`, as sorted disjoint
    /// ranges
    #[must_use]
    pub fn complement(ranges: &[InputRange]) -> Vec<InputRange> {
        let mut sorted = ranges.to_vec();
        sorted.sort_unstable();

        let mut out = vec![];
        let mut next = Some('\0');
        for range in sorted {
            let Some(lo) = next else { break };

            if range.from > lo
                && let Some(hi) = pred_char(range.from)
            {
                out.push(Self::new(lo, hi));
            }

            if range.to >= lo {
                next = succ_char(range.to);
            }
        }

        if let Some(lo) = next {
            out.push(Self::new(lo, char::MAX));
        }

        out
    }
}

/// The label of a TNFA transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Input {
    /// Consumes one character in the given range
    Range(InputRange),
    /// Crossed only once the input is exhausted
    Eos,
    /// Crossed without consuming anything
    Epsilon,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(r) => fmt::Display::fmt(r, f),
            Self::Eos => f.write_str("$"),
            Self::Epsilon => f.write_str("ϵ"),
        }
    }
}

/// The declared input ranges of an automaton, refined into disjoint ranges
/// such that every declared range is a union of them.
///
/// Two characters in the same alphabet range are indistinguishable to every
/// transition, which is what lets a compiled transition be shared by a whole
/// range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet(Vec<InputRange>);

impl Alphabet {
    pub fn partition<I: IntoIterator<Item = InputRange>>(ranges: I) -> Self {
        // Coverage delta at each boundary, in code point space so the
        // surrogate gap and char::MAX + 1 are representable
        let mut deltas = BTreeMap::<u32, i64>::new();
        for range in ranges {
            *deltas.entry(u32::from(range.from)).or_default() += 1;
            *deltas.entry(u32::from(range.to) + 1).or_default() -= 1;
        }

        let mut out = vec![];
        let mut depth = 0;
        let mut bounds = deltas.into_iter().peekable();
        while let Some((start, delta)) = bounds.next() {
            depth += delta;
            debug_assert!(depth >= 0);

            let Some(&(end, _)) = bounds.peek() else {
                debug_assert_eq!(depth, 0);
                break;
            };

            if depth == 0 {
                continue;
            }

            let from = if SURROGATES.contains(&start) {
                '\u{e000}'
            } else {
                char::from_u32(start).unwrap_or_else(|| unreachable!())
            };
            let to = if SURROGATES.contains(&(end - 1)) {
                '\u{d7ff}'
            } else {
                char::from_u32(end - 1).unwrap_or_else(|| unreachable!())
            };

            if from <= to {
                out.push(InputRange::new(from, to));
            }
        }

        Self(out)
    }

    #[must_use]
    #[inline]
    pub fn ranges(&self) -> &[InputRange] { &self.0 }

    /// The alphabet range containing `c`, if any
    #[must_use]
    pub fn find(&self, c: char) -> Option<InputRange> {
        let idx = self.0.partition_point(|r| r.to < c);
        self.0.get(idx).copied().filter(|r| r.contains(c))
    }
}
