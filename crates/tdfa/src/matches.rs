//! The outcome of matching one input

use std::fmt;

/// An inclusive range of character positions.  An empty capture at `p` is
/// `p-(p-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: isize,
    pub end: isize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Span {
    /// What an absent capture reports
    pub const UNSET: Self = Self { start: -1, end: -1 };

    #[must_use]
    #[inline]
    pub fn new(start: isize, end: isize) -> Self { Self { start, end } }

    #[must_use]
    #[inline]
    pub fn len(self) -> usize { (self.end + 1 - self.start).try_into().unwrap_or(0) }

    #[must_use]
    #[inline]
    pub fn is_empty(self) -> bool { self.len() == 0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No capture group {group} (the pattern has {count})")]
pub struct NoSuchGroup {
    pub group: usize,
    pub count: usize,
}

/// The spans captured by a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    /// Every span each group captured, oldest first
    groups: Vec<Vec<Span>>,
}

impl Captures {
    /// # Panics
    /// Panics if there is no entry for group 0.
    #[must_use]
    pub fn new(groups: Vec<Vec<Span>>) -> Self {
        assert!(!groups.is_empty(), "Captures are missing the entire match");
        Self { groups }
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize { self.groups.len() }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    /// # Errors
    /// Fails if the pattern has no group `group`.
    pub fn history(&self, group: usize) -> Result<&[Span], NoSuchGroup> {
        self.groups
            .get(group)
            .map(Vec::as_slice)
            .ok_or(NoSuchGroup {
                group,
                count: self.groups.len(),
            })
    }

    /// The last span `group` captured, if it took part in the match
    ///
    /// # Errors
    /// Fails if the pattern has no group `group`.
    pub fn get(&self, group: usize) -> Result<Option<Span>, NoSuchGroup> {
        Ok(self.history(group)?.last().copied())
    }
}

/// The result of [`Pattern::interpret`](crate::Pattern::interpret)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    Match(Captures),
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => f.write_str("NO_MATCH"),
            Self::Match(c) => write!(f, "{}", c.get(0).ok().flatten().unwrap_or(Span::UNSET)),
        }
    }
}

impl MatchResult {
    #[must_use]
    #[inline]
    pub fn is_match(&self) -> bool { matches!(self, Self::Match(_)) }

    #[must_use]
    #[inline]
    pub fn captures(&self) -> Option<&Captures> {
        match self {
            Self::NoMatch => None,
            Self::Match(c) => Some(c),
        }
    }

    /// The number of groups, including group 0, or zero if nothing matched
    #[must_use]
    pub fn group_count(&self) -> usize { self.captures().map_or(0, Captures::len) }

    /// The span of `group`, or `None` if it did not participate.  Every
    /// group of a failed match is absent.
    ///
    /// # Errors
    /// Fails if the match succeeded and the pattern has no group `group`.
    pub fn group(&self, group: usize) -> Result<Option<Span>, NoSuchGroup> {
        match self {
            Self::NoMatch => Ok(None),
            Self::Match(c) => c.get(group),
        }
    }

    /// Every span `group` captured, oldest first
    ///
    /// # Errors
    /// Fails if the match succeeded and the pattern has no group `group`.
    pub fn history(&self, group: usize) -> Result<&[Span], NoSuchGroup> {
        match self {
            Self::NoMatch => Ok(&[]),
            Self::Match(c) => c.history(group),
        }
    }

    /// # Errors
    /// Fails if the match succeeded and the pattern has no group `group`.
    pub fn start_of(&self, group: usize) -> Result<isize, NoSuchGroup> {
        Ok(self.group(group)?.unwrap_or(Span::UNSET).start)
    }

    /// # Errors
    /// Fails if the match succeeded and the pattern has no group `group`.
    pub fn end_of(&self, group: usize) -> Result<isize, NoSuchGroup> {
        Ok(self.group(group)?.unwrap_or(Span::UNSET).end)
    }

    /// Start of the entire match, or -1
    #[must_use]
    pub fn start(&self) -> isize { self.start_of(0).unwrap_or(-1) }

    /// End (inclusive) of the entire match, or -1
    #[must_use]
    pub fn end(&self) -> isize { self.end_of(0).unwrap_or(-1) }
}

#[cfg(test)]
mod test {
    use super::{Captures, MatchResult, NoSuchGroup, Span};

    #[test]
    fn lookups() {
        let m = MatchResult::Match(Captures::new(vec![
            vec![Span::new(0, 5)],
            vec![Span::new(0, 1), Span::new(2, 3)],
            vec![],
        ]));

        assert!(m.is_match());
        assert_eq!(m.to_string(), "0-5");
        assert_eq!((m.start(), m.end()), (0, 5));
        assert_eq!(m.group(1), Ok(Some(Span::new(2, 3))));
        assert_eq!(m.history(1).unwrap().len(), 2);
        assert_eq!(m.start_of(2), Ok(-1));
        assert_eq!(m.end_of(3), Err(NoSuchGroup { group: 3, count: 3 }));
        assert_eq!(m.group_count(), 3);
    }

    #[test]
    fn no_match_is_universally_absent() {
        let m = MatchResult::NoMatch;

        assert_eq!(m.to_string(), "NO_MATCH");
        assert_eq!((m.start(), m.end()), (-1, -1));
        assert_eq!(m.start_of(17), Ok(-1));
        assert_eq!(m.group(3), Ok(None));
        assert!(m.history(0).unwrap().is_empty());
    }

    #[test]
    fn empty_spans() {
        assert!(Span::new(4, 3).is_empty());
        assert_eq!(Span::new(2, 4).len(), 3);
        assert_eq!(Span::new(0, 0).to_string(), "0-0");
    }
}
