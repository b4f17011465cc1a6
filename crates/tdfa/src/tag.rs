//! Capture groups and the tags marking their boundaries

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum TagKind {
    Start,
    End,
}

/// A marker on a transition meaning "a capture group starts (or ends) here"
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    group: usize,
    kind: TagKind,
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(self, f) }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TagKind::Start => write!(f, "↑{}", self.group),
            TagKind::End => write!(f, "↓{}", self.group),
        }
    }
}

impl Tag {
    #[must_use]
    #[inline]
    pub const fn start(group: usize) -> Self {
        Self {
            group,
            kind: TagKind::Start,
        }
    }

    #[must_use]
    #[inline]
    pub const fn end(group: usize) -> Self {
        Self {
            group,
            kind: TagKind::End,
        }
    }

    #[must_use]
    #[inline]
    pub fn group(self) -> usize { self.group }

    #[must_use]
    #[inline]
    pub fn is_start(self) -> bool { self.kind == TagKind::Start }

    /// Offset from the position of the last consumed character at which
    /// this tag records its boundary.  A group starts at the character after
    /// the one just consumed and ends (inclusively) on it.
    #[must_use]
    #[inline]
    pub fn offset(self) -> isize {
        match self.kind {
            TagKind::Start => 1,
            TagKind::End => 0,
        }
    }
}

/// A capture group, numbered in preorder over the regex.  Group 0 is the
/// entire match and is its own parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureGroup {
    number: usize,
    parent: usize,
}

impl CaptureGroup {
    pub const ENTIRE_MATCH: Self = Self {
        number: 0,
        parent: 0,
    };

    /// # Panics
    /// Panics unless `parent < number`.
    #[must_use]
    pub fn new(number: usize, parent: usize) -> Self {
        assert!(
            parent < number,
            "Capture group {number} cannot be nested in group {parent}"
        );
        Self { number, parent }
    }

    #[must_use]
    #[inline]
    pub fn number(&self) -> usize { self.number }

    #[must_use]
    #[inline]
    pub fn parent(&self) -> usize { self.parent }

    #[must_use]
    #[inline]
    pub fn start_tag(&self) -> Tag { Tag::start(self.number) }

    #[must_use]
    #[inline]
    pub fn end_tag(&self) -> Tag { Tag::end(self.number) }
}
