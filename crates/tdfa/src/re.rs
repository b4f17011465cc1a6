//! Regular expression syntax trees

use std::fmt;

use crate::input::InputRange;

pub mod compile;
pub mod parse;

pub use parse::{ParseError, parse};

/// Whether a repetition prefers to take or to skip another iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Greed {
    Greedy,
    Lazy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    /// Any single character
    Any,
    Lit(char),
    /// Any character in one of the ranges
    Set(Vec<InputRange>),
    /// A capturing group
    Group(Box<Regex>),
    Star(Box<Regex>, Greed),
    Plus(Box<Regex>, Greed),
    Opt(Box<Regex>, Greed),
    /// Alternatives, highest priority first
    Alt(Vec<Regex>),
    Cat(Vec<Regex>),
    /// The end of the input
    Eos,
}

impl Regex {
    pub const BOTTOM: Regex = Regex::Alt(Vec::new());
    pub const EMPTY: Regex = Regex::Cat(Vec::new());

    /// The number of capturing groups, not counting the entire match
    #[must_use]
    pub fn group_count(&self) -> usize {
        match self {
            Self::Any | Self::Lit(_) | Self::Set(_) | Self::Eos => 0,
            Self::Group(r) => r.group_count() + 1,
            Self::Star(r, _) | Self::Plus(r, _) | Self::Opt(r, _) => r.group_count(),
            Self::Alt(v) | Self::Cat(v) => v.iter().map(Self::group_count).sum(),
        }
    }

    fn is_atom(&self) -> bool {
        matches!(
            self,
            Self::Any | Self::Lit(_) | Self::Set(_) | Self::Group(_) | Self::Eos
        )
    }
}

const META: &str = "\\.[]()|*+?$^{}";

fn write_lit(c: char, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        c if META.contains(c) => write!(f, "\\{c}"),
        c => write!(f, "{c}"),
    }
}

fn write_class_char(c: char, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        '\\' | ']' | '[' | '^' | '-' => write!(f, "\\{c}"),
        c => write!(f, "{c}"),
    }
}

struct Atom<'a>(&'a Regex);

impl fmt::Display for Atom<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_atom() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "(?:{})", self.0)
        }
    }
}

/// Prints the expression in the syntax accepted by [`parse`]
impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quant = |f: &mut fmt::Formatter<'_>, r: &Regex, op: char, greed: Greed| {
            write!(f, "{}{op}", Atom(r))?;
            if greed == Greed::Lazy {
                f.write_str("?")?;
            }
            Ok(())
        };

        match self {
            Self::Any => f.write_str("."),
            Self::Lit(c) => write_lit(*c, f),
            Self::Set(ranges) => {
                f.write_str("[")?;
                for range in ranges {
                    write_class_char(range.from(), f)?;
                    if range.to() != range.from() {
                        f.write_str("-")?;
                        write_class_char(range.to(), f)?;
                    }
                }
                f.write_str("]")
            },
            Self::Group(r) => write!(f, "({r})"),
            Self::Star(r, g) => quant(f, r, '*', *g),
            Self::Plus(r, g) => quant(f, r, '+', *g),
            Self::Opt(r, g) => quant(f, r, '?', *g),
            Self::Alt(v) if v.is_empty() => f.write_str("[]"),
            Self::Alt(v) => {
                for (i, r) in v.iter().enumerate() {
                    if i != 0 {
                        f.write_str("|")?;
                    }

                    if matches!(r, Self::Alt(w) if !w.is_empty()) {
                        write!(f, "(?:{r})")?;
                    } else {
                        write!(f, "{r}")?;
                    }
                }
                Ok(())
            },
            Self::Cat(v) => {
                for r in v {
                    if matches!(r, Self::Alt(w) if !w.is_empty()) {
                        write!(f, "(?:{r})")?;
                    } else {
                        write!(f, "{r}")?;
                    }
                }
                Ok(())
            },
            Self::Eos => f.write_str("$"),
        }
    }
}

#[cfg(any(test, feature = "proptest"))]
pub use prop::*;

#[cfg(any(test, feature = "proptest"))]
mod prop {
    use proptest::prelude::*;

    use super::{Greed, Regex};
    use crate::input::InputRange;

    pub fn greed() -> impl Strategy<Value = Greed> {
        prop_oneof![3 => Just(Greed::Greedy), 1 => Just(Greed::Lazy)]
    }

    pub fn class(chr: impl Strategy<Value = char> + Clone) -> impl Strategy<Value = Regex> {
        prop::collection::vec((chr.clone(), chr), 0..3).prop_map(|v| {
            Regex::Set(
                v.into_iter()
                    .map(|(a, b)| InputRange::new(a.min(b), a.max(b)))
                    .collect(),
            )
        })
    }

    /// Random syntax trees over the characters produced by `chr`
    pub fn re(
        depth: u32,
        tree_size: u32,
        branch_size: usize,
        chr: impl Strategy<Value = char> + Clone + 'static,
    ) -> impl Strategy<Value = Regex> {
        prop_oneof![
            8 => chr.clone().prop_map(Regex::Lit),
            1 => Just(Regex::Any),
            1 => class(chr),
            1 => Just(Regex::EMPTY),
            1 => Just(Regex::Eos),
        ]
        .prop_recursive(depth, tree_size, u32::try_from(branch_size).unwrap(), move |s| {
            prop_oneof![
                prop::collection::vec(s.clone(), 2..=branch_size).prop_map(Regex::Alt),
                prop::collection::vec(s.clone(), 2..=branch_size).prop_map(Regex::Cat),
                s.clone().prop_map(|r| Regex::Group(r.into())),
                (s.clone(), greed()).prop_map(|(r, g)| Regex::Star(r.into(), g)),
                (s.clone(), greed()).prop_map(|(r, g)| Regex::Plus(r.into(), g)),
                (s, greed()).prop_map(|(r, g)| Regex::Opt(r.into(), g)),
            ]
        })
    }
}
