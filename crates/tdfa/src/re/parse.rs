//! Recursive-descent parser for pattern strings

use std::{iter::Peekable, str::CharIndices};

use super::{Greed, Regex};
use crate::input::InputRange;

/// A syntax error, with the byte offset at which it was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected {1:?} at {0}")]
    UnexpectedChar(usize, char),
    #[error("Unclosed group opened at {0}")]
    UnclosedGroup(usize),
    #[error("Unmatched right parenthesis at {0}")]
    TrailingParen(usize),
    #[error("Missing operand for quantifier at {0}")]
    MissingOperand(usize),
    #[error("Unclosed character class opened at {0}")]
    UnclosedClass(usize),
    #[error("Inverted character range at {0}")]
    BadRange(usize),
    #[error("Trailing backslash at {0}")]
    TrailingEscape(usize),
    #[error("Unsupported syntax at {0}")]
    Unsupported(usize),
    #[error("Group at {0} is nested too deeply")]
    TooDeep(usize),
}

/// Deepest group nesting accepted by [`parse`]
pub const MAX_DEPTH: usize = 256;

type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Parse a pattern.  Capture groups are numbered by the order of their
/// opening parentheses, starting from 1.
///
/// # Errors
/// Fails if the pattern is malformed or uses a construct the engine does
/// not support.
pub fn parse(s: &str) -> Result<Regex> {
    let mut parser = Parser {
        src: s,
        chars: s.char_indices().peekable(),
        depth: 0,
    };

    let re = parser.alt()?;
    match parser.chars.next() {
        None => Ok(re),
        Some((i, ')')) => Err(ParseError::TrailingParen(i)),
        Some((i, c)) => Err(ParseError::UnexpectedChar(i, c)),
    }
}

fn digit() -> Vec<InputRange> { vec![InputRange::new('0', '9')] }

fn word() -> Vec<InputRange> {
    vec![
        InputRange::new('0', '9'),
        InputRange::new('A', 'Z'),
        InputRange::single('_'),
        InputRange::new('a', 'z'),
    ]
}

fn space() -> Vec<InputRange> {
    vec![InputRange::new('\t', '\r'), InputRange::single(' ')]
}

/// A single escaped item, either one character or a shorthand class
enum Escape {
    Char(char),
    Class(Vec<InputRange>),
}

struct Parser<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn pos(&mut self) -> usize { self.chars.peek().map_or(self.src.len(), |&(i, _)| i) }

    fn peek(&mut self) -> Option<char> { self.chars.peek().map(|&(_, c)| c) }

    fn eat(&mut self, c: char) -> bool { self.chars.next_if(|&(_, d)| d == c).is_some() }

    fn alt(&mut self) -> Result<Regex> {
        let mut alts = vec![self.cat()?];

        while self.eat('|') {
            alts.push(self.cat()?);
        }

        Ok(if alts.len() == 1 {
            alts.pop().unwrap_or_else(|| unreachable!())
        } else {
            Regex::Alt(alts)
        })
    }

    fn cat(&mut self) -> Result<Regex> {
        let mut cat = vec![];

        while let Some(c) = self.peek() {
            match c {
                '|' | ')' => break,
                '*' | '+' | '?' => return Err(ParseError::MissingOperand(self.pos())),
                _ => {
                    let atom = self.atom()?;
                    match self.quantified(atom)? {
                        Regex::Cat(v) => cat.extend(v),
                        re => cat.push(re),
                    }
                },
            }
        }

        Ok(if cat.len() == 1 {
            cat.pop().unwrap_or_else(|| unreachable!())
        } else {
            Regex::Cat(cat)
        })
    }

    fn quantified(&mut self, atom: Regex) -> Result<Regex> {
        let op = match self.peek() {
            Some(c @ ('*' | '+' | '?')) => c,
            _ => return Ok(atom),
        };
        self.chars.next();

        let greed = if self.eat('?') {
            Greed::Lazy
        } else {
            Greed::Greedy
        };

        if let Some('*' | '+' | '?') = self.peek() {
            return Err(ParseError::Unsupported(self.pos()));
        }

        let atom = Box::new(atom);
        Ok(match op {
            '*' => Regex::Star(atom, greed),
            '+' => Regex::Plus(atom, greed),
            '?' => Regex::Opt(atom, greed),
            _ => unreachable!(),
        })
    }

    fn atom(&mut self) -> Result<Regex> {
        let Some((start, c)) = self.chars.next() else {
            unreachable!();
        };

        Ok(match c {
            '(' => {
                let capturing = if self.eat('?') {
                    if !self.eat(':') {
                        return Err(ParseError::Unsupported(start));
                    }
                    false
                } else {
                    true
                };

                if self.depth == MAX_DEPTH {
                    return Err(ParseError::TooDeep(start));
                }
                self.depth += 1;
                let inner = self.alt()?;
                self.depth -= 1;

                if !self.eat(')') {
                    return Err(ParseError::UnclosedGroup(start));
                }

                if capturing {
                    Regex::Group(inner.into())
                } else {
                    inner
                }
            },
            '[' => self.class(start)?,
            '.' => Regex::Any,
            '$' => Regex::Eos,
            '^' => return Err(ParseError::Unsupported(start)),
            '\\' => match self.escape(start)? {
                Escape::Char(c) => Regex::Lit(c),
                Escape::Class(ranges) => Regex::Set(ranges),
            },
            c => Regex::Lit(c),
        })
    }

    fn escape(&mut self, start: usize) -> Result<Escape> {
        let Some((i, c)) = self.chars.next() else {
            return Err(ParseError::TrailingEscape(start));
        };

        Ok(match c {
            'd' => Escape::Class(digit()),
            'w' => Escape::Class(word()),
            's' => Escape::Class(space()),
            'D' => Escape::Class(InputRange::complement(&digit())),
            'W' => Escape::Class(InputRange::complement(&word())),
            'S' => Escape::Class(InputRange::complement(&space())),
            'n' => Escape::Char('\n'),
            't' => Escape::Char('\t'),
            'r' => Escape::Char('\r'),
            c if c.is_alphanumeric() => return Err(ParseError::UnexpectedChar(i, c)),
            c => Escape::Char(c),
        })
    }

    fn class_char(&mut self, open: usize) -> Result<Option<Escape>> {
        let Some((i, c)) = self.chars.next() else {
            return Err(ParseError::UnclosedClass(open));
        };

        Ok(match c {
            ']' => None,
            '\\' => Some(self.escape(i)?),
            c => Some(Escape::Char(c)),
        })
    }

    fn class(&mut self, open: usize) -> Result<Regex> {
        let negated = self.eat('^');
        let mut ranges = vec![];

        loop {
            let pos = self.pos();
            let Some(item) = self.class_char(open)? else {
                break;
            };

            let from = match item {
                Escape::Class(r) => {
                    ranges.extend(r);
                    continue;
                },
                Escape::Char(c) => c,
            };

            // A dash right before the closing bracket is literal
            let mut ahead = self.chars.clone();
            let is_range = matches!(ahead.next(), Some((_, '-')))
                && !matches!(ahead.next(), Some((_, ']')) | None);

            if !is_range {
                ranges.push(InputRange::single(from));
                continue;
            }

            self.chars.next();
            let to = match self.class_char(open)? {
                Some(Escape::Char(c)) => c,
                Some(Escape::Class(_)) | None => return Err(ParseError::BadRange(pos)),
            };

            if to < from {
                return Err(ParseError::BadRange(pos));
            }
            ranges.push(InputRange::new(from, to));
        }

        Ok(Regex::Set(if negated {
            InputRange::complement(&ranges)
        } else {
            ranges
        }))
    }
}
