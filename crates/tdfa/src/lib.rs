//! Regular expression matching with lazily compiled tagged DFAs
//!
//! A pattern is parsed, compiled to a tagged NFA whose transitions mark the
//! boundaries of capture groups, and then matched by building a tagged DFA
//! one transition at a time as inputs are interpreted.

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)] // TODO

pub mod config;
pub mod dfa;
pub mod free;
pub mod history;
pub mod input;
pub mod instr;
pub mod interp;
pub mod matches;
pub mod pattern;
pub mod re;
pub mod tag;
pub mod tnfa;

pub use config::{Anchor, Config};
pub use matches::{MatchResult, NoSuchGroup, Span};
pub use pattern::Pattern;
pub use re::ParseError;
