//! Matching options

/// How much of the input a pattern has to account for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The whole input must match
    #[default]
    Full,
    /// Group 0 is the leftmost-first match anywhere in the input
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    pub anchor: Anchor,
    /// Reuse an equivalent DFA state instead of registering every new one.
    /// Without this the compiled automaton grows with the input.
    pub merge_states: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anchor: Anchor::default(),
            merge_states: true,
        }
    }
}
