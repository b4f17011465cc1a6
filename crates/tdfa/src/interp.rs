//! The matching loop, which compiles the DFA as it goes

use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::{
    config::Config,
    dfa::{
        DfaState,
        closure::{ClosureBuilder, Step},
        registry::Registry,
        table::{Entry, Table},
    },
    free::Free,
    history::{HistoryId, Memory},
    input::{Alphabet, InputRange},
    instr::{Instruction, execute_all},
    matches::{Captures, MatchResult, Span},
    tnfa::Tnfa,
};

/// How to finish a match from a given DFA state once the input runs out
#[derive(Debug)]
struct Accept {
    instrs: Vec<Instruction>,
    /// Histories of the accepting thread, one per tag slot
    histories: Vec<HistoryId>,
}

/// A lazily compiled tagged DFA for one TNFA.
///
/// Compiled states and transitions persist across calls to
/// [`interpret`](Self::interpret); the memory for each match does not.
#[derive(Debug)]
pub struct Interpreter {
    tnfa: Tnfa,
    config: Config,
    alphabet: Alphabet,
    free: Free<HistoryId>,
    initial: Vec<HistoryId>,
    scratch: HistoryId,
    closure: ClosureBuilder,
    registry: Registry,
    table: Table,
    /// Transitions known to lead nowhere
    dead: HashSet<(usize, InputRange)>,
    start: Option<(usize, Vec<Instruction>)>,
    accepts: HashMap<usize, Option<Accept>>,
}

impl Interpreter {
    #[must_use]
    pub fn new(tnfa: Tnfa, config: Config) -> Self {
        let alphabet = Alphabet::partition(tnfa.input_ranges());
        let mut free = Free::default();
        let initial: Vec<_> = tnfa.tags().iter().map(|_| free.fresh()).collect();
        let scratch = free.fresh();

        let mut closure = ClosureBuilder::default();
        let mut registry = Registry::new();
        let seed: DfaState = [(tnfa.initial(), initial.clone())].into_iter().collect();
        let start = closure
            .solve(&tnfa, &seed, Step::Start, &mut free)
            .map(|(state, instrs)| (registry.register(state), instrs));

        Self {
            tnfa,
            config,
            alphabet,
            free,
            initial,
            scratch,
            closure,
            registry,
            table: Table::new(),
            dead: HashSet::new(),
            start,
            accepts: HashMap::new(),
        }
    }

    #[must_use]
    #[inline]
    pub fn tnfa(&self) -> &Tnfa { &self.tnfa }

    #[must_use]
    #[inline]
    pub fn alphabet(&self) -> &Alphabet { &self.alphabet }

    #[must_use]
    #[inline]
    pub fn table(&self) -> &Table { &self.table }

    #[must_use]
    #[inline]
    pub fn registry(&self) -> &Registry { &self.registry }

    pub fn interpret(&mut self, input: &str) -> MatchResult {
        let mut mem = Memory::new(self.initial.iter().copied());
        let mut cur = match &self.start {
            Some((idx, instrs)) => {
                execute_all(instrs, &mut mem, -1);
                *idx
            },
            None => return MatchResult::NoMatch,
        };

        let mut pos = -1;
        for c in input.chars() {
            pos += 1;

            let Some(idx) = self.transition(cur, c) else {
                trace!(pos, ?c, from = cur, "No transition");
                return MatchResult::NoMatch;
            };

            let entry = self.table.at(idx);
            execute_all(&entry.instrs, &mut mem, pos);
            cur = entry.to;
        }

        self.finish(cur, &mut mem, pos)
    }

    /// Find or compile the transition out of `from` on `c`
    fn transition(&mut self, from: usize, c: char) -> Option<usize> {
        if let Some(idx) = self.table.find(from, c) {
            trace!(?c, from, "Cached transition");
            return Some(idx);
        }

        let Some(range) = self.alphabet.find(c) else {
            trace!(?c, "Character outside the alphabet");
            return None;
        };
        if self.dead.contains(&(from, range)) {
            trace!(?c, from, "Cached dead transition");
            return None;
        }
        trace!(?c, from, %range, "Compiling transition");

        let Some((state, mut instrs)) = self.closure.solve(
            &self.tnfa,
            self.registry.state(from),
            Step::Char(c),
            &mut self.free,
        ) else {
            debug!(from, %range, "Dead transition");
            self.dead.insert((from, range));
            return None;
        };
        let to = self.settle(state, &mut instrs);

        Some(self.table.insert(Entry {
            from,
            range,
            to,
            instrs,
        }))
    }

    /// Register `state` or merge it into an equivalent one, appending the
    /// copies a merge requires to `instrs`
    fn settle(&mut self, state: DfaState, instrs: &mut Vec<Instruction>) -> usize {
        if self.config.merge_states
            && let Some((idx, mapping)) = self.registry.find_mappable(&state)
        {
            debug!(idx, ?mapping, "Merging DFA state");
            instrs.extend(mapping.instructions(self.scratch));
            return idx;
        }

        self.registry.register(state)
    }

    fn finish(&mut self, cur: usize, mem: &mut Memory, pos: isize) -> MatchResult {
        if !self.accepts.contains_key(&cur) {
            let accept = self
                .closure
                .solve(
                    &self.tnfa,
                    self.registry.state(cur),
                    Step::Eos,
                    &mut self.free,
                )
                .and_then(|(state, instrs)| {
                    state.histories_of(self.tnfa.accept()).map(|h| Accept {
                        instrs,
                        histories: h.to_vec(),
                    })
                });

            debug!(state = cur, accepting = accept.is_some(), "Compiled end of input");
            self.accepts.insert(cur, accept);
        }

        let Some(Some(accept)) = self.accepts.get(&cur) else {
            trace!(state = cur, "Input ended in a rejecting state");
            return MatchResult::NoMatch;
        };

        execute_all(&accept.instrs, mem, pos);

        let history = |tag| {
            let slot = self
                .tnfa
                .slot(tag)
                .unwrap_or_else(|| panic!("Tag {tag} has no slot in the TNFA"));
            let mut vals: Vec<_> = mem.committed(accept.histories[slot]).collect();
            vals.reverse();
            vals
        };

        let groups = self
            .tnfa
            .groups()
            .iter()
            .map(|g| {
                history(g.start_tag())
                    .into_iter()
                    .zip(history(g.end_tag()))
                    .map(|(s, e)| Span::new(s, e))
                    .collect()
            })
            .collect();

        MatchResult::Match(Captures::new(groups))
    }
}

#[cfg(test)]
mod test {
    use super::Interpreter;
    use crate::{
        config::{Anchor, Config},
        re::{compile::compile, parse},
    };

    fn interp(pattern: &str) -> Interpreter {
        Interpreter::new(
            compile(&parse(pattern).unwrap(), Anchor::Full),
            Config::default(),
        )
    }

    #[test]
    fn start_state_is_registered_up_front() {
        let interp = interp("ab");

        assert_eq!(interp.registry().len(), 1);
        assert!(interp.table().is_empty());
        assert_eq!(interp.alphabet().ranges().len(), 2);
    }

    #[test]
    fn dead_transitions_are_not_compiled() {
        let mut interp = interp("ab");

        assert!(!interp.interpret("ac").is_match());
        assert_eq!(interp.table().len(), 1);
        assert!(!interp.interpret("z").is_match());
        assert_eq!(interp.table().len(), 1);
    }

    #[test]
    fn dead_transitions_are_remembered() {
        let mut interp = interp("a([])");

        assert!(!interp.interpret("a").is_match());
        let issued = interp.free.issued();
        assert_eq!(interp.dead.len(), 1);

        for _ in 0..3 {
            assert!(!interp.interpret("a").is_match());
        }
        assert_eq!(interp.free.issued(), issued);
        assert!(interp.table().is_empty());
    }

    #[test]
    fn end_of_input_is_cached_per_state() {
        let mut interp = interp("a$");

        assert_eq!(interp.interpret("a").to_string(), "0-0");
        assert_eq!(interp.interpret("a").to_string(), "0-0");
        assert_eq!(interp.accepts.len(), 1);
        assert!(!interp.interpret("").is_match());
        assert_eq!(interp.accepts.len(), 2);
    }
}
