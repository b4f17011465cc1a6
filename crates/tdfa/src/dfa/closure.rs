//! Priority-ordered epsilon closure with tag tracking

use std::collections::VecDeque;

use hashbrown::HashSet;

use super::DfaState;
use crate::{
    free::Free,
    history::HistoryId,
    instr::Instruction,
    tag::Tag,
    tnfa::{Priority, State, Transition, Tnfa},
};

/// What a closure consumes before following epsilon transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing; used once to build the start state
    Start,
    Char(char),
    /// The end of the input
    Eos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hunger {
    /// Must consume the step's input before moving on
    Hungry,
    /// Free to follow epsilon transitions
    Fed,
}

#[derive(Debug)]
struct Thread {
    state: State,
    histories: Vec<HistoryId>,
    hunger: Hunger,
    /// Tag on the edge that led here, applied when the thread is first
    /// visited
    tag: Option<Tag>,
}

/// Reusable work lists for [`solve`](Self::solve)
#[derive(Debug, Default)]
pub struct ClosureBuilder {
    normal: Vec<Thread>,
    low: Vec<Thread>,
    hungry: VecDeque<Thread>,
    visited: HashSet<State>,
}

impl ClosureBuilder {
    fn push(&mut self, priority: Priority, thread: Thread) {
        match priority {
            Priority::Normal => self.normal.push(thread),
            Priority::Low => self.low.push(thread),
        }
    }

    fn pop(&mut self) -> Option<Thread> {
        self.normal
            .pop()
            .or_else(|| self.low.pop())
            .or_else(|| self.hungry.pop_front())
    }

    /// Push the targets of `edges` so they pop in order
    fn push_edges(&mut self, edges: &[Transition], histories: &[HistoryId]) {
        for edge in edges.iter().rev() {
            self.push(edge.priority, Thread {
                state: edge.to,
                histories: histories.to_vec(),
                hunger: Hunger::Fed,
                tag: edge.tag,
            });
        }
    }

    /// Compute the DFA state reached from `from` by `step`, along with the
    /// instructions that bring the histories of the new state up to date.
    ///
    /// Returns `None` if no thread survives the step.
    pub fn solve(
        &mut self,
        tnfa: &Tnfa,
        from: &DfaState,
        step: Step,
        free: &mut Free<HistoryId>,
    ) -> Option<(DfaState, Vec<Instruction>)> {
        debug_assert!(self.normal.is_empty() && self.low.is_empty() && self.hungry.is_empty());
        self.visited.clear();

        let seed = |(state, histories): (State, &[HistoryId])| Thread {
            state,
            histories: histories.to_vec(),
            hunger: if step == Step::Start {
                Hunger::Fed
            } else {
                Hunger::Hungry
            },
            tag: None,
        };

        if step == Step::Start {
            self.normal.extend(from.threads().rev().map(seed));
        } else {
            self.hungry.extend(from.threads().map(seed));
        }

        let mut instrs = vec![];
        let mut out = vec![];

        while let Some(Thread {
            state,
            mut histories,
            hunger,
            tag,
        }) = self.pop()
        {
            match hunger {
                Hunger::Hungry => match step {
                    Step::Start => unreachable!(),
                    Step::Char(c) => {
                        let edges = tnfa.on_char(state, c);
                        for edge in edges.iter().rev() {
                            self.normal.push(Thread {
                                state: edge.to,
                                histories: histories.clone(),
                                hunger: Hunger::Fed,
                                tag: edge.tag,
                            });
                        }
                    },
                    Step::Eos => {
                        self.push_edges(tnfa.on_eos(state), &histories);

                        if tnfa.is_accepting(state) {
                            self.normal.push(Thread {
                                state,
                                histories,
                                hunger: Hunger::Fed,
                                tag: None,
                            });
                        }
                    },
                },
                Hunger::Fed => {
                    if !self.visited.insert(state) {
                        continue;
                    }

                    if let Some(tag) = tag {
                        let slot = tnfa.slot(tag).unwrap_or_else(|| {
                            panic!("Tag {tag} has no slot in the TNFA")
                        });
                        let old = histories[slot];
                        let new = free.fresh();

                        instrs.push(Instruction::Reorder { to: new, from: old });
                        instrs.push(Instruction::Set(new, tag.offset()));
                        instrs.push(if tag.is_start() {
                            Instruction::OpeningCommit(new)
                        } else {
                            Instruction::ClosingCommit(new)
                        });
                        histories[slot] = new;
                    }

                    if step == Step::Eos {
                        let mut edges = tnfa.on_epsilon(state).to_vec();
                        edges.extend_from_slice(tnfa.on_eos(state));
                        edges.sort_by_key(Transition::order);
                        self.push_edges(&edges, &histories);
                    } else {
                        self.push_edges(tnfa.on_epsilon(state), &histories);
                    }

                    if tnfa.is_live(state) {
                        out.push((state, histories));
                    }
                },
            }
        }

        let state: DfaState = out.into_iter().collect();
        (!state.is_empty()).then_some((state, instrs))
    }
}
