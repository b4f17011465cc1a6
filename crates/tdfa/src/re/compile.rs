//! Thompson construction of tagged NFAs

use super::{Greed, Regex};
use crate::{
    config::Anchor,
    input::{Input, InputRange},
    tag::{CaptureGroup, Tag},
    tnfa::{Priority, State, Tnfa, TnfaBuilder},
};

/// Compile `re` into a TNFA whose group 0 spans the whole match
#[must_use]
pub fn compile(re: &Regex, anchor: Anchor) -> Tnfa {
    let mut me = Compiler {
        nfa: TnfaBuilder::new(),
        next_group: 1,
    };

    let head = me.nfa.state();
    let tail = me.nfa.state();
    me.nfa.set_initial(head);
    me.nfa.set_accept(tail);
    me.nfa.declare_group(CaptureGroup::ENTIRE_MATCH);

    match anchor {
        Anchor::Full => me.build_group_in(0, re, head, tail),
        Anchor::Search => {
            let h = me.nfa.state();
            let t = me.nfa.state();

            me.build_in(&Regex::Star(Regex::Any.into(), Greed::Lazy), head, h, 0);
            me.build_group_in(0, re, h, t);
            me.build_in(&Regex::Star(Regex::Any.into(), Greed::Greedy), t, tail, 0);
        },
    }

    me.nfa.build()
}

struct Compiler {
    nfa: TnfaBuilder,
    next_group: usize,
}

impl Compiler {
    #[inline]
    fn eps(&mut self, from: State, to: State, priority: Priority) {
        self.nfa.connect(from, Input::Epsilon, to, priority, None);
    }

    fn build_group_in(&mut self, number: usize, re: &Regex, head: State, tail: State) {
        let h = self.nfa.state();
        let t = self.nfa.state();

        self.nfa.connect(head, Input::Epsilon, h, Priority::Normal, Some(Tag::start(number)));
        self.build_in(re, h, t, number);
        self.nfa.connect(t, Input::Epsilon, tail, Priority::Normal, Some(Tag::end(number)));
    }

    fn build_in(&mut self, re: &Regex, head: State, tail: State, parent: usize) {
        match re {
            Regex::Any => {
                self.nfa
                    .connect(head, Input::Range(InputRange::ANY), tail, Priority::Normal, None);
            },
            Regex::Lit(c) => {
                self.nfa.connect(
                    head,
                    Input::Range(InputRange::single(*c)),
                    tail,
                    Priority::Normal,
                    None,
                );
            },
            Regex::Set(ranges) => {
                for &range in ranges {
                    self.nfa
                        .connect(head, Input::Range(range), tail, Priority::Normal, None);
                }
            },
            Regex::Eos => self.nfa.connect(head, Input::Eos, tail, Priority::Normal, None),
            Regex::Group(r) => {
                let number = self.next_group;
                self.next_group += 1;

                self.nfa.declare_group(CaptureGroup::new(number, parent));
                self.build_group_in(number, r, head, tail);
            },
            Regex::Star(r, greed) => {
                let (enter, leave) = priorities(*greed);
                let h = self.nfa.state();
                let t = self.nfa.state();

                self.build_in(r, h, t, parent);
                self.eps(head, h, enter);
                self.eps(head, tail, leave);
                self.eps(t, h, enter);
                self.eps(t, tail, leave);
            },
            Regex::Plus(r, greed) => {
                let (enter, leave) = priorities(*greed);
                let h = self.nfa.state();
                let t = self.nfa.state();

                self.build_in(r, h, t, parent);
                self.eps(head, h, Priority::Normal);
                self.eps(t, h, enter);
                self.eps(t, tail, leave);
            },
            Regex::Opt(r, greed) => {
                let (enter, leave) = priorities(*greed);
                let h = self.nfa.state();
                let t = self.nfa.state();

                self.build_in(r, h, t, parent);
                self.eps(head, h, enter);
                self.eps(head, tail, leave);
                self.eps(t, tail, Priority::Normal);
            },
            Regex::Alt(v) => {
                for (i, r) in v.iter().enumerate() {
                    let h = self.nfa.state();
                    let t = self.nfa.state();

                    self.build_in(r, h, t, parent);
                    self.eps(head, h, if i == 0 {
                        Priority::Normal
                    } else {
                        Priority::Low
                    });
                    self.eps(t, tail, Priority::Normal);
                }
            },
            Regex::Cat(v) => self.build_cat_in(v, head, tail, parent),
        }
    }

    fn build_cat_in(&mut self, v: &[Regex], head: State, tail: State, parent: usize) {
        let Some((last, init)) = v.split_last() else {
            self.eps(head, tail, Priority::Normal);
            return;
        };

        let mut h = head;
        for re in init {
            let t = self.nfa.state();
            self.build_in(re, h, t, parent);
            h = t;
        }

        self.build_in(last, h, tail, parent);
    }
}

/// Priorities for taking and for skipping another iteration
fn priorities(greed: Greed) -> (Priority, Priority) {
    match greed {
        Greed::Greedy => (Priority::Normal, Priority::Low),
        Greed::Lazy => (Priority::Low, Priority::Normal),
    }
}
