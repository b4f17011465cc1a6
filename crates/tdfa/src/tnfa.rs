//! Tagged nondeterministic finite automata

use std::{collections::BTreeMap, fmt};

use hashbrown::{HashMap, HashSet};

use crate::{
    free::{Free, id_type},
    input::{Input, InputRange},
    tag::{CaptureGroup, Tag},
};

id_type! {
    /// A TNFA state
    pub struct State("q");
}

/// Disambiguates between the out-edges of a state.  Every `Normal` edge is
/// explored before any `Low` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Normal,
    Low,
}

/// The target half of a TNFA edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub to: State,
    pub priority: Priority,
    pub tag: Option<Tag>,
    seq: usize,
}

impl Transition {
    /// Exploration order among the out-edges of one state: priority first,
    /// then the order the edges were connected in
    #[must_use]
    #[inline]
    pub fn order(&self) -> (Priority, usize) { (self.priority, self.seq) }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            to, priority, tag, ..
        } = self;
        write!(f, "{to}")?;

        if *priority == Priority::Low {
            f.write_str(" (low)")?;
        }

        if let Some(tag) = tag {
            write!(f, " {tag}")?;
        }

        Ok(())
    }
}

type Table = BTreeMap<(State, Input), Vec<Transition>>;

/// An immutable tagged NFA with a single accepting state.
///
/// Edges are stored in one table sorted by `(source, label)`; the targets
/// for each key are kept ordered by priority, then by insertion.
#[derive(Debug)]
pub struct Tnfa {
    table: Table,
    initial: State,
    accept: State,
    groups: Vec<CaptureGroup>,
    tags: Vec<Tag>,
    slots: HashMap<Tag, usize>,
    live: HashSet<State>,
}

impl Tnfa {
    #[must_use]
    #[inline]
    pub fn initial(&self) -> State { self.initial }

    #[must_use]
    #[inline]
    pub fn accept(&self) -> State { self.accept }

    #[must_use]
    #[inline]
    pub fn is_accepting(&self, state: State) -> bool { state == self.accept }

    /// True if `state` can consume input (or end-of-input), or is accepting.
    /// Only live states need to be remembered between steps.
    #[must_use]
    #[inline]
    pub fn is_live(&self, state: State) -> bool { self.live.contains(&state) }

    #[must_use]
    #[inline]
    pub fn groups(&self) -> &[CaptureGroup] { &self.groups }

    /// All tags, in slot order
    #[must_use]
    #[inline]
    pub fn tags(&self) -> &[Tag] { &self.tags }

    #[must_use]
    #[inline]
    pub fn slot(&self, tag: Tag) -> Option<usize> { self.slots.get(&tag).copied() }

    /// Transitions from `state` consuming `c`, ordered by priority, then by
    /// insertion
    #[must_use]
    pub fn on_char(&self, state: State, c: char) -> Vec<Transition> {
        let lo = (state, Input::Range(InputRange::single('\0')));
        let hi = (state, Input::Range(InputRange::new(c, char::MAX)));

        let mut out: Vec<_> = self
            .table
            .range(lo..=hi)
            .filter(|((_, i), _)| matches!(i, Input::Range(r) if r.contains(c)))
            .flat_map(|(_, v)| v.iter().copied())
            .collect();
        out.sort_by_key(Transition::order);
        out
    }

    /// Epsilon transitions from `state`, ordered by priority
    #[must_use]
    pub fn on_epsilon(&self, state: State) -> &[Transition] { self.get(state, Input::Epsilon) }

    /// End-of-input transitions from `state`, ordered by priority
    #[must_use]
    pub fn on_eos(&self, state: State) -> &[Transition] { self.get(state, Input::Eos) }

    fn get(&self, state: State, input: Input) -> &[Transition] {
        self.table.get(&(state, input)).map_or(&[][..], Vec::as_slice)
    }

    /// Every character range labelling some transition
    pub fn input_ranges(&self) -> impl Iterator<Item = InputRange> + '_ {
        self.table.keys().filter_map(|(_, i)| match i {
            Input::Range(r) => Some(*r),
            Input::Eos | Input::Epsilon => None,
        })
    }
}

impl fmt::Display for Tnfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial {}, accept {}", self.initial, self.accept)?;

        for ((from, input), targets) in &self.table {
            for target in targets {
                writeln!(f, "{from} -{input}-> {target}")?;
            }
        }

        Ok(())
    }
}

/// Incrementally assembles a [`Tnfa`]
#[derive(Debug, Default)]
pub struct TnfaBuilder {
    free: Free<State>,
    table: Table,
    initial: Option<State>,
    accept: Option<State>,
    groups: BTreeMap<usize, CaptureGroup>,
    edges: usize,
}

impl TnfaBuilder {
    #[must_use]
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    #[inline]
    pub fn state(&mut self) -> State { self.free.fresh() }

    pub fn connect(
        &mut self,
        from: State,
        input: Input,
        to: State,
        priority: Priority,
        tag: Option<Tag>,
    ) {
        let seq = self.edges;
        self.edges += 1;

        let targets = self.table.entry((from, input)).or_default();
        let idx = targets.partition_point(|t| t.priority <= priority);
        targets.insert(idx, Transition {
            to,
            priority,
            tag,
            seq,
        });
    }

    /// # Panics
    /// Panics if an initial state was already set.
    pub fn set_initial(&mut self, state: State) {
        assert!(
            self.initial.replace(state).is_none(),
            "TNFA initial state set twice"
        );
    }

    /// # Panics
    /// Panics if an accepting state was already set.
    pub fn set_accept(&mut self, state: State) {
        assert!(
            self.accept.replace(state).is_none(),
            "TNFA accepting state set twice"
        );
    }

    /// # Panics
    /// Panics if a group with the same number was already declared.
    pub fn declare_group(&mut self, group: CaptureGroup) {
        assert!(
            self.groups.insert(group.number(), group).is_none(),
            "Capture group {} declared twice",
            group.number()
        );
    }

    /// # Panics
    /// Panics if the initial or accepting state is missing, if the declared
    /// groups are not numbered densely from 0, or if a transition carries a
    /// tag for an undeclared group.
    #[must_use]
    pub fn build(self) -> Tnfa {
        let Self {
            free: _,
            table,
            initial,
            accept,
            groups,
            edges: _,
        } = self;

        let initial = initial.unwrap_or_else(|| panic!("TNFA has no initial state"));
        let accept = accept.unwrap_or_else(|| panic!("TNFA has no accepting state"));

        let groups: Vec<_> = groups.into_values().collect();
        assert!(
            groups.iter().enumerate().all(|(i, g)| g.number() == i),
            "Capture groups are not numbered densely from 0"
        );

        let tags: Vec<_> = groups
            .iter()
            .flat_map(|g| [g.start_tag(), g.end_tag()])
            .collect();
        let slots: HashMap<_, _> = tags.iter().enumerate().map(|(i, &t)| (t, i)).collect();

        for tag in table.values().flatten().filter_map(|t| t.tag) {
            assert!(slots.contains_key(&tag), "Transition tagged {tag} for an undeclared group");
        }

        let live = table
            .keys()
            .filter(|(_, i)| !matches!(i, Input::Epsilon))
            .map(|&(s, _)| s)
            .chain([accept])
            .collect();

        Tnfa {
            table,
            initial,
            accept,
            groups,
            tags,
            slots,
            live,
        }
    }
}
