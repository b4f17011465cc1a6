//! Compiled patterns

use crate::{
    config::Config,
    interp::Interpreter,
    matches::MatchResult,
    re::{self, ParseError, compile::compile},
    tnfa::Tnfa,
};

/// A regular expression ready for matching.
///
/// Matching needs `&mut self` because the DFA is compiled while inputs are
/// interpreted, and the compiled states are kept for later inputs.  Use one
/// `Pattern` per thread.
#[derive(Debug)]
pub struct Pattern {
    interp: Interpreter,
}

impl Pattern {
    /// Parse and compile `pattern` with the default [`Config`]
    ///
    /// # Errors
    /// Fails if `pattern` is not valid syntax.
    pub fn new(pattern: &str) -> Result<Self, ParseError> {
        Self::with_config(pattern, Config::default())
    }

    /// # Errors
    /// Fails if `pattern` is not valid syntax.
    #[tracing::instrument(level = "debug", err)]
    pub fn with_config(pattern: &str, config: Config) -> Result<Self, ParseError> {
        let re = re::parse(pattern)?;
        let tnfa = compile(&re, config.anchor);
        tracing::debug!(groups = tnfa.groups().len(), "Compiled TNFA");

        Ok(Self::from_tnfa(tnfa, config))
    }

    /// Match with a TNFA built by hand.  [`Config::anchor`] is ignored
    /// since anchoring is part of the automaton.
    #[must_use]
    pub fn from_tnfa(tnfa: Tnfa, config: Config) -> Self {
        Self {
            interp: Interpreter::new(tnfa, config),
        }
    }

    #[must_use]
    #[inline]
    pub fn tnfa(&self) -> &Tnfa { self.interp.tnfa() }

    /// Number of capture groups, including group 0
    #[must_use]
    #[inline]
    pub fn group_count(&self) -> usize { self.interp.tnfa().groups().len() }

    pub fn interpret(&mut self, input: &str) -> MatchResult { self.interp.interpret(input) }

    /// The transitions compiled so far, one per line as
    /// `from-lo-hi -> to [instructions]`
    #[must_use]
    pub fn dump_table(&self) -> String { self.interp.table().to_string() }

    #[must_use]
    #[inline]
    pub fn table_len(&self) -> usize { self.interp.table().len() }

    #[must_use]
    #[inline]
    pub fn state_count(&self) -> usize { self.interp.registry().len() }

    /// The threads of DFA state `idx`, if it has been compiled
    #[must_use]
    pub fn dfa_state(&self, idx: usize) -> Option<String> {
        self.interp.registry().get(idx).map(ToString::to_string)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::Pattern;
    use crate::{
        config::{Anchor, Config},
        input::{Input, InputRange},
        matches::Span,
        re::{ParseError, Regex, parse::MAX_DEPTH},
        tag::{CaptureGroup, Tag},
        tnfa::{Priority, Tnfa, TnfaBuilder},
    };

    fn spans(pattern: &str, input: &str) -> Vec<(isize, isize)> {
        let mut pat = Pattern::new(pattern).unwrap();
        let m = pat.interpret(input);
        assert!(m.is_match(), "{pattern:?} should match {input:?}");

        (0..pat.group_count())
            .map(|g| (m.start_of(g).unwrap(), m.end_of(g).unwrap()))
            .collect()
    }

    fn search(pattern: &str, input: &str) -> String {
        let config = Config {
            anchor: Anchor::Search,
            ..Config::default()
        };
        Pattern::with_config(pattern, config)
            .unwrap()
            .interpret(input)
            .to_string()
    }

    #[test]
    fn literals() {
        let mut ab = Pattern::new("ab").unwrap();

        assert_eq!(ab.interpret("ab").to_string(), "0-1");
        assert_eq!(ab.interpret("aba").to_string(), "NO_MATCH");
        assert_eq!(ab.interpret("a").to_string(), "NO_MATCH");
        assert_eq!(search("ab", "aba"), "0-1");
        assert_eq!(search("ab", "cabab"), "1-2");
        assert_eq!(search("ab", "ba"), "NO_MATCH");
    }

    #[test]
    fn greedy_plus_is_anchored() {
        let mut pat = Pattern::new("a+").unwrap();

        assert_eq!(pat.interpret("aba").to_string(), "NO_MATCH");
        assert_eq!(pat.interpret("aaa").to_string(), "0-2");
        assert_eq!(search("a+", "baaab"), "1-3");
    }

    #[test]
    fn nested_repetition() {
        let mut pat = Pattern::new("(((a+)b)+c)+").unwrap();
        let m = pat.interpret("aaabcaaabcaabc");

        assert_eq!(m.to_string(), "0-13");
        assert_eq!(m.group(1).unwrap(), Some(Span::new(10, 13)));
        assert_eq!(m.group(2).unwrap(), Some(Span::new(10, 12)));
        assert_eq!(m.group(3).unwrap(), Some(Span::new(10, 11)));

        assert_eq!(m.history(1).unwrap(), &[
            Span::new(0, 4),
            Span::new(5, 9),
            Span::new(10, 13)
        ]);
        assert_eq!(m.history(2).unwrap(), &[
            Span::new(0, 3),
            Span::new(5, 8),
            Span::new(10, 12)
        ]);
        assert_eq!(m.history(3).unwrap(), &[
            Span::new(0, 2),
            Span::new(5, 7),
            Span::new(10, 11)
        ]);
        assert!(m.group(4).is_err());
    }

    #[test]
    fn leftmost_first_alternation() {
        assert_eq!(spans("(a|ab)(c|bcd)(d*)", "abcd"), [
            (0, 3),
            (0, 0),
            (1, 3),
            (4, 3)
        ]);
    }

    #[test]
    fn greed() {
        assert_eq!(spans("(a*?)(a*)", "aaa"), [(0, 2), (0, -1), (0, 2)]);
        assert_eq!(spans("(a*)(a*)", "aaa"), [(0, 2), (0, 2), (3, 2)]);
    }

    #[test]
    fn repeated_group_keeps_its_history() {
        let mut pat = Pattern::new("(a)*").unwrap();
        let m = pat.interpret("aaa");

        assert_eq!(m.to_string(), "0-2");
        assert_eq!(m.group(1).unwrap(), Some(Span::new(2, 2)));
        assert_eq!(m.history(1).unwrap(), &[
            Span::new(0, 0),
            Span::new(1, 1),
            Span::new(2, 2)
        ]);

        // Every iteration is renamed back onto the first loop state
        assert_eq!(pat.table_len(), 1);
        assert_eq!(pat.state_count(), 1);
    }

    #[test]
    fn unset_groups() {
        assert_eq!(spans("(a)|b", "b"), [(0, 0), (-1, -1)]);
        assert_eq!(spans("(a)*", ""), [(0, -1), (-1, -1)]);
    }

    #[test]
    fn empty_input() {
        let mut star = Pattern::new("a*").unwrap();
        let m = star.interpret("");
        assert_eq!((m.start(), m.end()), (0, -1));

        assert!(!Pattern::new("a").unwrap().interpret("").is_match());
        assert!(Pattern::new("").unwrap().interpret("").is_match());
    }

    #[test]
    fn out_of_alphabet() {
        let mut pat = Pattern::new("[a-c]+").unwrap();

        assert_eq!(pat.interpret("abz").to_string(), "NO_MATCH");
        assert_eq!(pat.interpret("\u{1f600}").to_string(), "NO_MATCH");
        assert_eq!(pat.interpret("cab").to_string(), "0-2");
    }

    #[test]
    fn end_anchor() {
        let mut pat = Pattern::new("a*$").unwrap();
        assert_eq!(pat.interpret("aa").to_string(), "0-1");

        assert_eq!(search("b$", "abab"), "3-3");
        assert_eq!(search("b$", "aba"), "NO_MATCH");
    }

    #[test]
    fn caching_is_idempotent() {
        let mut pat = Pattern::new("(x|y)*z").unwrap();

        assert!(pat.interpret("xyxz").is_match());
        let table = pat.dump_table();
        let len = pat.table_len();

        assert!(pat.interpret("xyxz").is_match());
        assert!(pat.interpret("yxyxz").is_match());
        assert_eq!(pat.table_len(), len);
        assert_eq!(pat.dump_table(), table);
    }

    #[test]
    fn introspection_is_deterministic() {
        let run = || {
            let mut pat = Pattern::new("(a|b)*(ab)?").unwrap();
            let results: Vec<_> = ["abab", "ba", "aab", "c"]
                .into_iter()
                .map(|i| pat.interpret(i))
                .collect();
            let states: Vec<_> = (0..pat.state_count())
                .map(|i| pat.dfa_state(i).unwrap())
                .collect();
            (results, pat.dump_table(), states)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn dump_format() {
        let mut pat = Pattern::new("ab").unwrap();
        assert!(pat.dfa_state(0).unwrap().starts_with('{'));
        assert!(pat.dfa_state(1).is_none());

        pat.interpret("ab");
        let dump = pat.dump_table();
        let lines: Vec<_> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0-a-a -> 1 ["), "{dump}");
        assert!(lines[1].starts_with("1-b-b -> 2 ["), "{dump}");
    }

    /// `b` or `[a-c]` from the same state, where only the `b` branch passes
    /// through group 1
    fn overlapping_branches(b_first: bool) -> Tnfa {
        let mut b = TnfaBuilder::new();
        let [s0, s1, s2, s3, s4, s5] = [(); 6].map(|()| b.state());
        b.set_initial(s0);
        b.set_accept(s5);
        b.declare_group(CaptureGroup::ENTIRE_MATCH);
        b.declare_group(CaptureGroup::new(1, 0));

        let single = Input::Range(InputRange::single('b'));
        let range = Input::Range(InputRange::new('a', 'c'));
        let (first, second) = if b_first { (single, range) } else { (range, single) };
        let target = |i: Input| if i == single { s2 } else { s4 };

        b.connect(s0, Input::Epsilon, s1, Priority::Normal, Some(Tag::start(0)));
        b.connect(s1, first, target(first), Priority::Normal, None);
        b.connect(s1, second, target(second), Priority::Normal, None);
        b.connect(s2, Input::Epsilon, s3, Priority::Normal, Some(Tag::start(1)));
        b.connect(s3, Input::Epsilon, s4, Priority::Normal, Some(Tag::end(1)));
        b.connect(s4, Input::Epsilon, s5, Priority::Normal, Some(Tag::end(0)));
        b.build()
    }

    #[test]
    fn hand_built_edges_keep_insertion_order() {
        let mut pat = Pattern::from_tnfa(overlapping_branches(true), Config::default());
        let m = pat.interpret("b");
        assert_eq!(m.to_string(), "0-0");
        assert_eq!(m.group(1).unwrap(), Some(Span::new(1, 0)));
        assert_eq!(pat.interpret("a").group(1).unwrap(), None);

        let mut pat = Pattern::from_tnfa(overlapping_branches(false), Config::default());
        let m = pat.interpret("b");
        assert_eq!(m.to_string(), "0-0");
        assert_eq!(m.group(1).unwrap(), None);
    }

    #[test]
    fn deep_nesting() {
        let nested = |n: usize| format!("{}a{}", "(".repeat(n), ")".repeat(n));

        let mut pat = Pattern::new(&nested(MAX_DEPTH)).unwrap();
        let m = pat.interpret("a");
        assert_eq!(m.group_count(), MAX_DEPTH + 1);
        assert_eq!(m.group(MAX_DEPTH).unwrap(), Some(Span::new(0, 0)));

        assert_eq!(
            Pattern::new(&nested(50_000)).unwrap_err(),
            ParseError::TooDeep(MAX_DEPTH)
        );
    }

    /// Backtracking reference for whole-input membership
    fn accepts(re: &Regex, s: &[char], i: usize, k: &mut dyn FnMut(usize) -> bool) -> bool {
        fn cat(v: &[Regex], s: &[char], i: usize, k: &mut dyn FnMut(usize) -> bool) -> bool {
            match v.split_first() {
                None => k(i),
                Some((re, rest)) => accepts(re, s, i, &mut |j| cat(rest, s, j, k)),
            }
        }

        // Iterations must make progress
        fn star(re: &Regex, s: &[char], i: usize, k: &mut dyn FnMut(usize) -> bool) -> bool {
            k(i) || accepts(re, s, i, &mut |j| j > i && star(re, s, j, k))
        }

        match re {
            Regex::Any => i < s.len() && k(i + 1),
            Regex::Lit(c) => s.get(i) == Some(c) && k(i + 1),
            Regex::Set(ranges) => {
                s.get(i).is_some_and(|&c| ranges.iter().any(|r| r.contains(c))) && k(i + 1)
            },
            Regex::Eos => i == s.len() && k(i),
            Regex::Group(r) => accepts(r, s, i, k),
            Regex::Opt(r, _) => accepts(r, s, i, k) || k(i),
            Regex::Star(r, _) => star(r, s, i, k),
            Regex::Plus(r, _) => accepts(r, s, i, &mut |j| star(r, s, j, k)),
            Regex::Alt(v) => v.iter().any(|r| accepts(r, s, i, k)),
            Regex::Cat(v) => cat(v, s, i, k),
        }
    }

    fn input() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::char::range('a', 'd'), 0..7)
            .prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn agrees_with_backtracking(
            re in crate::re::re(4, 16, 3, prop::char::range('a', 'c')),
            inputs in prop::collection::vec(input(), 1..6),
        ) {
            let mut pat = Pattern::new(&re.to_string()).unwrap();

            for input in inputs {
                let chars: Vec<_> = input.chars().collect();
                let expected = accepts(&re, &chars, 0, &mut |j| j == chars.len());
                assert_eq!(pat.interpret(&input).is_match(), expected, "{re} on {input:?}");
            }
        }

        #[test]
        fn merging_preserves_captures(
            re in crate::re::re(4, 16, 3, prop::char::range('a', 'c')),
            inputs in prop::collection::vec(input(), 1..6),
            anchor in prop_oneof![Just(Anchor::Full), Just(Anchor::Search)],
        ) {
            let pattern = re.to_string();
            let mut merged = Pattern::with_config(&pattern, Config {
                anchor,
                merge_states: true,
            }).unwrap();
            let mut unmerged = Pattern::with_config(&pattern, Config {
                anchor,
                merge_states: false,
            }).unwrap();

            for input in inputs {
                assert_eq!(
                    merged.interpret(&input),
                    unmerged.interpret(&input),
                    "{pattern} on {input:?}"
                );
            }
        }
    }
}
