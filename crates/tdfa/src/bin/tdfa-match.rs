//! Match inputs against a pattern and print the captured spans

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

use std::io::{self, BufRead, Write};

use clap::Parser;
use tdfa::{Anchor, Config, MatchResult, Pattern, Span};
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Parser)]
#[command(version, author, about)]
struct Opts {
    /// Log filter, using env_logger-like syntax
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_filter: String,

    /// Find the leftmost match anywhere in each input instead of matching
    /// the whole input
    #[arg(long)]
    search: bool,

    /// Register every DFA state instead of merging equivalent ones
    #[arg(long)]
    no_merge: bool,

    /// Print the compiled transition table after matching
    #[arg(long)]
    dump_table: bool,

    /// Print every span captured by repeated groups
    #[arg(long)]
    history: bool,

    /// The pattern to match
    pattern: String,

    /// Inputs to match.  Lines are read from standard input if none are
    /// given.
    inputs: Vec<String>,
}

macro_rules! fatal {
    ($($args:tt)*) => ({
        ::tracing::error!($($args)*);
        ::std::process::exit(1);
    })
}

fn spans(spans: &[Span]) -> String {
    spans
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn report(out: &mut impl Write, input: &str, m: &MatchResult, history: bool) -> io::Result<()> {
    write!(out, "{input:?}: {m}")?;

    for g in 1..m.group_count() {
        let span = m.group(g).ok().flatten().unwrap_or(Span::UNSET);
        write!(out, " {g}:{span}")?;
    }
    writeln!(out)?;

    if history {
        for g in 0..m.group_count() {
            let hist = m.history(g).unwrap_or_default();
            writeln!(out, "  {g}: [{}]", spans(hist))?;
        }
    }

    Ok(())
}

fn main() {
    let Opts {
        log_filter,
        search,
        no_merge,
        dump_table,
        history,
        pattern,
        inputs,
    } = Opts::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&log_filter)
                .unwrap_or_else(|e| fatal!("Invalid log filter {log_filter:?}: {e}")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config {
        anchor: if search { Anchor::Search } else { Anchor::Full },
        merge_states: !no_merge,
    };
    let mut pat = Pattern::with_config(&pattern, config)
        .unwrap_or_else(|e| fatal!("Invalid pattern {pattern:?}: {e}"));

    let inputs: Box<dyn Iterator<Item = io::Result<String>>> = if inputs.is_empty() {
        Box::new(io::stdin().lock().lines())
    } else {
        Box::new(inputs.into_iter().map(Ok))
    };

    let mut out = io::stdout().lock();
    for input in inputs {
        let input = input.unwrap_or_else(|e| fatal!("Error reading input: {e}"));
        let m = pat.interpret(&input);

        report(&mut out, &input, &m, history)
            .unwrap_or_else(|e| fatal!("Error writing output: {e}"));
    }

    if dump_table {
        write!(out, "{}", pat.dump_table())
            .unwrap_or_else(|e| fatal!("Error writing output: {e}"));
    }
}
