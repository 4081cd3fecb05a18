//! Ready-made step trees used by the CLI and the test suite.
//!
//! Every action appends a line to the `trace` key so callers can see exactly
//! which steps ran.

use std::fmt;

use clap::ValueEnum;

use crate::domain::{async_action, ensure, sync_action, ActionResult, DomainError, State, Step};

/// State key holding the `Vec<String>` of executed phases.
pub const TRACE_KEY: &str = "trace";

/// State key holding the shared `i32` counter.
pub const COUNTER_KEY: &str = "c";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Two nested links sharing a counter, with async actions
    Counter,
    /// Nested counter whose root cleanup expects 1 (passes)
    Pass,
    /// Same tree, but the root cleanup expects 0 (fails in cleanup)
    Fail,
    /// A child's setup fails before its siblings run
    Abort,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::Counter => "counter",
            Scenario::Pass => "pass",
            Scenario::Fail => "fail",
            Scenario::Abort => "abort",
        };
        write!(f, "{}", name)
    }
}

impl Scenario {
    pub fn build(self) -> Step {
        match self {
            Scenario::Counter => counter_tree(),
            Scenario::Pass => nested_counter_tree(1),
            Scenario::Fail => nested_counter_tree(0),
            Scenario::Abort => abort_tree(),
        }
    }
}

/// Append `event` to the trace kept in `state`.
pub fn record(state: &mut State, event: &str) {
    match state.get_mut::<Vec<String>>(TRACE_KEY) {
        Some(trace) => trace.push(event.to_string()),
        None => state.insert(TRACE_KEY, vec![event.to_string()]),
    }
}

/// The recorded trace, empty if nothing ran.
pub fn trace(state: &State) -> &[String] {
    state
        .get::<Vec<String>>(TRACE_KEY)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn bump(state: &mut State, delta: i32) -> ActionResult {
    *state.require_mut::<i32>(COUNTER_KEY)? += delta;
    Ok(())
}

fn counter(state: &State) -> Result<i32, DomainError> {
    state.require::<i32>(COUNTER_KEY).copied()
}

/// first_link sets the counter, second_link bumps it and puts it back,
/// and first_link's cleanup checks it is back to zero after its own decrement.
fn counter_tree() -> Step {
    let mut root = Step::named("counter");
    let first = root
        .attach(async_action(|state: &mut State| {
            Box::pin(async move {
                record(state, "enter first_link");
                state.insert(COUNTER_KEY, 1_i32);
                Ok(())
            })
        }))
        .with_name("first_link");
    first.set_cleanup(async_action(|state: &mut State| {
        Box::pin(async move {
            record(state, "leave first_link");
            bump(state, -1)?;
            ensure(counter(state)? == 0, "counter should be back to 0")
        })
    }));

    let second = first
        .attach(async_action(|state: &mut State| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                record(state, "enter second_link");
                bump(state, 1)
            })
        }))
        .with_name("second_link");
    second.set_cleanup(sync_action(|state: &mut State| {
        record(state, "leave second_link");
        bump(state, -1)
    }));
    root
}

/// Root sets c=1, child bumps to 2 and restores 1, root cleanup expects `expected`.
fn nested_counter_tree(expected: i32) -> Step {
    let mut root = Step::named("nested");
    {
        let outer = root
            .attach(sync_action(|state: &mut State| {
                record(state, "enter outer");
                state.insert(COUNTER_KEY, 1_i32);
            }))
            .with_name("outer");
        outer.set_cleanup(sync_action(move |state: &mut State| {
            record(state, "leave outer");
            let c = counter(state)?;
            ensure(c == expected, format!("expected c == {expected}, got {c}"))
        }));

        let inner = outer
            .attach(sync_action(|state: &mut State| {
                record(state, "enter inner");
                bump(state, 1)
            }))
            .with_name("inner");
        inner.set_cleanup(sync_action(|state: &mut State| {
            record(state, "leave inner");
            bump(state, -1)
        }));
    }
    root
}

/// Parent with three children where the second child's setup fails.
fn abort_tree() -> Step {
    let mut root = Step::named("abort");
    let parent = root
        .attach(sync_action(|state: &mut State| record(state, "enter parent")))
        .with_name("parent");
    parent.set_cleanup(sync_action(|state: &mut State| record(state, "leave parent")));

    parent
        .attach(sync_action(|state: &mut State| record(state, "enter first")))
        .with_name("first")
        .set_cleanup(sync_action(|state: &mut State| record(state, "leave first")));

    parent
        .attach(sync_action(|state: &mut State| -> Result<(), std::io::Error> {
            record(state, "enter broken");
            Err(std::io::Error::other("fixture unavailable"))
        }))
        .with_name("broken")
        .set_cleanup(sync_action(|state: &mut State| record(state, "leave broken")));

    parent
        .attach(sync_action(|state: &mut State| record(state, "enter last")))
        .with_name("last");
    root
}
