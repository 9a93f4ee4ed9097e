//! Turning worker results back into a root decision.
//!
//! One aggregation run exists per user request. A dedicated thread owns
//! the result channel and the value table, so no locking is needed around
//! either: workers' results funnel in as messages, and once every job has
//! reported, the run replays the root expansion with
//! [`alpha_beta_with_table`] and hands the chosen child to the callback.
//!
//! The replay is sound because every job state was produced by the same
//! successor enumeration the shallow search performs: whenever the search
//! reaches a state whose id is tabled, it substitutes the true sub-tree
//! value a worker computed to whatever depth its budget allowed.

use std::thread;

use colored::Colorize;
use crossbeam::channel::bounded;
use crossbeam::channel::Sender;
use games::Game;
use games::Value;
use search::alpha_beta_with_table;
use search::ValueTable;

/// One evaluated job as it comes off the wire: the job state, the value a
/// worker computed for its sub-tree, and the worker's analyzed-state count.
#[derive(Debug, Clone)]
pub struct JobResult<G: Game> {
    pub state: G,
    pub value: Value,
    pub nodes: u64,
}

/// Start an aggregation run expecting one result per planned job.
///
/// Returns the inbox to forward worker results to. `on_done` is invoked
/// exactly once, from the aggregation thread, with the root's chosen
/// child; it must not block indefinitely.
pub fn spawn<G, F>(root: G, expected: usize, on_done: F) -> Sender<JobResult<G>>
where
    G: Game,
    F: FnOnce(G) + Send + 'static,
{
    let (inbox, results) = bounded::<JobResult<G>>(expected);

    thread::spawn(move || {
        let mut table = ValueTable::with_capacity(expected);
        let mut analyzed: u64 = 0;

        for _ in 0..expected {
            // The senders only disappear when the coordinator itself is
            // torn down; a missing result otherwise blocks the run forever.
            let Ok(result) = results.recv() else { return };

            analyzed += result.nodes;
            table.insert(result.state.id(), result.value);
        }

        let outcome = alpha_beta_with_table(&root, &table);
        let best = outcome
            .best
            .expect("a planned root always has a child to choose");

        eprintln!(
            "[{}]: {expected} results in, {analyzed} states analyzed, root value {}",
            "Aggregate".blue(),
            outcome.value,
        );

        on_done(best);
    });

    inbox
}
