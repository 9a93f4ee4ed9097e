//! Minimax with alpha-beta pruning and a pluggable leaf-value override.
//!
//! The override table is what makes the distributed pipeline work: the
//! coordinator runs [`alpha_beta_with_table`] over the root with a table
//! mapping each job state's canonical id to the value a worker computed
//! for it. The search re-expands the same children the planner did and,
//! the moment it reaches a state present in the table, treats it as a leaf
//! worth the worker's value.

use std::collections::HashMap;

use games::Game;
use games::Value;
use games::MAX_WIN;
use games::MIN_WIN;

/// Sub-tree values keyed by canonical state id.
pub type ValueTable<I> = HashMap<I, Value>;

/// The result of a search: the value of the searched state, the child that
/// realizes it, and how many states were analyzed along the way.
#[derive(Debug, Clone)]
pub struct Outcome<G: Game> {
    pub value: Value,
    /// `None` when the searched state was a leaf by depth, by game rules,
    /// or by an override hit.
    pub best: Option<G>,
    pub nodes: u64,
}

/// Depth passed by [`alpha_beta_with_table`]: deep enough that terminal
/// states or table hits always cap the recursion first.
const TABLE_DEPTH: u32 = 100;

/// Alpha-beta search to `max_depth` plies.
///
/// Children are visited in the game's move order and a child only replaces
/// the running best on strict improvement, so ties go to the earlier move.
/// The search is total: it never fails on a well-formed state.
pub fn alpha_beta<G: Game>(
    state: &G,
    max_depth: u32,
    mut alpha: Value,
    mut beta: Value,
    overrides: Option<&ValueTable<G::Id>>,
) -> Outcome<G> {
    if let Some(table) = overrides {
        if let Some(&value) = table.get(&state.id()) {
            return Outcome { value, best: None, nodes: 1 };
        }
    }

    let mut moves = state.moves().peekable();

    if max_depth == 0 || moves.peek().is_none() {
        return Outcome { value: state.value(), best: None, nodes: 1 };
    }

    let maximizing = state.maximizing();
    let mut best_value = if maximizing { MIN_WIN } else { MAX_WIN };
    let mut best = None;
    let mut nodes = 0;

    for child in moves {
        if alpha >= beta {
            break;
        }

        let reply = alpha_beta(&child, max_depth - 1, alpha, beta, overrides);
        nodes += reply.nodes;

        if maximizing {
            if reply.value > best_value {
                best_value = reply.value;
                best = Some(child);
            }
            alpha = alpha.max(reply.value);
        } else {
            if reply.value < best_value {
                best_value = reply.value;
                best = Some(child);
            }
            beta = beta.min(reply.value);
        }
    }

    Outcome { value: best_value, best, nodes }
}

/// Plain minimax: alpha-beta with the widest possible window and no
/// override table.
pub fn minimax<G: Game>(state: &G, max_depth: u32) -> Outcome<G> {
    alpha_beta(state, max_depth, MIN_WIN, MAX_WIN, None)
}

/// The coordinator-side shallow search: expand the root until every branch
/// bottoms out in a table hit or a terminal state.
pub fn alpha_beta_with_table<G: Game>(state: &G, table: &ValueTable<G::Id>) -> Outcome<G> {
    alpha_beta(state, TABLE_DEPTH, MIN_WIN, MAX_WIN, Some(table))
}
