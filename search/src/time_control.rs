//! The wall-clock budget enforcement for a worker's search.
//!
//! A search budget can't be honored by a fixed-depth search: too shallow
//! wastes the budget, too deep blows through it. Instead the driver runs
//! iterative deepening on a separate thread, publishing the result of every
//! fully completed depth, and the calling thread sleeps out the budget
//! before collecting the deepest published answer.
//!
//! A depth that is still in flight when the budget expires is abandoned,
//! never published: the search thread only checks the stop flag between
//! depths, finishes its current iteration, and exits on the next check.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use games::Game;

use crate::alpha_beta::minimax;
use crate::alpha_beta::Outcome;

/// A wrapper for aborting a search running on a different thread.
#[derive(Clone, Default)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    /// Signal the search to stop after its current depth.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Check whether the search has been aborted.
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Search `state` at increasing depths for `budget`, returning the result
/// of the deepest fully completed iteration.
///
/// Depth 1 is never aborted, so there is always an answer, even under a
/// zero budget.
pub fn time_limited<G: Game>(state: &G, budget: Duration) -> Outcome<G> {
    let published = Arc::new((Mutex::new(None), Condvar::new()));
    let handle = StopHandle::default();

    let searcher = handle.clone();
    let slot = Arc::clone(&published);
    let state = state.clone();
    thread::spawn(move || {
        for depth in 1.. {
            if depth > 1 && searcher.stopped() {
                break;
            }

            // Each completed depth overwrites the previous one; a shallower
            // result is never worth keeping around.
            let outcome = minimax(&state, depth);
            let (lock, cvar) = &*slot;
            *lock.lock().unwrap() = Some(outcome);
            cvar.notify_one();
        }
    });

    thread::sleep(budget);
    handle.stop();

    // Wait out the first iteration if it hasn't landed yet.
    let (lock, cvar) = &*published;
    let mut slot = lock.lock().unwrap();
    loop {
        match slot.take() {
            Some(deepest) => return deepest,
            None => slot = cvar.wait(slot).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use games::tic_tac_toe::TicTacToe;
    use games::MAX_WIN;

    use super::*;

    #[test]
    fn always_returns_an_answer() {
        let state = TicTacToe { x: 0o050, o: 0o600, x_to_move: true };
        let outcome = time_limited(&state, Duration::ZERO);

        assert!(outcome.best.is_some());
    }

    #[test]
    fn finds_the_win_within_the_budget() {
        // Depth 2 on a five-square tic-tac-toe endgame completes far
        // inside the budget.
        let state = TicTacToe { x: 0o050, o: 0o600, x_to_move: true };
        let outcome = time_limited(&state, Duration::from_millis(200));

        assert_eq!(outcome.value, MAX_WIN);
        assert_eq!(outcome.best.unwrap(), TicTacToe { x: 0o070, o: 0o600, x_to_move: false });
    }

    #[test]
    fn search_threads_outlive_the_driver_harmlessly() {
        // A Connect Four root is far too big to exhaust; the in-flight
        // iteration is detached and must not block the return.
        let state = games::connect_four::ConnectFour::new();
        let outcome = time_limited(&state, Duration::from_millis(50));

        assert!(outcome.best.is_some());
        assert_eq!(outcome.best.unwrap().moves().count(), 7);
    }
}
