//! Root expansion into worker-sized jobs.

use std::collections::VecDeque;

use anyhow::ensure;
use anyhow::Result;
use games::Game;

/// Expand `root` breadth-first until every worker has at least one job.
///
/// The root itself is never handed out whole: workers report only the value
/// of each job state, not a recommended move, so a plan with a single job
/// covering the root would leave the coordinator knowing how good the
/// position is without knowing which move realizes it. Expanding at least
/// one ply guarantees the final shallow search has children to discriminate
/// between.
///
/// Children keep the game's natural successor order; nothing is sorted.
/// A decided root is an error.
pub fn plan<G: Game>(root: &G, num_workers: usize) -> Result<Vec<G>> {
    let mut jobs: VecDeque<G> = root.moves().collect();
    ensure!(!jobs.is_empty(), "the root position is already decided");

    while jobs.len() == 1 || jobs.len() < num_workers {
        let head = jobs.pop_front().expect("the job queue never runs dry mid-expansion");
        let mut children = head.moves().peekable();

        // A decided position can't fan out any further; keep it as a job
        // of its own and settle for the jobs we have.
        if children.peek().is_none() {
            jobs.push_front(head);
            break;
        }

        jobs.extend(children);
    }

    Ok(jobs.into())
}

#[cfg(test)]
mod tests {
    use games::connect_four::ConnectFour;
    use games::tic_tac_toe::TicTacToe;

    use super::*;

    #[test]
    fn one_worker_still_gets_an_expanded_root() {
        let jobs = plan(&ConnectFour::new(), 1).unwrap();
        assert!(jobs.len() > 1);
    }

    #[test]
    fn two_workers_split_the_first_ply() {
        // The Connect Four root has exactly seven children.
        let jobs = plan(&ConnectFour::new(), 2).unwrap();
        assert_eq!(jobs.len(), 7);
    }

    #[test]
    fn many_workers_force_deeper_expansion() {
        let jobs = plan(&ConnectFour::new(), 20).unwrap();
        assert!(jobs.len() >= 20);
    }

    #[test]
    fn expansion_pops_ancestors_before_their_children() {
        // With 20 workers some first-ply children get replaced by their own
        // children; no job may remain an ancestor of another, or its table
        // entry would mask the descendant's during the final root search.
        let jobs = plan(&ConnectFour::new(), 20).unwrap();

        for ancestor in &jobs {
            for descendant in ancestor.moves() {
                assert!(jobs.iter().all(|job| job.id() != descendant.id()));
            }
        }
    }

    #[test]
    fn a_decided_root_is_rejected() {
        let won = TicTacToe { x: 0o111, o: 0o022, x_to_move: false };
        assert!(plan(&won, 3).is_err());
    }

    #[test]
    fn near_terminal_roots_still_fan_out() {
        // One free square left: a single child, itself terminal. The
        // planner keeps it as the only job rather than spinning.
        let root = TicTacToe { x: 0o033, o: 0o344, x_to_move: true };
        let jobs = plan(&root, 3).unwrap();
        assert_eq!(jobs.len(), 1);
    }
}
