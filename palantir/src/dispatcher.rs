//! Matching planned jobs to parked workers.

use crossbeam::channel::Sender;
use games::Game;

/// An ordered list of job states plus the user's time budget, handed to one
/// worker. Never empty.
#[derive(Debug, Clone)]
pub struct WorkBatch<G> {
    pub states: Vec<G>,
    pub budget_ms: u64,
}

/// The sending end of a worker's single-use rendezvous slot.
pub type WorkSlot<G> = Sender<WorkBatch<G>>;

/// Deal the jobs round-robin across the waiting workers and fire each
/// batch into its slot.
///
/// With 5 jobs and 3 workers: worker 0 gets jobs 0 and 3, worker 1 gets
/// 1 and 4, worker 2 gets job 2. The planner guarantees at least one job
/// per worker; a worker that died while parked just loses its share.
pub fn dispatch<G: Game>(jobs: &[G], slots: &[WorkSlot<G>], budget_ms: u64) {
    assert!(
        slots.len() <= jobs.len(),
        "dispatching to more workers ({}) than jobs ({})",
        slots.len(),
        jobs.len(),
    );

    for (i, slot) in slots.iter().enumerate() {
        let states = jobs.iter().skip(i).step_by(slots.len()).cloned().collect();

        let _ = slot.send(WorkBatch { states, budget_ms });
    }
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::bounded;
    use games::tic_tac_toe::TicTacToe;
    use games::Game;

    use super::*;

    /// Distinct single-piece positions to dispatch around.
    fn jobs(count: usize) -> Vec<TicTacToe> {
        (0..count)
            .map(|square| TicTacToe::new().play_square(square).unwrap())
            .collect()
    }

    #[test]
    fn round_robin_partition() {
        let jobs = jobs(5);
        let (slots, receivers): (Vec<_>, Vec<_>) = (0..3).map(|_| bounded(1)).unzip();

        dispatch(&jobs, &slots, 250);

        let batches: Vec<WorkBatch<TicTacToe>> =
            receivers.iter().map(|rx| rx.recv().unwrap()).collect();

        assert_eq!(batches[0].states, vec![jobs[0], jobs[3]]);
        assert_eq!(batches[1].states, vec![jobs[1], jobs[4]]);
        assert_eq!(batches[2].states, vec![jobs[2]]);
    }

    #[test]
    fn every_batch_is_non_empty_and_complete() {
        let jobs = jobs(7);
        let (slots, receivers): (Vec<_>, Vec<_>) = (0..7).map(|_| bounded(1)).unzip();

        dispatch(&jobs, &slots, 100);

        let mut seen = Vec::new();
        for rx in &receivers {
            let batch = rx.recv().unwrap();
            assert!(!batch.states.is_empty());
            assert_eq!(batch.budget_ms, 100);
            seen.extend(batch.states);
        }

        // Together the batches cover every job exactly once.
        assert_eq!(seen.len(), jobs.len());
        for job in &jobs {
            assert_eq!(seen.iter().filter(|s| s.id() == job.id()).count(), 1);
        }
    }

    #[test]
    fn a_dead_worker_loses_its_share_quietly() {
        let jobs = jobs(2);
        let (alive, alive_rx) = bounded(1);
        let (dead, dead_rx) = bounded::<WorkBatch<TicTacToe>>(1);
        drop(dead_rx);

        dispatch(&jobs, &[alive, dead], 100);

        assert_eq!(alive_rx.recv().unwrap().states, vec![jobs[0]]);
    }
}
