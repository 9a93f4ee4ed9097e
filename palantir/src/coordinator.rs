//! The shared state both RPC surfaces operate on.
//!
//! Everything lives behind a single [`Coordinator`] value handed by `Arc`
//! to every connection thread: the one-request-at-a-time flag, the registry
//! of workers parked inside `GetWork`, and the inbox of whichever
//! aggregation run is currently live. There are no process-wide globals.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use colored::Colorize;
use crossbeam::channel::bounded;
use crossbeam::channel::Receiver;
use crossbeam::channel::Sender;
use games::Game;

use crate::aggregator::JobResult;
use crate::dispatcher::WorkBatch;
use crate::dispatcher::WorkSlot;

/// Upper bound on workers parked at once; registration fails beyond it.
pub const MAX_WORKERS: usize = 64;

pub struct Coordinator<G: Game> {
    /// Whether a user request is in flight. At most one is ever in the
    /// busy phase; a second concurrent user is refused.
    busy: AtomicBool,

    /// Rendezvous slots pushed by workers blocked inside `GetWork`,
    /// consumed by the dispatcher.
    registry_tx: Sender<WorkSlot<G>>,
    registry_rx: Receiver<WorkSlot<G>>,

    /// The live aggregation run's inbox, replaced on every user request.
    results: Mutex<Option<Sender<JobResult<G>>>>,
}

impl<G: Game> Coordinator<G> {
    pub fn new() -> Self {
        let (registry_tx, registry_rx) = bounded(MAX_WORKERS);

        Self {
            busy: AtomicBool::new(false),
            registry_tx,
            registry_rx,
            results: Mutex::new(None),
        }
    }

    /// Atomically claim the coordinator for one user request. `false` when
    /// another request is already in flight.
    pub fn try_begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the coordinator for the next user request.
    pub fn finish(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Park the calling worker: register a fresh single-use slot and return
    /// the end the dispatcher will deliver exactly one batch on.
    pub fn park_worker(&self) -> anyhow::Result<Receiver<WorkBatch<G>>> {
        let (slot, batch) = bounded(1);

        self.registry_tx
            .try_send(slot)
            .map_err(|_| anyhow::anyhow!("the worker registry is full"))?;

        Ok(batch)
    }

    /// Drain every worker currently parked. Workers that register after the
    /// drain stay queued for the next request.
    pub fn waiting_workers(&self) -> Vec<WorkSlot<G>> {
        let mut slots = Vec::new();
        while let Ok(slot) = self.registry_rx.try_recv() {
            slots.push(slot);
        }
        slots
    }

    /// Return a drained slot to the registry unused.
    pub fn repark(&self, slot: WorkSlot<G>) {
        let _ = self.registry_tx.try_send(slot);
    }

    /// Point result submission at a new aggregation run.
    pub fn install_aggregator(&self, inbox: Sender<JobResult<G>>) {
        *self.results.lock().unwrap() = Some(inbox);
    }

    /// Forward worker results to the live aggregation run. Results with no
    /// run to receive them are dropped; they belong to a request that has
    /// already been answered.
    pub fn submit_results(&self, results: Vec<JobResult<G>>) {
        let inbox = self.results.lock().unwrap();

        for result in results {
            let delivered = inbox.as_ref().map(|tx| tx.try_send(result));

            if !matches!(delivered, Some(Ok(()))) {
                eprintln!("[{}]: dropping a stray worker result", "Warn".yellow());
            }
        }
    }
}

impl<G: Game> Default for Coordinator<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use games::tic_tac_toe::TicTacToe;

    use super::*;

    #[test]
    fn only_one_request_at_a_time() {
        let coordinator = Coordinator::<TicTacToe>::new();

        assert!(coordinator.try_begin());
        assert!(!coordinator.try_begin());

        coordinator.finish();
        assert!(coordinator.try_begin());
    }

    #[test]
    fn parked_workers_are_drained_in_registration_order() {
        let coordinator = Coordinator::<TicTacToe>::new();

        let first = coordinator.park_worker().unwrap();
        let _second = coordinator.park_worker().unwrap();

        let slots = coordinator.waiting_workers();
        assert_eq!(slots.len(), 2);
        assert!(coordinator.waiting_workers().is_empty());

        // The first slot delivers to the first parked worker.
        slots[0]
            .send(WorkBatch { states: vec![TicTacToe::new()], budget_ms: 10 })
            .unwrap();
        assert_eq!(first.recv().unwrap().states.len(), 1);
    }

    #[test]
    fn stray_results_are_dropped() {
        let coordinator = Coordinator::<TicTacToe>::new();

        // No aggregation run installed; this must not block or panic.
        coordinator.submit_results(vec![JobResult {
            state: TicTacToe::new(),
            value: 0,
            nodes: 1,
        }]);
    }
}
