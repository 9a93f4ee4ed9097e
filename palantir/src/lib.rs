//! The coordinator node of the Palantir cluster.
//!
//! A single coordinator fields two kinds of TCP connections: workers, which
//! poll for sub-trees to search, and users, which submit a position and
//! block for the best move. One user request flows through four stages:
//!
//! 1. The [`planner`] expands the root into at least one job per waiting
//!    worker, and never fewer than two.
//! 2. The [`dispatcher`] hands the jobs round-robin to the workers parked
//!    in the registry.
//! 3. The [`aggregator`] collects one value per job into a canonical-id
//!    keyed table.
//! 4. A shallow alpha-beta over the root, with the table spliced in as a
//!    leaf oracle, reconstructs which child realizes the best value.

pub mod aggregator;
pub mod coordinator;
pub mod dispatcher;
pub mod planner;
pub mod service;
