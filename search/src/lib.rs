//! The search engine behind the Palantir cluster.
//!
//! The same alpha-beta routine runs in two places: on workers, wrapped in
//! the time-limited iterative-deepening driver, and on the coordinator,
//! where a shallow pass over the root consumes the sub-tree values the
//! workers sent back through the [`ValueTable`] override mechanism.

pub mod alpha_beta;
pub mod naive;
pub mod time_control;

pub use alpha_beta::alpha_beta;
pub use alpha_beta::alpha_beta_with_table;
pub use alpha_beta::minimax;
pub use alpha_beta::Outcome;
pub use alpha_beta::ValueTable;
pub use time_control::time_limited;
