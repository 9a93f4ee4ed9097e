//! Game state abstraction for the Palantir search cluster.
//!
//! Everything above this crate (the search engine, the coordinator, the
//! workers) is parameterized over the [`Game`] trait. A game only needs to
//! know how to value a position, enumerate its children, and move across the
//! wire; the distributed machinery never looks inside.

pub mod checkers;
pub mod connect_four;
pub mod tic_tac_toe;

use std::hash::Hash;

use anyhow::Result;

/// The type of heuristic values of game states.
pub type Value = i32;

/// The value of a position the maximizing player has won.
pub const MAX_WIN: Value = Value::MAX;

/// The value of a position the minimizing player has won.
///
/// One above `i32::MIN`, so that `MIN_WIN == -MAX_WIN` and negating a value
/// can never overflow.
pub const MIN_WIN: Value = Value::MIN + 1;

/// A position in a two-player, zero-sum, perfect-information game.
///
/// Ordinary heuristic values lie strictly between [`MIN_WIN`] and
/// [`MAX_WIN`]; the sentinels themselves are reserved for decided games.
pub trait Game: Clone + Send + 'static {
    /// A canonical identifier for the position.
    ///
    /// Two states that arise from different move sequences but describe the
    /// same position must compare equal, since sub-tree values computed by
    /// one worker are looked up by id when the root decision is rebuilt.
    type Id: Eq + Hash + Copy + Send;

    /// The iterator returned by [`Game::moves`].
    type Moves: Iterator<Item = Self>;

    /// The heuristic value of the position, from the maximizing player's
    /// point of view.
    fn value(&self) -> Value;

    /// Whether the player to move is the maximizing player.
    fn maximizing(&self) -> bool;

    /// All positions one move away, in the game's natural move order.
    ///
    /// Every call returns a fresh iterator that starts over from the first
    /// child. Decided or full positions yield an empty iterator.
    fn moves(&self) -> Self::Moves;

    /// Serialize the position for the wire.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Inverse of [`Game::encode`].
    fn decode(bytes: &[u8]) -> Result<Self>;

    /// The canonical identifier of this position.
    fn id(&self) -> Self::Id;
}
