//! Minimax without pruning.
//!
//! Kept as the reference implementation the pruned search is tested
//! against: over the same state and depth the two must agree on the value.

use games::Game;
use games::Value;

/// The minimax value of `state` searched to `max_depth` plies.
pub fn minimax<G: Game>(state: &G, max_depth: u32) -> Value {
    let mut moves = state.moves().peekable();

    if max_depth == 0 || moves.peek().is_none() {
        return state.value();
    }

    let values = moves.map(|child| minimax(&child, max_depth - 1));

    if state.maximizing() {
        values.max().unwrap()
    } else {
        values.min().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use games::tic_tac_toe::TicTacToe;
    use games::MAX_WIN;
    use games::MIN_WIN;

    use super::*;

    #[test]
    fn sees_the_win_one_ply_out() {
        // X completes the middle row next move.
        let state = TicTacToe { x: 0o050, o: 0o600, x_to_move: true };
        assert_eq!(minimax(&state, 2), MAX_WIN);
    }

    #[test]
    fn the_minimizer_takes_its_own_win() {
        // O holds two of the bottom row and moves first.
        let state = TicTacToe { x: 0o050, o: 0o600, x_to_move: false };
        assert_eq!(minimax(&state, 3), MIN_WIN);
    }

    #[test]
    fn terminal_state_is_its_own_value() {
        let won = TicTacToe { x: 0o111, o: 0o022, x_to_move: false };
        assert_eq!(minimax(&won, 5), MAX_WIN);

        let lost = TicTacToe { x: 0o106, o: 0o631, x_to_move: true };
        assert_eq!(minimax(&lost, 5), MIN_WIN);
    }
}
