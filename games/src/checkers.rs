//! Bitboard checkers on the dark squares of an 8x8 board.
//!
//! Every piece board is masked by [`DARK_SQUARES`], bit `row * 8 + col` with
//! row 0 at the maximizer's home rank. Pawns and kings are tracked
//! separately per side. Captures are mandatory: whenever the side to move
//! has a jump available, only jumps are generated, and every jump is
//! extended into a maximal chain before it is emitted.

use std::fmt::Display;

use anyhow::bail;
use anyhow::ensure;
use anyhow::Result;
use colored::Colorize;

use crate::Game;
use crate::Value;
use crate::MAX_WIN;
use crate::MIN_WIN;

/// The playable squares.
pub const DARK_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

const PAWN_VALUE: Value = 2;
const KING_VALUE: Value = 5;

/// Diagonal directions as (row, col) deltas.
const FORWARD: [(i8, i8); 2] = [(1, 1), (1, -1)];
const BACKWARD: [(i8, i8); 2] = [(-1, 1), (-1, -1)];
const ALL_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A checkers position. The maximizer owns the low ranks and moves up the
/// board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checkers {
    pub max_pawns: u64,
    pub max_kings: u64,
    pub min_pawns: u64,
    pub min_kings: u64,
    pub max_to_move: bool,
}

/// Move `square` one diagonal step. `None` when it walks off the board.
fn shift(square: u8, (drow, dcol): (i8, i8)) -> Option<u8> {
    let row = square as i8 / 8 + drow;
    let col = square as i8 % 8 + dcol;

    if (0..8).contains(&row) && (0..8).contains(&col) {
        Some((row * 8 + col) as u8)
    } else {
        None
    }
}

impl Checkers {
    /// The standard starting position: three ranks of pawns each, the
    /// maximizer to move.
    pub fn new() -> Self {
        Self {
            max_pawns: 0x0000_0000_00FF_FFFF & DARK_SQUARES,
            max_kings: 0,
            min_pawns: 0xFFFF_FF00_0000_0000 & DARK_SQUARES,
            min_kings: 0,
            max_to_move: true,
        }
    }

    fn occupied(&self) -> u64 {
        self.max_pawns | self.max_kings | self.min_pawns | self.min_kings
    }

    fn mover_pieces(&self) -> u64 {
        if self.max_to_move {
            self.max_pawns | self.max_kings
        } else {
            self.min_pawns | self.min_kings
        }
    }

    fn mover_kings(&self) -> u64 {
        if self.max_to_move { self.max_kings } else { self.min_kings }
    }

    fn enemy_pieces(&self) -> u64 {
        if self.max_to_move {
            self.min_pawns | self.min_kings
        } else {
            self.max_pawns | self.max_kings
        }
    }

    fn directions(&self, king: bool) -> &'static [(i8, i8)] {
        if king {
            &ALL_DIRS
        } else if self.max_to_move {
            &FORWARD
        } else {
            &BACKWARD
        }
    }

    fn kinging_row(&self) -> u8 {
        if self.max_to_move { 7 } else { 0 }
    }

    /// The position after the mover's piece travels `start -> end`,
    /// capturing `captured`, promoting if a pawn ends on the far rank.
    fn apply(&self, start: u8, end: u8, captured: u64, king: bool) -> Self {
        let mut next = *self;

        let promoted = !king && end / 8 == self.kinging_row();
        let (pawns, kings) = if self.max_to_move {
            (&mut next.max_pawns, &mut next.max_kings)
        } else {
            (&mut next.min_pawns, &mut next.min_kings)
        };

        if king || promoted {
            *pawns &= !(1 << start);
            *kings = (*kings & !(1 << start)) | 1 << end;
        } else {
            *pawns = (*pawns & !(1 << start)) | 1 << end;
        }

        if self.max_to_move {
            next.min_pawns &= !captured;
            next.min_kings &= !captured;
        } else {
            next.max_pawns &= !captured;
            next.max_kings &= !captured;
        }

        next.max_to_move = !self.max_to_move;
        next
    }

    /// Extend a jump in progress into every maximal chain, emitting the
    /// resulting positions. Already-captured pieces can't be jumped twice.
    fn jump_chains(&self, start: u8, current: u8, captured: u64, king: bool, out: &mut Vec<Self>) {
        let mut extended = false;

        for &dir in self.directions(king) {
            let Some(over) = shift(current, dir) else { continue };
            let Some(landing) = shift(over, dir) else { continue };

            if self.enemy_pieces() & !captured & (1 << over) != 0
                && self.occupied() & (1 << landing) == 0
            {
                extended = true;
                self.jump_chains(start, landing, captured | 1 << over, king, out);
            }
        }

        if !extended && captured != 0 {
            out.push(self.apply(start, current, captured, king));
        }
    }

    fn successors(&self) -> Vec<Self> {
        if self.mover_pieces() == 0 || self.enemy_pieces() == 0 {
            return Vec::new();
        }

        let mut jumps = Vec::new();
        let mut pieces = self.mover_pieces();
        while pieces != 0 {
            let square = pieces.trailing_zeros() as u8;
            pieces &= pieces - 1;

            let king = self.mover_kings() & (1 << square) != 0;
            self.jump_chains(square, square, 0, king, &mut jumps);
        }

        if !jumps.is_empty() {
            return jumps;
        }

        let mut steps = Vec::new();
        let mut pieces = self.mover_pieces();
        while pieces != 0 {
            let square = pieces.trailing_zeros() as u8;
            pieces &= pieces - 1;

            let king = self.mover_kings() & (1 << square) != 0;
            for &dir in self.directions(king) {
                if let Some(to) = shift(square, dir) {
                    if self.occupied() & (1 << to) == 0 {
                        steps.push(self.apply(square, to, 0, king));
                    }
                }
            }
        }

        steps
    }
}

impl Default for Checkers {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Checkers {
    type Id = (u64, u64, u64, u64, bool);
    type Moves = std::vec::IntoIter<Checkers>;

    /// Plain material count, pawns worth 2 and kings 5, from the
    /// maximizer's perspective. A side with nothing left has lost.
    fn value(&self) -> Value {
        let max_pieces = self.max_pawns | self.max_kings;
        let min_pieces = self.min_pawns | self.min_kings;

        if max_pieces == 0 {
            return MIN_WIN;
        }
        if min_pieces == 0 {
            return MAX_WIN;
        }

        PAWN_VALUE * self.max_pawns.count_ones() as Value
            + KING_VALUE * self.max_kings.count_ones() as Value
            - PAWN_VALUE * self.min_pawns.count_ones() as Value
            - KING_VALUE * self.min_kings.count_ones() as Value
    }

    fn maximizing(&self) -> bool {
        self.max_to_move
    }

    fn moves(&self) -> Self::Moves {
        self.successors().into_iter()
    }

    /// 33 bytes: side-to-move flag, then the four bitboards big-endian in
    /// the order max pawns, max kings, min pawns, min kings.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(33);
        bytes.push(u8::from(self.max_to_move));
        for board in [self.max_pawns, self.max_kings, self.min_pawns, self.min_kings] {
            bytes.extend_from_slice(&board.to_be_bytes());
        }
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 33 {
            bail!("checkers state must be 33 bytes, got {}", bytes.len());
        }

        let max_to_move = match bytes[0] {
            0 => false,
            1 => true,
            flag => bail!("invalid side-to-move flag {flag}"),
        };

        let mut boards = [0u64; 4];
        for (i, board) in boards.iter_mut().enumerate() {
            *board = u64::from_be_bytes(bytes[1 + 8 * i..9 + 8 * i].try_into().unwrap());
        }
        let [max_pawns, max_kings, min_pawns, min_kings] = boards;

        ensure!(
            (max_pawns | max_kings | min_pawns | min_kings) & !DARK_SQUARES == 0,
            "pieces outside the dark squares"
        );
        ensure!(
            (max_pawns | max_kings) & (min_pawns | min_kings) == 0,
            "overlapping occupancy"
        );

        Ok(Self { max_pawns, max_kings, min_pawns, min_kings, max_to_move })
    }

    fn id(&self) -> Self::Id {
        (self.max_pawns, self.max_kings, self.min_pawns, self.min_kings, self.max_to_move)
    }
}

impl Display for Checkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in (0..8).rev() {
            for col in 0..8 {
                let bit = 1u64 << (row * 8 + col);

                if self.max_pawns & bit != 0 {
                    write!(f, " {}", "x".bright_blue())?;
                } else if self.max_kings & bit != 0 {
                    write!(f, " {}", "X".bright_blue())?;
                } else if self.min_pawns & bit != 0 {
                    write!(f, " {}", "o".bright_red())?;
                } else if self.min_kings & bit != 0 {
                    write!(f, " {}", "O".bright_red())?;
                } else {
                    write!(f, " {}", ".".bright_black())?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A position with only the listed pieces on the board.
    fn sparse(
        max_pawns: &[u8],
        max_kings: &[u8],
        min_pawns: &[u8],
        min_kings: &[u8],
        max_to_move: bool,
    ) -> Checkers {
        let board = |squares: &[u8]| squares.iter().fold(0u64, |b, &sq| b | 1 << sq);
        let state = Checkers {
            max_pawns: board(max_pawns),
            max_kings: board(max_kings),
            min_pawns: board(min_pawns),
            min_kings: board(min_kings),
            max_to_move,
        };
        assert_eq!(state.occupied() & !DARK_SQUARES, 0, "test squares must be dark");
        state
    }

    #[test]
    fn starting_position_is_balanced() {
        let start = Checkers::new();
        assert_eq!(start.max_pawns.count_ones(), 12);
        assert_eq!(start.min_pawns.count_ones(), 12);
        assert_eq!(start.value(), 0);
    }

    #[test]
    fn starting_position_has_seven_moves() {
        // Four pawns on the third rank, the three inner ones with two step
        // targets each and the edge pawn with one... on each side of the
        // board the count works out to seven.
        assert_eq!(Checkers::new().moves().count(), 7);
    }

    #[test]
    fn material_count() {
        // squares: 1 (row 0), 10 (row 1), 60 (row 7), 39 (row 4)
        let state = sparse(&[1, 10], &[39], &[60], &[], true);
        assert_eq!(state.value(), 2 * PAWN_VALUE + KING_VALUE - PAWN_VALUE);
    }

    #[test]
    fn wiped_out_side_has_lost() {
        assert_eq!(sparse(&[1], &[], &[], &[], true).value(), MAX_WIN);
        assert_eq!(sparse(&[], &[], &[60], &[], false).value(), MIN_WIN);
        assert_eq!(sparse(&[1], &[], &[], &[], true).moves().count(), 0);
    }

    #[test]
    fn jumps_take_priority_over_steps() {
        // Maximizer pawn on 17 (row 2, col 1), enemy pawn on 26 (row 3,
        // col 2), landing square 35 free. The pawn on 3 could step, but the
        // jump is mandatory.
        let state = sparse(&[17, 3], &[], &[26], &[], true);
        let children: Vec<_> = state.moves().collect();

        assert_eq!(children.len(), 1);
        let jumped = &children[0];
        assert_eq!(jumped.min_pawns, 0);
        assert_eq!(jumped.max_pawns, (1 << 35) | (1 << 3));
    }

    #[test]
    fn jump_chains_run_to_the_end() {
        // Two enemy pawns lined up on the same diagonal: 26 (row 3, col 2)
        // and 44 (row 5, col 4). The chain 17 -> 35 -> 53 must come out as
        // a single move capturing both.
        let state = sparse(&[17], &[], &[26, 44], &[], true);
        let children: Vec<_> = state.moves().collect();

        assert_eq!(children.len(), 1);
        let jumped = &children[0];
        assert_eq!(jumped.min_pawns, 0);
        assert_eq!(jumped.max_pawns, 0);
        // landed on row 6... one more row and it would have promoted; the
        // chain stops at 53 because no third capture exists
        assert_eq!(jumped.max_kings, 0);
        assert_eq!(jumped.max_pawns | jumped.max_kings, 1 << 53);
    }

    #[test]
    fn pawn_promotes_on_the_far_rank() {
        // Pawn on 51 (row 6, col 3) steps to row 7.
        let state = sparse(&[51], &[], &[7], &[], true);
        let children: Vec<_> = state.moves().collect();

        assert!(!children.is_empty());
        for child in &children {
            assert_eq!(child.max_pawns, 0);
            assert_eq!(child.max_kings.count_ones(), 1);
            assert_eq!(child.max_kings.trailing_zeros() / 8, 7);
        }
    }

    #[test]
    fn kings_move_backwards() {
        let king = sparse(&[], &[35], &[7], &[], true);
        let pawn = sparse(&[35], &[], &[7], &[], true);

        assert_eq!(king.moves().count(), 4);
        assert_eq!(pawn.moves().count(), 2);
    }

    #[test]
    fn encode_round_trips() {
        for state in [Checkers::new(), sparse(&[17, 3], &[39], &[26], &[60], false)] {
            assert_eq!(Checkers::decode(&state.encode().unwrap()).unwrap(), state);
        }
    }

    #[test]
    fn decode_rejects_light_squares() {
        let mut bytes = Checkers::new().encode().unwrap();
        bytes[8] |= 0x01; // square 0 is a light square
        assert!(Checkers::decode(&bytes).is_err());
    }
}
