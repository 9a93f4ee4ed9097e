//! Bitboard Connect Four.
//!
//! Each player's pieces live in a 42-bit occupancy over the 6x7 grid, with
//! bit `row * 7 + col` and row 0 at the bottom, so dropping a piece means
//! setting the lowest free bit of a column. All win conditions are covered
//! by 69 four-square window masks computed at compile time.

use std::fmt::Display;

use anyhow::bail;
use anyhow::ensure;
use anyhow::Result;
use colored::Colorize;

use crate::Game;
use crate::Value;
use crate::MAX_WIN;
use crate::MIN_WIN;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

const BOARD_MASK: u64 = (1 << (ROWS * COLS)) - 1;

/// Weight of a window holding 0..=3 of one side's pieces (and none of the
/// other's). A window with all four is a win and never scored.
const WINDOW_WEIGHTS: [Value; 4] = [0, 1, 4, 16];

/// Every horizontal, vertical and diagonal run of four squares.
const WINDOWS: [u64; 69] = windows();

const fn windows() -> [u64; 69] {
    let mut masks = [0u64; 69];
    let mut n = 0;

    let mut row = 0;
    while row < ROWS {
        let mut col = 0;
        while col < COLS {
            let bit = row * 7 + col;

            if col + 3 < COLS {
                masks[n] = 0b1111 << bit;
                n += 1;
            }
            if row + 3 < ROWS {
                masks[n] = 0x0020_4081 << bit; // four bits, 7 apart
                n += 1;
            }
            if col + 3 < COLS && row + 3 < ROWS {
                masks[n] = 0x0101_0101 << bit; // four bits, 8 apart
                n += 1;
            }
            if col >= 3 && row + 3 < ROWS {
                masks[n] = 0x0004_1041 << bit; // four bits, 6 apart
                n += 1;
            }

            col += 1;
        }
        row += 1;
    }

    masks
}

/// A Connect Four position. The first player (maximizing) moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectFour {
    pub max_board: u64,
    pub min_board: u64,
    pub max_to_move: bool,
}

impl ConnectFour {
    /// The empty board, maximizer to move.
    pub fn new() -> Self {
        Self { max_board: 0, min_board: 0, max_to_move: true }
    }

    /// Drop a piece for the side to move into `col`. `None` if the column
    /// is full.
    pub fn drop(&self, col: usize) -> Option<Self> {
        debug_assert!(col < COLS);
        let occupied = self.max_board | self.min_board;

        for row in 0..ROWS {
            let bit = 1 << (row * COLS + col);
            if occupied & bit == 0 {
                return Some(if self.max_to_move {
                    Self { max_board: self.max_board | bit, ..*self }.flipped()
                } else {
                    Self { min_board: self.min_board | bit, ..*self }.flipped()
                });
            }
        }

        None
    }

    fn flipped(&self) -> Self {
        Self { max_to_move: !self.max_to_move, ..*self }
    }

    fn full(&self) -> bool {
        self.max_board | self.min_board == BOARD_MASK
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for ConnectFour {
    type Id = (u64, u64, bool);
    type Moves = Moves;

    /// Scan the window masks once. A completed window decides the game;
    /// otherwise every window still open to exactly one side contributes a
    /// weight that grows with how far along that window is. Central squares
    /// sit in more windows than edge squares and score accordingly.
    fn value(&self) -> Value {
        let mut total = 0;

        for window in WINDOWS {
            let max_count = (self.max_board & window).count_ones() as usize;
            let min_count = (self.min_board & window).count_ones() as usize;

            if max_count == 4 {
                return MAX_WIN;
            }
            if min_count == 4 {
                return MIN_WIN;
            }

            if min_count == 0 {
                total += WINDOW_WEIGHTS[max_count];
            } else if max_count == 0 {
                total -= WINDOW_WEIGHTS[min_count];
            }
        }

        total
    }

    fn maximizing(&self) -> bool {
        self.max_to_move
    }

    fn moves(&self) -> Moves {
        let decided = self.full() || matches!(self.value(), MAX_WIN | MIN_WIN);
        Moves { state: *self, col: if decided { COLS } else { 0 } }
    }

    /// 17 bytes: side-to-move flag, then both bitboards big-endian,
    /// maximizer first.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(17);
        bytes.push(u8::from(self.max_to_move));
        bytes.extend_from_slice(&self.max_board.to_be_bytes());
        bytes.extend_from_slice(&self.min_board.to_be_bytes());
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 17 {
            bail!("connect four state must be 17 bytes, got {}", bytes.len());
        }

        let max_to_move = match bytes[0] {
            0 => false,
            1 => true,
            flag => bail!("invalid side-to-move flag {flag}"),
        };
        let max_board = u64::from_be_bytes(bytes[1..9].try_into().unwrap());
        let min_board = u64::from_be_bytes(bytes[9..17].try_into().unwrap());

        ensure!(
            (max_board | min_board) & !BOARD_MASK == 0,
            "occupancy outside the 42 board squares"
        );
        ensure!(max_board & min_board == 0, "overlapping occupancy");

        Ok(Self { max_board, min_board, max_to_move })
    }

    fn id(&self) -> (u64, u64, bool) {
        (self.max_board, self.min_board, self.max_to_move)
    }
}

/// One child per non-full column, left to right.
pub struct Moves {
    state: ConnectFour,
    col: usize,
}

impl Iterator for Moves {
    type Item = ConnectFour;

    fn next(&mut self) -> Option<ConnectFour> {
        while self.col < COLS {
            let col = self.col;
            self.col += 1;

            if let Some(child) = self.state.drop(col) {
                return Some(child);
            }
        }

        None
    }
}

impl Display for ConnectFour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", " 0 1 2 3 4 5 6".bright_blue())?;

        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let bit = 1 << (row * COLS + col);

                if self.max_board & bit != 0 {
                    write!(f, " {}", "X".bright_blue())?;
                } else if self.min_board & bit != 0 {
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
