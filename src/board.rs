//! Board generation, gravity and refill.
//!
//! `generate_stable_board()` runs the whole sample-and-check loop in one call:
//! draw every cell at random until the grid has no match and at least one
//! legal move. The playability check is injected so this module stays
//! independent of the move oracle.

use crate::matcher;
use crate::rng::ColorSource;
use crate::types::{index, Board, Token, SIZE};

/// Fill every cell with a plain token of uniformly random color.
pub fn random_board<R: ColorSource>(colors: u8, rng: &mut R) -> Board {
    let mut board = Board::empty();
    for row in 0..SIZE {
        for col in 0..SIZE {
            board.set(index(row, col), Some(Token::plain(rng.next_color(colors))));
        }
    }
    board
}

/// Deterministic stable layout with a legal move, using colors 0..3.
///
/// Pairs of equal colors along each row, shifted by one color per row:
/// no run reaches three, and a vertical swap at the top-left completes one.
pub fn fallback_board() -> Board {
    let mut board = Board::empty();
    for row in 0..SIZE {
        for col in 0..SIZE {
            let color = ((col / 2 + row) % 3) as u8;
            board.set(index(row, col), Some(Token::plain(color)));
        }
    }
    board
}

/// Result of a board generation run.
pub struct BoardResult {
    pub board: Board,
    /// How many random layouts were tried.
    pub attempts: u32,
    /// False if the retry ceiling was hit and `board` is the fallback layout.
    pub success: bool,
}

/// Generate a stable, playable board.
///
/// Keeps sampling until the board has no match and `is_playable` accepts it.
/// After `max_attempts` tries the fixed [`fallback_board`] is returned
/// instead, so generation always terminates.
pub fn generate_stable_board<R, F>(
    colors: u8,
    max_attempts: u32,
    rng: &mut R,
    is_playable: F,
) -> BoardResult
where
    R: ColorSource,
    F: Fn(&Board) -> bool,
{
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let board = random_board(colors, rng);
        if !matcher::has_match(&board) && is_playable(&board) {
            return BoardResult {
                board,
                attempts,
                success: true,
            };
        }

        if attempts >= max_attempts {
            log::warn!("no stable board after {attempts} attempts, using fallback layout");
            return BoardResult {
                board: fallback_board(),
                attempts,
                success: false,
            };
        }
    }
}

/// Drop tokens down each column and refill the gaps from the top.
///
/// Within a column surviving tokens keep their relative order. Vacated cells
/// get fresh plain tokens, columns left to right and each column from its
/// lowest gap upward. Returns the refilled indices in that order.
pub fn apply_gravity<R: ColorSource>(board: &mut Board, colors: u8, rng: &mut R) -> Vec<usize> {
    let mut refilled = Vec::new();

    for col in 0..SIZE {
        let mut write = SIZE;
        for row in (0..SIZE).rev() {
            let idx = index(row, col);
            if let Some(token) = board.get(idx) {
                write -= 1;
                if write != row {
                    board.set(index(write, col), Some(token));
                    board.clear(idx);
                }
            }
        }

        for row in (0..write).rev() {
            let idx = index(row, col);
            board.set(idx, Some(Token::plain(rng.next_color(colors))));
            refilled.push(idx);
        }
    }

    refilled
}
