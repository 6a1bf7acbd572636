//! Move oracle: deadlock detection and hints.
//!
//! Scans cells in index order and each cell's neighbours in the fixed
//! right/left/down/up order, so the first legal move found is stable for a
//! given board.

use crate::matcher;
use crate::types::{Board, Move, NeighborCache, CELL_COUNT};

/// True if swapping the two cells of `mv` creates at least one match.
pub fn swap_makes_match(board: &Board, mv: Move) -> bool {
    let mut probe = board.clone();
    probe.swap(mv.from, mv.to);
    matcher::has_match(&probe)
}

/// First legal move in scan order, or `None` when the board is deadlocked.
///
/// A pair is legal if either cell holds a special (always activatable) or
/// the swap produces a match.
pub fn find_legal_move(board: &Board, nc: &NeighborCache) -> Option<Move> {
    let mut probe = board.clone();

    for i in 0..CELL_COUNT {
        for &n in nc.get(i) {
            if board.has_special(i) || board.has_special(n) {
                return Some(Move::new(i, n));
            }

            probe.swap(i, n);
            let hit = matcher::has_match(&probe);
            probe.swap(i, n);
            if hit {
                return Some(Move::new(i, n));
            }
        }
    }

    None
}

pub fn has_legal_move(board: &Board, nc: &NeighborCache) -> bool {
    find_legal_move(board, nc).is_some()
}
