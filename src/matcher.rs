//! Match detection: runs of three or more same-colored tokens.

use crate::types::{index, Axis, Board, SIZE};
use serde::Serialize;

/// Shortest run that counts as a match.
pub const MIN_RUN: usize = 3;

/// A maximal straight run of at least [`MIN_RUN`] same-colored cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchGroup {
    /// Cell indices in scan order (left to right, or top to bottom).
    pub cells: Vec<usize>,
    pub axis: Axis,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Find every match group: all rows first, then all columns.
pub fn find_matches(board: &Board) -> Vec<MatchGroup> {
    let mut groups = Vec::new();
    scan_lines(board, Axis::Horizontal, &mut groups);
    scan_lines(board, Axis::Vertical, &mut groups);
    groups
}

/// Cheaper yes/no variant of [`find_matches`].
pub fn has_match(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

#[inline(always)]
fn line_cell(axis: Axis, line: usize, step: usize) -> usize {
    match axis {
        Axis::Horizontal => index(line, step),
        Axis::Vertical => index(step, line),
    }
}

fn scan_lines(board: &Board, axis: Axis, groups: &mut Vec<MatchGroup>) {
    let mut run: Vec<usize> = Vec::with_capacity(SIZE);

    for line in 0..SIZE {
        let mut run_color: Option<u8> = None;
        for step in 0..SIZE {
            let idx = line_cell(axis, line, step);
            match board.color(idx) {
                // Empty cells break a run.
                None => {
                    flush_run(&mut run, axis, groups);
                    run_color = None;
                }
                Some(color) if run_color == Some(color) => run.push(idx),
                Some(color) => {
                    flush_run(&mut run, axis, groups);
                    run.push(idx);
                    run_color = Some(color);
                }
            }
        }
        flush_run(&mut run, axis, groups);
    }
}

fn flush_run(run: &mut Vec<usize>, axis: Axis, groups: &mut Vec<MatchGroup>) {
    if run.len() >= MIN_RUN {
        groups.push(MatchGroup {
            cells: run.clone(),
            axis,
        });
    }
    run.clear();
}
