//! Component grouping: merge intersecting match groups into connected regions.
//!
//! A cross or an L made of two runs is one component. Component size decides
//! bomb eligibility, independently of the per-run rocket rule.

use crate::matcher::MatchGroup;
use crate::types::{Board, NeighborCache, CELL_COUNT};
use std::collections::VecDeque;

/// Cells connected through 4-directional adjacency, all matched this pass
/// and all of one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub color: u8,
    /// Cells in breadth-first discovery order from the first matched cell.
    pub cells: Vec<usize>,
}

impl Component {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Flood-fill the union of all matched cells into same-color components.
///
/// Seeds are visited in first-seen order across `groups`, so the output is
/// deterministic for a given board and group list.
pub fn group_matches(board: &Board, groups: &[MatchGroup], nc: &NeighborCache) -> Vec<Component> {
    let mut matched = [false; CELL_COUNT];
    let mut seeds = Vec::new();
    for group in groups {
        for &idx in &group.cells {
            if !matched[idx] {
                matched[idx] = true;
                seeds.push(idx);
            }
        }
    }

    let mut visited = [false; CELL_COUNT];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in seeds {
        if visited[start] {
            continue;
        }
        let Some(color) = board.color(start) else {
            continue;
        };

        visited[start] = true;
        queue.push_back(start);
        let mut cells = Vec::new();

        while let Some(idx) = queue.pop_front() {
            cells.push(idx);
            for &n in nc.get(idx) {
                if visited[n] || !matched[n] || board.color(n) != Some(color) {
                    continue;
                }
                visited[n] = true;
                queue.push_back(n);
            }
        }

        components.push(Component { color, cells });
    }

    components
}
