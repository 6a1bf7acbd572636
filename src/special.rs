//! Special tokens: creation from large matches, blast areas, chain detonation.
//!
//! Everything here reads an immutable board snapshot. The resolution loop
//! computes the full plan and blast set for a pass first and only then
//! mutates the grid.

use crate::components::Component;
use crate::matcher::MatchGroup;
use crate::types::{index, position, Board, Move, Special, CELL_COUNT, SIZE};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

/// Exact run length that earns a rocket.
pub const ROCKET_RUN: usize = 4;

/// Components strictly larger than this earn a bomb.
pub const BOMB_THRESHOLD: usize = 4;

/// Chebyshev radius of a bomb blast.
pub const BOMB_RADIUS: usize = 2;

/// A special token to be materialized at a surviving cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecialSpawn {
    pub index: usize,
    pub color: u8,
    pub kind: Special,
}

/// A special token that went off during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detonation {
    pub index: usize,
    pub kind: Special,
}

/// What one cascade pass will do, before any mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassPlan {
    /// Matched cells to remove (survivors excluded).
    pub removals: BTreeSet<usize>,
    /// New specials, at most one per cell.
    pub spawns: Vec<SpecialSpawn>,
}

impl PassPlan {
    /// Record a spawn. A cell already hosting a bomb is never downgraded to a
    /// rocket; a rocket is upgraded when a bomb lands on the same cell.
    fn upsert(&mut self, spawn: SpecialSpawn) {
        match self.spawns.iter_mut().find(|s| s.index == spawn.index) {
            None => self.spawns.push(spawn),
            Some(existing) => {
                if existing.kind != Special::Bomb && spawn.kind == Special::Bomb {
                    *existing = spawn;
                }
            }
        }
    }
}

/// Pick the cell that hosts a new special.
///
/// A swap endpoint inside `cells` wins (`from` before `to`); otherwise the
/// cell at `len / 2` in the group's own ordering.
pub fn choose_survivor(cells: &[usize], swap: Option<Move>) -> usize {
    if let Some(mv) = swap {
        if cells.contains(&mv.from) {
            return mv.from;
        }
        if cells.contains(&mv.to) {
            return mv.to;
        }
    }
    cells[cells.len() / 2]
}

/// Decide removals and special creation for one pass.
///
/// `swap` is the player's swap on the first pass of a turn and `None`
/// afterwards. While present it fixes rocket orientation to the swap axis.
pub fn plan_pass(
    board: &Board,
    groups: &[MatchGroup],
    components: &[Component],
    swap: Option<Move>,
) -> PassPlan {
    let mut plan = PassPlan::default();
    for group in groups {
        plan.removals.extend(group.cells.iter().copied());
    }

    for group in groups.iter().filter(|g| g.len() == ROCKET_RUN) {
        let pivot = choose_survivor(&group.cells, swap);
        let Some(color) = board.color(pivot) else {
            continue;
        };
        plan.removals.remove(&pivot);
        let axis = swap.map_or(group.axis, |mv| mv.axis());
        plan.upsert(SpecialSpawn {
            index: pivot,
            color,
            kind: Special::rocket(axis),
        });
    }

    for component in components.iter().filter(|c| c.len() > BOMB_THRESHOLD) {
        let pivot = choose_survivor(&component.cells, swap);
        plan.removals.remove(&pivot);
        plan.upsert(SpecialSpawn {
            index: pivot,
            color: component.color,
            kind: Special::Bomb,
        });
    }

    plan
}

/// Cells cleared by `kind` going off at `center`, center included.
pub fn blast_area(center: usize, kind: Special) -> BTreeSet<usize> {
    let (row, col) = position(center);
    let mut targets = BTreeSet::new();
    targets.insert(center);

    match kind {
        Special::RocketHorizontal => targets.extend((0..SIZE).map(|c| index(row, c))),
        Special::RocketVertical => targets.extend((0..SIZE).map(|r| index(r, col))),
        Special::Bomb => {
            let rows = row.saturating_sub(BOMB_RADIUS)..=(row + BOMB_RADIUS).min(SIZE - 1);
            let cols = col.saturating_sub(BOMB_RADIUS)..=(col + BOMB_RADIUS).min(SIZE - 1);
            for r in rows {
                targets.extend(cols.clone().map(|c| index(r, c)));
            }
        }
    }

    targets
}

/// Grow `blast` until every special inside it has gone off.
///
/// Worklist over special-holding cells; each detonates once, and any
/// special newly caught in its area joins the queue.
pub fn chain_detonations(board: &Board, blast: &mut BTreeSet<usize>) {
    let mut detonated = [false; CELL_COUNT];
    let mut queue: VecDeque<usize> = blast.iter().copied().filter(|&i| board.has_special(i)).collect();

    while let Some(idx) = queue.pop_front() {
        if detonated[idx] {
            continue;
        }
        detonated[idx] = true;

        let Some(kind) = board.special(idx) else {
            continue;
        };
        for cell in blast_area(idx, kind) {
            blast.insert(cell);
            if board.has_special(cell) && !detonated[cell] {
                queue.push_back(cell);
            }
        }
    }
}

/// Specials caught in `blast`, in index order.
pub fn detonations(board: &Board, blast: &BTreeSet<usize>) -> Vec<Detonation> {
    blast
        .iter()
        .filter_map(|&index| board.special(index).map(|kind| Detonation { index, kind }))
        .collect()
}
