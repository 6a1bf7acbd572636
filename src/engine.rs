//! Resolution loop: the turn state machine.
//!
//! One `Engine` owns the board, the score and the random source. A turn
//! enters through a swap or a direct special activation and then advances
//! one pass at a time:
//!
//! ```text
//! Idle ─begin_swap──────► SwapPending ────────┐
//!   │                                          ▼
//!   └─begin_activation──► ActivationPending ─► Resolving(combo) ─► Idle
//! ```
//!
//! `step()` runs exactly one pass so a presentation layer can animate
//! between passes; `attempt_swap()` / `activate_special()` drive the whole
//! turn at once. Any new action while a turn is in flight is rejected with
//! [`EngineError::Busy`].

use crate::board;
use crate::components::group_matches;
use crate::config::EngineConfig;
use crate::error::{EngineError, InvalidMove};
use crate::matcher::find_matches;
use crate::oracle;
use crate::rng::{ColorSource, WasmRng};
use crate::special::{self, Detonation, SpecialSpawn};
use crate::types::{are_adjacent, Board, Move, NeighborCache, Token, CELL_COUNT};
use serde::Serialize;
use std::collections::BTreeSet;

/// How a turn was entered when it involves a special token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The player tapped a special in place.
    Tap(usize),
    /// The player swapped a special with a neighbour.
    Swap(Move),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A validated swap waiting for its first pass.
    SwapPending(Move),
    /// A special activation waiting for its detonation pass.
    ActivationPending(Activation),
    /// Cascading. `combo` counts match passes so far; `swap` is only set
    /// before the first one.
    Resolving { combo: u32, swap: Option<Move> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PassKind {
    /// Player-triggered special detonation; not a combo step.
    Detonation,
    /// Match pass number `combo` within the turn.
    Cascade { combo: u32 },
}

/// Everything that happened in one pass, for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub kind: PassKind,
    /// Removed cells, sorted.
    pub removed: Vec<usize>,
    /// Specials that went off.
    pub triggered: Vec<Detonation>,
    /// Specials created at surviving cells (positions before gravity).
    pub spawned: Vec<SpecialSpawn>,
    /// Cells filled with fresh tokens.
    pub refilled: Vec<usize>,
    pub points: u32,
    /// Board after gravity and refill.
    pub board: Board,
}

/// Summary of a completed turn.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub passes: Vec<PassReport>,
    pub specials_created: Vec<SpecialSpawn>,
    /// Includes the combo bonus.
    pub score_delta: u32,
    /// Number of match passes.
    pub combo: u32,
}

impl Resolution {
    pub fn removed_total(&self) -> usize {
        self.passes.iter().map(|p| p.removed.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MoveOutcome {
    Invalid { reason: InvalidMove },
    Resolved(Resolution),
    /// The turn resolved, then the board was deadlocked and regenerated.
    Reshuffled { resolution: Resolution, board: Board },
}

impl MoveOutcome {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid { .. })
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::Invalid { .. } => None,
            Self::Resolved(resolution) | Self::Reshuffled { resolution, .. } => Some(resolution),
        }
    }
}

/// Result of advancing a turn by one pass.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", content = "data", rename_all = "camelCase")]
pub enum Step {
    Pass(PassReport),
    Finished(MoveOutcome),
}

/// Read-only view between turns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub board: Board,
    pub score: u32,
    pub busy: bool,
}

pub struct Engine<R: ColorSource = WasmRng> {
    config: EngineConfig,
    rng: R,
    neighbors: NeighborCache,
    board: Board,
    score: u32,
    phase: Phase,
    turn: Resolution,
}

impl Engine<WasmRng> {
    /// Engine with a `WasmRng` seeded from `config.seed` (entropy if unset).
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let rng = WasmRng::from_optional_seed(config.seed);
        Self::new(config, rng)
    }
}

impl<R: ColorSource> Engine<R> {
    /// Validate `config` and start a fresh game.
    pub fn new(config: EngineConfig, rng: R) -> Result<Self, EngineError> {
        config.validate()?;
        let mut engine = Self {
            config,
            rng,
            neighbors: NeighborCache::new(),
            board: Board::empty(),
            score: 0,
            phase: Phase::Idle,
            turn: Resolution::default(),
        };
        engine.new_game();
        Ok(engine)
    }

    /// Start from a given board instead of a generated one.
    ///
    /// The board must be full and use only configured colors. It is not
    /// required to be stable.
    pub fn with_board(config: EngineConfig, board: Board, rng: R) -> Result<Self, EngineError> {
        config.validate()?;
        for (i, cell) in board.cells().iter().enumerate() {
            match cell {
                None => return Err(EngineError::InvalidBoard(format!("cell {i} is empty"))),
                Some(token) if token.color >= config.colors => {
                    return Err(EngineError::InvalidBoard(format!(
                        "cell {i} has color {} but only {} colors are configured",
                        token.color, config.colors
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            config,
            rng,
            neighbors: NeighborCache::new(),
            board,
            score: 0,
            phase: Phase::Idle,
            turn: Resolution::default(),
        })
    }

    /// Generate a new board and reset the score. Abandons any turn in flight.
    pub fn new_game(&mut self) -> &Board {
        self.board = self.generate_board();
        self.score = 0;
        self.phase = Phase::Idle;
        self.turn = Resolution::default();
        log::info!("new game started");
        &self.board
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            score: self.score,
            busy: self.is_busy(),
        }
    }

    /// A legal move for the current board, if any. Never mutates.
    ///
    /// `None` while a turn is in flight: the board may still hold matches.
    pub fn query_hint(&self) -> Option<Move> {
        if self.is_busy() {
            return None;
        }
        oracle::find_legal_move(&self.board, &self.neighbors)
    }

    /// Swap two cells and resolve the whole turn.
    ///
    /// Refused swaps come back as `MoveOutcome::Invalid` with the board
    /// untouched; only contract violations and re-entry are errors.
    pub fn attempt_swap(&mut self, from: usize, to: usize) -> Result<MoveOutcome, EngineError> {
        match self.begin_swap(from, to) {
            Ok(()) => self.run_to_completion(),
            Err(EngineError::InvalidMove(reason)) => Ok(MoveOutcome::Invalid { reason }),
            Err(err) => Err(err),
        }
    }

    /// Detonate the special at `index` and resolve the whole turn.
    pub fn activate_special(&mut self, index: usize) -> Result<MoveOutcome, EngineError> {
        match self.begin_activation(index) {
            Ok(()) => self.run_to_completion(),
            Err(EngineError::InvalidMove(reason)) => Ok(MoveOutcome::Invalid { reason }),
            Err(err) => Err(err),
        }
    }

    /// Validate a swap and enter `SwapPending` (or `ActivationPending` when a
    /// special is involved). The board is not touched until `step()`.
    pub fn begin_swap(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        check_index(from)?;
        check_index(to)?;
        self.ensure_idle()?;
        if !are_adjacent(from, to) {
            return Err(InvalidMove::NotAdjacent.into());
        }

        let mv = Move::new(from, to);
        if self.board.has_special(from) || self.board.has_special(to) {
            self.start_turn(Phase::ActivationPending(Activation::Swap(mv)));
            return Ok(());
        }
        if !oracle::swap_makes_match(&self.board, mv) {
            log::debug!("swap {from} <-> {to} makes no match");
            return Err(InvalidMove::NoMatch.into());
        }

        self.start_turn(Phase::SwapPending(mv));
        Ok(())
    }

    /// Validate a tap on a special and enter `ActivationPending`.
    pub fn begin_activation(&mut self, index: usize) -> Result<(), EngineError> {
        check_index(index)?;
        self.ensure_idle()?;
        if !self.board.has_special(index) {
            return Err(InvalidMove::NoSpecial.into());
        }
        self.start_turn(Phase::ActivationPending(Activation::Tap(index)));
        Ok(())
    }

    /// Advance the current turn by one pass.
    pub fn step(&mut self) -> Result<Step, EngineError> {
        match self.phase {
            Phase::Idle => Err(EngineError::NotResolving),
            Phase::SwapPending(mv) => {
                self.board.swap(mv.from, mv.to);
                Ok(self.cascade_step(0, Some(mv)))
            }
            Phase::ActivationPending(activation) => Ok(Step::Pass(self.detonation_step(activation))),
            Phase::Resolving { combo, swap } => Ok(self.cascade_step(combo, swap)),
        }
    }

    fn run_to_completion(&mut self) -> Result<MoveOutcome, EngineError> {
        loop {
            if let Step::Finished(outcome) = self.step()? {
                return Ok(outcome);
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        if self.is_busy() {
            return Err(EngineError::Busy);
        }
        Ok(())
    }

    fn start_turn(&mut self, phase: Phase) {
        self.turn = Resolution::default();
        self.phase = phase;
    }

    fn generate_board(&mut self) -> Board {
        let nc = &self.neighbors;
        let result = board::generate_stable_board(
            self.config.colors,
            self.config.max_generation_attempts,
            &mut self.rng,
            |b| oracle::has_legal_move(b, nc),
        );
        log::debug!("board generated after {} attempts", result.attempts);
        result.board
    }

    /// Blow up the activated special(s), then hand over to the cascade loop.
    fn detonation_step(&mut self, activation: Activation) -> PassReport {
        let origins = match activation {
            Activation::Tap(index) => vec![index],
            Activation::Swap(mv) => {
                self.board.swap(mv.from, mv.to);
                vec![mv.from, mv.to]
            }
        };

        let mut blast = BTreeSet::new();
        for index in origins {
            if let Some(kind) = self.board.special(index) {
                blast.extend(special::blast_area(index, kind));
            }
        }

        let report = self.commit_pass(PassKind::Detonation, blast, Vec::new());
        self.phase = Phase::Resolving { combo: 0, swap: None };
        report
    }

    /// One match pass, or the end of the turn if the board is stable.
    fn cascade_step(&mut self, combo: u32, swap: Option<Move>) -> Step {
        let groups = find_matches(&self.board);
        if groups.is_empty() {
            return Step::Finished(self.finish_turn(combo));
        }

        let combo = combo + 1;
        let components = group_matches(&self.board, &groups, &self.neighbors);
        let plan = special::plan_pass(&self.board, &groups, &components, swap);
        let report = self.commit_pass(PassKind::Cascade { combo }, plan.removals, plan.spawns);
        self.phase = Phase::Resolving { combo, swap: None };
        Step::Pass(report)
    }

    /// Chain the blast, then clear, place new specials, drop and refill.
    ///
    /// All decisions are read from the board as it stood when the pass
    /// began; mutation starts only once the removal set is final.
    fn commit_pass(
        &mut self,
        kind: PassKind,
        mut removed: BTreeSet<usize>,
        spawned: Vec<SpecialSpawn>,
    ) -> PassReport {
        special::chain_detonations(&self.board, &mut removed);
        let triggered = special::detonations(&self.board, &removed);

        for &index in &removed {
            self.board.clear(index);
        }
        for spawn in &spawned {
            self.board
                .set(spawn.index, Some(Token::with_special(spawn.color, spawn.kind)));
        }
        let refilled = board::apply_gravity(&mut self.board, self.config.colors, &mut self.rng);

        let points = self
            .config
            .points_per_cell
            .saturating_mul(removed.len() as u32);
        self.award(points);
        self.turn.specials_created.extend(spawned.iter().copied());

        log::debug!(
            "{kind:?}: removed {} cells, {} specials triggered, {} spawned",
            removed.len(),
            triggered.len(),
            spawned.len()
        );

        let report = PassReport {
            kind,
            removed: removed.into_iter().collect(),
            triggered,
            spawned,
            refilled,
            points,
            board: self.board.clone(),
        };
        self.turn.passes.push(report.clone());
        report
    }

    /// Score saturates at `u32::MAX` so it never decreases.
    fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.turn.score_delta = self.turn.score_delta.saturating_add(points);
    }

    /// Award the combo bonus, check for deadlock and return to `Idle`.
    fn finish_turn(&mut self, combo: u32) -> MoveOutcome {
        if combo > 1 {
            let bonus = self.config.combo_bonus.saturating_mul(combo);
            self.award(bonus);
        }
        let mut resolution = std::mem::take(&mut self.turn);
        resolution.combo = combo;
        self.phase = Phase::Idle;

        if oracle::has_legal_move(&self.board, &self.neighbors) {
            return MoveOutcome::Resolved(resolution);
        }

        log::info!("no legal move left, reshuffling");
        self.board = self.generate_board();
        MoveOutcome::Reshuffled {
            resolution,
            board: self.board.clone(),
        }
    }
}

fn check_index(index: usize) -> Result<(), EngineError> {
    if index >= CELL_COUNT {
        return Err(EngineError::OutOfRange { index });
    }
    Ok(())
}
