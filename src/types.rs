//! Core data types for the match-3 engine.
//!
//! The board is a fixed `SIZE × SIZE` grid stored as a flat `Vec` in
//! row-major layout: `cells[row * SIZE + col]`. Geometry helpers convert
//! between flat indices and `(row, col)` pairs and reject anything outside
//! the grid.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the square grid.
pub const SIZE: usize = 7;

/// Number of cells on the board.
pub const CELL_COUNT: usize = SIZE * SIZE;

/// Flat index of `(row, col)`.
///
/// Panics if the position lies outside the grid.
#[inline(always)]
pub fn index(row: usize, col: usize) -> usize {
    assert!(
        row < SIZE && col < SIZE,
        "position ({row}, {col}) is outside the {SIZE}x{SIZE} grid"
    );
    row * SIZE + col
}

/// `(row, col)` of a flat index.
///
/// Panics if the index lies outside the grid.
#[inline(always)]
pub fn position(index: usize) -> (usize, usize) {
    assert!(index < CELL_COUNT, "cell index {index} is outside the grid");
    (index / SIZE, index % SIZE)
}

/// True iff the two cells are orthogonal neighbours (Manhattan distance 1).
pub fn are_adjacent(a: usize, b: usize) -> bool {
    let (ar, ac) = position(a);
    let (br, bc) = position(b);
    ar.abs_diff(br) + ac.abs_diff(bc) == 1
}

/// Area-clearing behaviour attached to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Special {
    RocketHorizontal,
    RocketVertical,
    Bomb,
}

impl Special {
    /// Numeric code used by the flat typed-array export (0 is "no special").
    pub fn code(self) -> u8 {
        match self {
            Self::RocketHorizontal => 1,
            Self::RocketVertical => 2,
            Self::Bomb => 3,
        }
    }

    /// Rocket whose blast runs along `axis`.
    pub fn rocket(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::RocketHorizontal,
            Axis::Vertical => Self::RocketVertical,
        }
    }

    fn suffix(self) -> char {
        match self {
            Self::RocketHorizontal => 'h',
            Self::RocketVertical => 'v',
            Self::Bomb => 'b',
        }
    }

    fn from_suffix(c: char) -> Option<Self> {
        match c {
            'h' => Some(Self::RocketHorizontal),
            'v' => Some(Self::RocketVertical),
            'b' => Some(Self::Bomb),
            _ => None,
        }
    }
}

/// A colored token, optionally carrying a special.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub color: u8,
    pub special: Option<Special>,
}

impl Token {
    pub fn plain(color: u8) -> Self {
        Self { color, special: None }
    }

    pub fn with_special(color: u8, special: Special) -> Self {
        Self {
            color,
            special: Some(special),
        }
    }
}

/// A board cell. `None` only exists mid-resolution, between removal and refill.
pub type Cell = Option<Token>;

/// Line direction of a run or a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// An ordered pair of adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Horizontal if both endpoints share a row.
    pub fn axis(&self) -> Axis {
        if position(self.from).0 == position(self.to).0 {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// The playing field.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// A board with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: vec![None; CELL_COUNT],
        }
    }

    /// Build a board from exactly `CELL_COUNT` cells.
    pub fn from_cells(cells: Vec<Cell>) -> Result<Self, EngineError> {
        if cells.len() != CELL_COUNT {
            return Err(EngineError::InvalidBoard(format!(
                "expected {CELL_COUNT} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self { cells })
    }

    /// Parse a whitespace-separated board literal, row-major.
    ///
    /// Each token is a color digit optionally followed by `h`, `v` or `b`
    /// for a rocket (horizontal / vertical) or a bomb; `.` is an empty cell.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for token in text.split_whitespace() {
            if token == "." {
                cells.push(None);
                continue;
            }
            let mut chars = token.chars();
            let color = chars
                .next()
                .and_then(|c| c.to_digit(10))
                .ok_or_else(|| EngineError::InvalidBoard(format!("bad cell `{token}`")))?;
            let special = match (chars.next(), chars.next()) {
                (None, _) => None,
                (Some(c), None) => Some(Special::from_suffix(c).ok_or_else(|| {
                    EngineError::InvalidBoard(format!("unknown special in `{token}`"))
                })?),
                _ => return Err(EngineError::InvalidBoard(format!("bad cell `{token}`"))),
            };
            cells.push(Some(Token {
                color: color as u8,
                special,
            }));
        }
        Self::from_cells(cells)
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Cell {
        self.cells[index]
    }

    #[inline(always)]
    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    #[inline(always)]
    pub fn clear(&mut self, index: usize) {
        self.cells[index] = None;
    }

    #[inline(always)]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.cells.swap(a, b);
    }

    #[inline(always)]
    pub fn color(&self, index: usize) -> Option<u8> {
        self.cells[index].map(|t| t.color)
    }

    #[inline(always)]
    pub fn special(&self, index: usize) -> Option<Special> {
        self.cells[index].and_then(|t| t.special)
    }

    #[inline(always)]
    pub fn has_special(&self, index: usize) -> bool {
        self.special(index).is_some()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells holding a token.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.filled_count() == CELL_COUNT
    }

    /// Count special tokens on the board.
    pub fn special_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some_and(|t| t.special.is_some())).count()
    }

    /// Colors as a flat array, `-1` for empty cells.
    pub fn colors_flat(&self) -> Vec<i8> {
        self.cells.iter().map(|c| c.map_or(-1, |t| t.color as i8)).collect()
    }

    /// Special codes as a flat array (see [`Special::code`]).
    pub fn specials_flat(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|c| c.and_then(|t| t.special).map_or(0, Special::code))
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            for col in 0..SIZE {
                if col > 0 {
                    f.write_str(" ")?;
                }
                match self.cells[index(row, col)] {
                    None => f.write_str(".")?,
                    Some(token) => {
                        write!(f, "{}", token.color)?;
                        if let Some(special) = token.special {
                            write!(f, "{}", special.suffix())?;
                        }
                    }
                }
            }
            if row + 1 < SIZE {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\n{self}\n)")
    }
}

/// Pre-computed orthogonal neighbours for every cell.
///
/// Order per cell is fixed: right, left, down, up (clipped to the grid).
/// Both the move oracle and the component flood-fill walk neighbours in
/// this order, so results are deterministic.
pub struct NeighborCache {
    /// Flat storage of all neighbour indices.
    data: Vec<usize>,
    /// offsets[i]..offsets[i + 1] is the slice of `data` for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    pub fn new() -> Self {
        let mut data = Vec::with_capacity(CELL_COUNT * 4);
        let mut offsets = Vec::with_capacity(CELL_COUNT + 1);

        for i in 0..CELL_COUNT {
            offsets.push(data.len());
            let (r, c) = position(i);
            if c + 1 < SIZE {
                data.push(index(r, c + 1));
            }
            if c > 0 {
                data.push(index(r, c - 1));
            }
            if r + 1 < SIZE {
                data.push(index(r + 1, c));
            }
            if r > 0 {
                data.push(index(r - 1, c));
            }
        }
        offsets.push(data.len()); // sentinel

        Self { data, offsets }
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> &[usize] {
        &self.data[self.offsets[index]..self.offsets[index + 1]]
    }
}

impl Default for NeighborCache {
    fn default() -> Self {
        Self::new()
    }
}
