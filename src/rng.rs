//! Random color sources.
//!
//! The engine never reaches for ambient randomness: every token it creates
//! comes from an injected [`ColorSource`]. Games use `WasmRng`; crafted
//! scenarios and replays use `ScriptedColors`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Supplies uniformly distributed token colors.
pub trait ColorSource {
    /// A color in `[0, colors)`.
    fn next_color(&mut self, colors: u8) -> u8;
}

/// Token colors drawn from a `SmallRng`.
///
/// Unseeded games pull entropy through `getrandom`, which maps to
/// `crypto.getRandomValues` in the browser. A fixed seed replays the same
/// boards and refills.
pub struct WasmRng {
    inner: SmallRng,
}

impl WasmRng {
    /// Fresh, unpredictable game.
    pub fn from_entropy() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Reproducible game: equal seeds give equal color streams.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded when the config carries a seed, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl Default for WasmRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl ColorSource for WasmRng {
    #[inline(always)]
    fn next_color(&mut self, colors: u8) -> u8 {
        self.inner.random_range(0..colors)
    }
}

/// Cycles through a fixed list of colors, wrapping each value into range.
pub struct ScriptedColors {
    colors: Vec<u8>,
    cursor: usize,
}

impl ScriptedColors {
    /// # Panics
    ///
    /// Panics if `colors` is empty; there would be nothing to cycle through.
    pub fn new(colors: Vec<u8>) -> Self {
        assert!(!colors.is_empty(), "scripted color list must not be empty");
        Self { colors, cursor: 0 }
    }

    /// How many colors have been handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl ColorSource for ScriptedColors {
    fn next_color(&mut self, colors: u8) -> u8 {
        let value = self.colors[self.cursor % self.colors.len()];
        self.cursor += 1;
        value % colors
    }
}
