//! Engine configuration.
//!
//! Deserialized straight from the JS options object, so every field has a
//! default and unknown fields are ignored.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of distinct token colors.
    pub colors: u8,
    /// Score awarded per removed cell.
    pub points_per_cell: u32,
    /// Bonus per combo step, awarded when a turn chains more than one pass.
    pub combo_bonus: u32,
    /// Random boards tried before falling back to the fixed stable layout.
    pub max_generation_attempts: u32,
    /// Fixed seed for reproducible games; entropy when absent.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub const MIN_COLORS: u8 = 3;
    pub const MAX_COLORS: u8 = 8;

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.colors < Self::MIN_COLORS {
            return Err(ConfigError::TooFewColors {
                got: self.colors,
                min: Self::MIN_COLORS,
            });
        }
        if self.colors > Self::MAX_COLORS {
            return Err(ConfigError::TooManyColors {
                got: self.colors,
                max: Self::MAX_COLORS,
            });
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::ZeroGenerationAttempts);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            colors: 4,
            points_per_cell: 10,
            combo_bonus: 20,
            max_generation_attempts: 10_000,
            seed: None,
        }
    }
}
