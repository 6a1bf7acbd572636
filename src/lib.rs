//! WebAssembly match-3 rule engine.
//!
//! Owns a 7×7 board of colored tokens and resolves player moves: matches,
//! rockets and bombs, chain detonations, gravity, refill and cascades. The
//! host renders and animates; the engine decides.
//!
//! Cells are addressed by a flat row-major index `row * 7 + col`. Board data
//! crosses the boundary either as serde objects or as flat typed arrays:
//! `colors()` gives `Int8Array` (-1 for empty), `specials()` gives
//! `Uint8Array` (0 none, 1 horizontal rocket, 2 vertical rocket, 3 bomb).

pub mod board;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod oracle;
pub mod rng;
pub mod special;
pub mod types;

pub use config::EngineConfig;
pub use engine::{Engine, MoveOutcome, PassReport, Resolution, Snapshot, Step};
pub use error::{ConfigError, EngineError, InvalidMove};
pub use types::{Board, Move, Special, Token};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use serde::Serialize;
    use serde_wasm_bindgen::{from_value, to_value};
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(start)]
    pub fn bootstrap() {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
    }

    fn js_error(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
        to_value(value).map_err(|e| e.into())
    }

    /// One game session. All methods are synchronous; a host that wants to
    /// animate cascades drives `beginSwap` / `step` itself.
    #[wasm_bindgen]
    pub struct MatchEngine {
        engine: Engine,
    }

    #[wasm_bindgen]
    impl MatchEngine {
        /// `config` is an optional `{ colors, pointsPerCell, comboBonus,
        /// maxGenerationAttempts, seed }` object; missing fields take defaults.
        #[wasm_bindgen(constructor)]
        pub fn new(config: JsValue) -> Result<MatchEngine, JsValue> {
            let config: EngineConfig = if config.is_undefined() || config.is_null() {
                EngineConfig::default()
            } else {
                from_value(config)?
            };
            let engine = Engine::from_config(config).map_err(js_error)?;
            Ok(MatchEngine { engine })
        }

        /// Fresh board, score reset. Returns the board.
        #[wasm_bindgen(js_name = "newGame")]
        pub fn new_game(&mut self) -> Result<JsValue, JsValue> {
            let board = self.engine.new_game().clone();
            to_js(&board)
        }

        /// Swap and resolve in one call. Returns the `MoveOutcome` object.
        #[wasm_bindgen(js_name = "attemptSwap")]
        pub fn attempt_swap(&mut self, from: usize, to: usize) -> Result<JsValue, JsValue> {
            let outcome = self.engine.attempt_swap(from, to).map_err(js_error)?;
            to_js(&outcome)
        }

        #[wasm_bindgen(js_name = "activateSpecial")]
        pub fn activate_special(&mut self, index: usize) -> Result<JsValue, JsValue> {
            let outcome = self.engine.activate_special(index).map_err(js_error)?;
            to_js(&outcome)
        }

        #[wasm_bindgen(js_name = "beginSwap")]
        pub fn begin_swap(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
            self.engine.begin_swap(from, to).map_err(js_error)
        }

        #[wasm_bindgen(js_name = "beginActivation")]
        pub fn begin_activation(&mut self, index: usize) -> Result<(), JsValue> {
            self.engine.begin_activation(index).map_err(js_error)
        }

        /// Run one pass. Returns `{ step: "pass" | "finished", data }`.
        pub fn step(&mut self) -> Result<JsValue, JsValue> {
            let step = self.engine.step().map_err(js_error)?;
            to_js(&step)
        }

        /// `{ from, to }` or `null` when the board is deadlocked.
        #[wasm_bindgen(js_name = "queryHint")]
        pub fn query_hint(&self) -> Result<JsValue, JsValue> {
            match self.engine.query_hint() {
                Some(mv) => to_js(&mv),
                None => Ok(JsValue::NULL),
            }
        }

        pub fn snapshot(&self) -> Result<JsValue, JsValue> {
            to_js(&self.engine.snapshot())
        }

        pub fn score(&self) -> u32 {
            self.engine.score()
        }

        #[wasm_bindgen(js_name = "isBusy")]
        pub fn is_busy(&self) -> bool {
            self.engine.is_busy()
        }

        /// Flat row-major colors, -1 for empty cells.
        pub fn colors(&self) -> js_sys::Int8Array {
            let flat = self.engine.board().colors_flat();
            let arr = js_sys::Int8Array::new_with_length(flat.len() as u32);
            arr.copy_from(&flat);
            arr
        }

        /// Flat row-major special codes.
        pub fn specials(&self) -> js_sys::Uint8Array {
            let flat = self.engine.board().specials_flat();
            let arr = js_sys::Uint8Array::new_with_length(flat.len() as u32);
            arr.copy_from(&flat);
            arr
        }
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM match engine ready".to_string()
    }
}
