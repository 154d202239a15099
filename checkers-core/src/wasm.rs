//! WASM bindings for checkers-core
//!
//! Provides a JavaScript-friendly presentation adapter. The page owns the
//! network: it polls `takePendingTurn`, waits `delayMs`, sends `prompt` to the
//! oracle, and passes the reply (or `undefined` on failure) to `resolve`.

use std::time::Duration;

use wasm_bindgen::prelude::*;

use crate::{
    Click, Coordinator, CoordinatorConfig, OracleError, OracleMovePolicy, Square, TurnOutcome,
};

/// WASM-friendly wrapper around the turn coordinator
#[wasm_bindgen]
pub struct WasmGame {
    inner: Coordinator,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game with the automated side playing black
    #[wasm_bindgen(constructor)]
    pub fn new(delay_ms: u32, strict: bool) -> WasmGame {
        let config = CoordinatorConfig {
            delay: Duration::from_millis(delay_ms as u64),
            oracle_moves: if strict {
                OracleMovePolicy::Strict
            } else {
                OracleMovePolicy::Lenient
            },
            ..CoordinatorConfig::default()
        };
        WasmGame {
            inner: Coordinator::new(config),
        }
    }

    /// Board, turn, selection and thinking flag as a JS object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).map_err(JsValue::from)
    }

    /// Handle a click. Returns "ignored", "selected", "deselected" or "moved"
    #[wasm_bindgen(js_name = clickSquare)]
    pub fn click_square(&mut self, row: u8, col: u8) -> String {
        let Some(square) = Square::new(row, col) else {
            return "ignored".to_string();
        };
        match self.inner.click(square) {
            Click::Ignored => "ignored",
            Click::Selected(_) => "selected",
            Click::Deselected => "deselected",
            Click::Moved(_) => "moved",
        }
        .to_string()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Whether the manual side may click
    #[wasm_bindgen(js_name = isPlayerTurn)]
    pub fn is_player_turn(&self) -> bool {
        self.inner.turn() == self.inner.manual_side() && !self.inner.is_thinking()
    }

    /// Next oracle request as `{ generation, prompt, delayMs }`, or null
    #[wasm_bindgen(js_name = takePendingTurn)]
    pub fn take_pending_turn(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.take_pending_turn() {
            Some(turn) => serde_wasm_bindgen::to_value(&WasmTurn {
                generation: turn.generation,
                prompt: turn.prompt,
                delay_ms: turn.delay.as_millis() as u64,
            })
            .map_err(JsValue::from),
            None => Ok(JsValue::NULL),
        }
    }

    /// Feed back the oracle reply. Returns "applied", "forfeited" or "stale"
    pub fn resolve(&mut self, generation: u64, reply: Option<String>) -> String {
        let reply = reply.ok_or_else(|| OracleError::Transport("request failed".to_string()));
        match self.inner.resolve(generation, reply) {
            TurnOutcome::Applied(_) => "applied",
            TurnOutcome::Forfeited(_) => "forfeited",
            TurnOutcome::Stale => "stale",
        }
        .to_string()
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new(1000, false)
    }
}

/// Serializable oracle request for JavaScript
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WasmTurn {
    generation: u64,
    prompt: String,
    delay_ms: u64,
}
