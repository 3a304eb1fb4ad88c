//! WASM entry points for the browser front end.
//!
//! The page owns one [`TapGrid`] and drives it from its animation loop.

use wasm_bindgen::prelude::*;

use crate::game::GameEngine;
use crate::leaderboard::{LeaderboardEntry, display_window};
use crate::name_entry::NameEntry;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Game engine handle exported to JavaScript.
#[wasm_bindgen]
pub struct TapGrid {
    engine: GameEngine,
    name_entry: NameEntry,
}

#[wasm_bindgen]
impl TapGrid {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TapGrid {
        TapGrid {
            engine: GameEngine::from_entropy(),
            name_entry: NameEntry::new(),
        }
    }

    pub fn start(&mut self) {
        self.engine.start();
        self.name_entry = NameEntry::new();
    }

    pub fn end(&mut self) {
        self.engine.end();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Runs the engine clock forward and returns the resulting events.
    pub fn advance(&mut self, dt_ms: u32) -> Result<JsValue, JsValue> {
        let events = self.engine.advance(u64::from(dt_ms));
        to_js(&events)
    }

    /// Returns the new score on a hit, `undefined` otherwise.
    pub fn tap(&mut self, id: u32) -> Option<u32> {
        self.engine.tap_target(id)
    }

    pub fn session(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.session())
    }

    /// Feeds a key press to the name picker.
    pub fn name_key(&mut self, key: &str) {
        match key {
            "ArrowUp" => self.name_entry.cycle_up(),
            "ArrowDown" => self.name_entry.cycle_down(),
            "ArrowRight" => self.name_entry.move_right(),
            "ArrowLeft" => self.name_entry.move_left(),
            _ => {
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    let _ = self.name_entry.type_char(c);
                }
            }
        }
    }

    /// Name currently spelled in the picker.
    pub fn name(&self) -> String {
        self.name_entry.name()
    }

    /// Ranked rows of `entries` to show beside the session's score.
    pub fn leaderboard_window(&self, entries: JsValue) -> Result<JsValue, JsValue> {
        let entries: Vec<LeaderboardEntry> = serde_wasm_bindgen::from_value(entries)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&display_window(&entries, self.engine.score()))
    }
}

impl Default for TapGrid {
    fn default() -> Self {
        Self::new()
    }
}
