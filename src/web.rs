//! Browser bridge
//!
//! A thin `wasm_bindgen` wrapper around [`GameState`] for a JS host that owns
//! the canvas, audio and input. The host calls `advance` from its animation
//! frame, then reads `snapshot_json` and `drain_events_json`.

use wasm_bindgen::prelude::*;

use crate::render::RenderSnapshot;
use crate::sim::{self, GameState, Side, aim_guide, fire_recon, fire_shot};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Blind Break starting...");
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub struct BlindBreak {
    state: GameState,
}

#[wasm_bindgen]
impl BlindBreak {
    /// New match; a zero seed draws one from the JS clock
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> BlindBreak {
        let seed = if seed == 0 {
            js_sys::Date::now() as u64
        } else {
            seed
        };
        BlindBreak {
            state: GameState::new(seed),
        }
    }

    /// New match with a JSON tuning override
    pub fn with_tuning(seed: u64, tuning_json: &str) -> Result<BlindBreak, JsValue> {
        let tuning =
            Tuning::from_json(tuning_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(BlindBreak {
            state: GameState::with_tuning(seed, tuning),
        })
    }

    pub fn advance(&mut self, dt: f32) {
        sim::advance(&mut self.state, dt);
    }

    /// Human shot. Returns false if the intent was refused
    pub fn fire_shot(&mut self, angle: f32, power: f32) -> bool {
        fire_shot(&mut self.state, Side::Player, angle, power).is_ok()
    }

    /// Human recon scan. Returns false if the intent was refused
    pub fn fire_recon(&mut self, angle: f32) -> bool {
        fire_recon(&mut self.state, Side::Player, angle).is_ok()
    }

    /// Demo mode: the AI plays both sides
    pub fn set_autopilot(&mut self, enabled: bool) {
        sim::set_autopilot(&mut self.state, enabled);
    }

    pub fn reset(&mut self) {
        self.state.reset();
        if self.state.autopilot {
            sim::set_autopilot(&mut self.state, true);
        }
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        to_js(&RenderSnapshot::capture(&self.state))
    }

    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        to_js(&self.state.drain_events())
    }

    /// Predicted first contact for the aim line, `null` when none
    pub fn aim_guide_json(&self, angle: f32) -> Result<String, JsValue> {
        to_js(&aim_guide(&self.state, angle))
    }

    pub fn stats_summary(&self) -> String {
        self.state.stats.summary()
    }
}
