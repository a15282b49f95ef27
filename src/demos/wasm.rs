//! WASM bindings for the demo suite.
//!
//! The browser host owns `requestAnimationFrame` and calls `tick` once per
//! frame with the frame timestamp; the binding keeps the pending handle so
//! frames scheduled before a `stop` or restart are ignored.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { WasmDemo } from 'physdemo';
//!
//! await init();
//! const demo = new WasmDemo('pendulum');
//! demo.set_params_json('{"length": 2.0, "initial_angle_deg": 20}');
//! demo.start();
//!
//! function frame(now) {
//!     if (demo.tick(now)) {
//!         draw(JSON.parse(demo.bodies_px_json(canvas.width / 2, canvas.height)));
//!         requestAnimationFrame(frame);
//!     }
//! }
//! requestAnimationFrame(frame);
//! ```

// WASM-bindgen exports don't need #[must_use] - values returned to JS
#![allow(clippy::must_use_candidate)]

use wasm_bindgen::prelude::*;

use super::{simulation_for, AnySimulation, DemoKind, DemoParams};
use crate::engine::{TickHandle, TickOutcome};
use crate::error::SimError;
use crate::units::PixelScale;

fn to_js(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exported demo instance.
#[wasm_bindgen]
pub struct WasmDemo {
    sim: AnySimulation,
    handle: Option<TickHandle>,
    scale: PixelScale,
}

#[wasm_bindgen]
impl WasmDemo {
    /// Create an idle demo by name (`drop`, `spring`, `gravity_pair`,
    /// `pendulum`, `friction_slide`, `projectile`).
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str) -> Result<WasmDemo, JsValue> {
        let kind: DemoKind = kind.parse().map_err(to_js)?;
        Ok(Self {
            sim: simulation_for(DemoParams::defaults(kind)),
            handle: None,
            scale: PixelScale::default(),
        })
    }

    /// Replace the editable parameters from a JSON object.
    ///
    /// Missing fields take their defaults; `kind` may be omitted.
    #[wasm_bindgen]
    pub fn set_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let mut value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| to_js(e.into()))?;
        if let Some(object) = value.as_object_mut() {
            object
                .entry("kind")
                .or_insert_with(|| self.sim.kind().as_str().into());
        }
        let params: DemoParams = serde_json::from_value(value).map_err(|e| to_js(e.into()))?;
        self.sim.set_params(params).map_err(to_js)
    }

    /// Current editable parameters as JSON.
    #[wasm_bindgen]
    pub fn params_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sim.params()).map_err(|e| to_js(e.into()))
    }

    /// Start (or restart) a run.
    #[wasm_bindgen]
    pub fn start(&mut self) {
        self.handle = Some(self.sim.start());
    }

    /// Stop the current run.
    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.sim.stop();
        self.handle = None;
    }

    /// Return to idle with the state rebuilt from the parameters.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.sim.reset();
        self.handle = None;
    }

    /// Deliver an animation frame (timestamp in milliseconds).
    ///
    /// Returns `true` while the host should keep requesting frames.
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        match self.sim.tick(handle, now_ms / 1000.0) {
            TickOutcome::Continue { next, .. } => {
                self.handle = Some(next);
                true
            }
            TickOutcome::Stopped(_) | TickOutcome::Stale => false,
        }
    }

    /// Current state as JSON.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsValue> {
        let value = self.sim.state_json().map_err(to_js)?;
        Ok(value.to_string())
    }

    /// Derived metrics as JSON.
    #[wasm_bindgen]
    pub fn metrics_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sim.metrics()).map_err(|e| to_js(e.into()))
    }

    /// Path trace as JSON.
    #[wasm_bindgen]
    pub fn trajectory_json(&self) -> Result<String, JsValue> {
        let value = self.sim.trajectory_json().map_err(to_js)?;
        Ok(value.to_string())
    }

    /// Lifecycle as JSON (`{"phase": "stopped", "reason": "at_rest"}`).
    #[wasm_bindgen]
    pub fn lifecycle(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sim.lifecycle()).map_err(|e| to_js(e.into()))
    }

    /// Change the display scale used by `bodies_px_json`.
    #[wasm_bindgen]
    pub fn set_pixels_per_meter(&mut self, ratio: f64) -> Result<(), JsValue> {
        self.scale = PixelScale::new(ratio).map_err(to_js)?;
        Ok(())
    }

    /// Body positions in canvas pixels (`[[x, y], ...]`, y down), with the
    /// world origin drawn at (`origin_x`, `ground_y`).
    #[wasm_bindgen]
    pub fn bodies_px_json(&self, origin_x: f64, ground_y: f64) -> Result<String, JsValue> {
        let points: Vec<(f64, f64)> = self
            .sim
            .bodies()
            .into_iter()
            .map(|b| self.scale.project(b, origin_x, ground_y))
            .collect();
        serde_json::to_string(&points).map_err(|e| to_js(e.into()))
    }

    /// Simulated seconds elapsed in the current run.
    #[wasm_bindgen]
    pub fn elapsed(&self) -> f64 {
        self.sim.elapsed()
    }
}
