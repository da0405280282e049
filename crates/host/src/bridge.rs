use std::cell::RefCell;
use thiserror::Error;
use types::{ConfigError, Rgb, SimParams};
use wasm_bindgen::prelude::*;

use crate::App;

thread_local! {
    pub static APP: RefCell<Option<App>> = RefCell::new(None);
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unknown parameter '{0}'")]
    UnknownParam(String),
    #[error("malformed parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<BridgeError> for JsValue {
    fn from(e: BridgeError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Copy of `params` with one top-level field replaced. Whole numbers are
/// passed as integers so unsigned fields accept them.
pub fn patch_param(params: &SimParams, name: &str, value: f64) -> Result<SimParams, BridgeError> {
    let mut doc = serde_json::to_value(params)?;
    let slot = doc
        .get_mut(name)
        .ok_or_else(|| BridgeError::UnknownParam(name.to_string()))?;
    *slot = if value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
        serde_json::Value::from(value as u64)
    } else {
        serde_json::Value::from(value)
    };
    let patched: SimParams = serde_json::from_value(doc)?;
    patched.validate()?;
    Ok(patched)
}

/// Parse a (possibly partial) JSON document; missing fields take defaults.
pub fn parse_params(json: &str) -> Result<SimParams, BridgeError> {
    let params: SimParams = serde_json::from_str(json)?;
    params.validate()?;
    Ok(params)
}

fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Option<T> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

#[wasm_bindgen]
pub fn set_param(name: &str, value: f64) -> Result<(), JsValue> {
    with_app(|app| {
        let patched = patch_param(app.pending_params(), name, value)?;
        app.stage(patched);
        Ok(())
    })
    .unwrap_or(Ok(()))
}

#[wasm_bindgen]
pub fn set_agent_color(r: f32, g: f32, b: f32) -> Result<(), JsValue> {
    with_app(|app| {
        let patched = SimParams {
            agent_color: Rgb::new(r, g, b),
            ..app.pending_params().clone()
        };
        patched.validate().map_err(BridgeError::from)?;
        app.stage(patched);
        Ok(())
    })
    .unwrap_or(Ok(()))
}

#[wasm_bindgen]
pub fn set_params_json(json: &str) -> Result<(), JsValue> {
    let params = parse_params(json)?;
    with_app(|app| app.stage(params));
    Ok(())
}

/// Parameters as they will be after the next frame boundary.
#[wasm_bindgen]
pub fn params_json() -> String {
    with_app(|app| serde_json::to_string(app.pending_params()).unwrap_or_default())
        .unwrap_or_default()
}

#[wasm_bindgen]
pub fn reset() {
    with_app(|app| app.reset_requested = true);
}

#[wasm_bindgen]
pub fn set_paused(paused: bool) {
    with_app(|app| app.timing.set_paused(paused));
}

#[wasm_bindgen]
pub fn single_step() {
    with_app(|app| app.timing.request_single_step());
}

#[wasm_bindgen]
pub fn set_steps_per_frame(steps: u32) {
    with_app(|app| app.timing.set_steps_per_frame(steps));
}

#[wasm_bindgen]
pub fn on_key_down(key: String) {
    with_app(|app| match key.as_str() {
        "p" | "P" => app.timing.toggle_pause(),
        "n" | "N" => app.timing.request_single_step(),
        "r" | "R" => app.reset_requested = true,
        _ => {}
    });
}
