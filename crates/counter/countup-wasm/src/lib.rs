//! Browser bindings for countup-core.
//!
//! The page owns requestAnimationFrame and IntersectionObserver. It attaches one
//! counter per stat element, forwards observer callbacks through
//! `reportVisibility` (or as `visibility` entries in `update` inputs), calls
//! `update(performance.now())` each frame while `hasPendingWork()` is true, and
//! writes the returned changes into the DOM.

use js_sys::{Function, JSON};
use log::warn;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use countup_core::{
    Config, CounterId, CounterSpec, DisplayFormat, Engine, Inputs, Outputs, Section,
    VisibilitySubscription,
};

#[wasm_bindgen]
pub struct CountupEngine {
    core: Engine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Stringify a JS object so the core's JSON parsers (and their validation) apply.
fn stringify(value: &JsValue, what: &str) -> Result<String, JsError> {
    if jsvalue_is_undefined_or_null(value) {
        return Err(JsError::new(&format!("{what}: value is null/undefined")));
    }
    JSON::stringify(value)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))
}

/// Visibility subscription backed by a JS callback, typically
/// `() => observer.unobserve(element)`.
struct JsSubscription {
    release: Function,
}

impl VisibilitySubscription for JsSubscription {
    fn release(&mut self) {
        // A throwing release callback is reported; the counter carries on.
        match self.release.call0(&JsValue::UNDEFINED) {
            Ok(_) => {}
            Err(e) => warn!("countup: visibility release callback threw: {:?}", e),
        }
    }
}

#[wasm_bindgen]
impl CountupEngine {
    /// Create a new engine. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new CountupEngine({ emit_unchanged: true })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CountupEngine, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(CountupEngine {
            core: Engine::new(cfg),
        })
    }

    /// Attach a counter from a config object such as
    /// `{ endValue: 12000, decimals: 0, trigger: { mode: "immediate" } }`.
    /// Returns the counter id.
    #[wasm_bindgen]
    pub fn attach(&mut self, spec: JsValue) -> Result<u32, JsError> {
        let spec = CounterSpec::from_json(&stringify(&spec, "attach")?)?;
        Ok(self.core.attach(spec)?.0)
    }

    /// Attach a counter whose display region is watched by the page. `release` is
    /// called once, when the counter starts or is disposed.
    #[wasm_bindgen(js_name = attachObserved)]
    pub fn attach_observed(&mut self, spec: JsValue, release: Function) -> Result<u32, JsError> {
        let spec = CounterSpec::from_json(&stringify(&spec, "attachObserved")?)?;
        let id = self
            .core
            .attach_observed(spec, Box::new(JsSubscription { release }))?;
        Ok(id.0)
    }

    /// Forward an IntersectionObserver ratio. Returns true when it started the counter.
    #[wasm_bindgen(js_name = reportVisibility)]
    pub fn report_visibility(&mut self, id: u32, ratio: f64, now: f64) -> Result<bool, JsError> {
        Ok(self.core.report_visibility(CounterId(id), ratio, now)?)
    }

    /// Start a counter regardless of its trigger mode. Returns true when it left Idle.
    #[wasm_bindgen]
    pub fn start(&mut self, id: u32, now: f64) -> Result<bool, JsError> {
        Ok(self.core.start(CounterId(id), now)?)
    }

    /// Step every counter to `now` (ms) with optional inputs JSON. Returns Outputs JSON:
    /// `{ changes: [{ counter, value }], events: [...] }`.
    #[wasm_bindgen]
    pub fn update(&mut self, now: f64, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out: &Outputs = self.core.update(now, inputs);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Current displayed value of a counter.
    #[wasm_bindgen]
    pub fn value(&self, id: u32) -> Result<f64, JsError> {
        Ok(self.core.value(CounterId(id))?)
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self, id: u32) -> Result<bool, JsError> {
        Ok(self.core.is_complete(CounterId(id))?)
    }

    /// Keep requesting frames while this is true.
    #[wasm_bindgen(js_name = hasPendingWork)]
    pub fn has_pending_work(&self) -> bool {
        self.core.has_pending_work()
    }

    /// Release a counter's observer subscription and remove it. Call when its
    /// element leaves the page.
    #[wasm_bindgen]
    pub fn dispose(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.core.detach(CounterId(id))?)
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.core.len()
    }
}

/// Render a value for the page, e.g. `formatValue(12000, { grouping: true, suffix: "+" })`.
#[wasm_bindgen(js_name = formatValue)]
pub fn format_value(value: f64, format: JsValue) -> Result<String, JsError> {
    let fmt: DisplayFormat = if jsvalue_is_undefined_or_null(&format) {
        DisplayFormat::default()
    } else {
        swb::from_value(format).map_err(|e| JsError::new(&format!("format error: {e}")))?
    };
    Ok(fmt.format(value))
}

/// Build the stats section (labels, targets, display options) from the page's
/// data object. Missing data yields the built-in defaults.
#[wasm_bindgen(js_name = sectionFromHost)]
pub fn section_from_host(data: JsValue) -> Result<JsValue, JsError> {
    let section = if jsvalue_is_undefined_or_null(&data) {
        Section::default()
    } else {
        Section::from_host_json(&stringify(&data, "sectionFromHost")?)?
    };
    swb::to_value(&section).map_err(|e| JsError::new(&format!("section error: {e}")))
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
