//! Counter configuration record and its validation.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::CounterError;
use crate::trigger::TriggerMode;

/// Fractional digits beyond this are not representable in an f64 display value.
pub const MAX_DECIMALS: u32 = 12;

pub const DEFAULT_DURATION_MS: f64 = 2000.0;

fn default_duration_ms() -> f64 {
    DEFAULT_DURATION_MS
}

/// Configuration for one counter instance.
///
/// JSON accepts snake_case or camelCase field names; only `end_value` is required.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterSpec {
    #[serde(default, alias = "startValue")]
    pub start_value: f64,
    #[serde(alias = "endValue")]
    pub end_value: f64,
    #[serde(default = "default_duration_ms", alias = "durationMs")]
    pub duration_ms: f64,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub trigger: TriggerMode,
}

impl CounterSpec {
    /// Count from 0 to `end_value` over the default duration with ease-out-cubic.
    pub fn new(end_value: f64) -> Self {
        Self {
            start_value: 0.0,
            end_value,
            duration_ms: DEFAULT_DURATION_MS,
            decimals: 0,
            easing: Easing::default(),
            trigger: TriggerMode::default(),
        }
    }

    pub fn start_value(mut self, start_value: f64) -> Self {
        self.start_value = start_value;
        self
    }

    pub fn duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    /// Parse and validate a JSON counter config. Malformed input (negative
    /// decimals, missing end value, unknown fields) is reported as `InvalidSpec`.
    pub fn from_json(json: &str) -> Result<Self, CounterError> {
        let spec: CounterSpec = serde_json::from_str(json)
            .map_err(|e| CounterError::invalid(format!("counter json: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check every field against its contract.
    pub fn validate(&self) -> Result<(), CounterError> {
        if !self.start_value.is_finite() {
            return Err(CounterError::invalid(format!(
                "start value must be finite, got {}",
                self.start_value
            )));
        }
        if !self.end_value.is_finite() {
            return Err(CounterError::invalid(format!(
                "end value must be finite, got {}",
                self.end_value
            )));
        }
        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return Err(CounterError::invalid(format!(
                "duration must be a positive number of milliseconds, got {}",
                self.duration_ms
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(CounterError::invalid(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        self.trigger.validate()?;
        self.easing.check_boundaries()
    }

    /// Lower and upper bound of every displayed value.
    pub fn value_range(&self) -> (f64, f64) {
        (
            self.start_value.min(self.end_value),
            self.start_value.max(self.end_value),
        )
    }
}
