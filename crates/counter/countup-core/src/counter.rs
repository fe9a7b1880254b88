//! Counter: the single-use tween state machine behind one animated statistic.
//!
//! Phases move `Idle -> Running -> Completed` and never back. The counter holds
//! no timers: the host calls [`Counter::sample`] once per display refresh with
//! its own timestamp, and either the first sample (Immediate) or the first
//! visibility crossing (OnVisible) starts the run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::CounterSpec;
use crate::error::CounterError;
use crate::trigger::{TriggerMode, VisibilityGate, VisibilitySubscription};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

// Above 2^53 every f64 is already an integer, so scaling adds nothing.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Round a raw tween value for display: floor for whole-number counters,
/// fixed-point rounding otherwise. Never returns negative zero.
#[inline]
pub fn round_for_display(raw: f64, decimals: u32) -> f64 {
    let rounded = if decimals == 0 {
        raw.floor()
    } else {
        let scale = 10f64.powi(decimals as i32);
        let scaled = raw * scale;
        if scaled.is_finite() && scaled.abs() <= MAX_EXACT_INT {
            scaled.round() / scale
        } else {
            raw
        }
    };
    rounded + 0.0
}

pub struct Counter {
    spec: CounterSpec,
    phase: Phase,
    started_at_ms: Option<f64>,
    current_value: f64,
    // Highest progress handed out so far; earlier host timestamps never rewind the display.
    last_progress: f64,
    gate: Option<VisibilityGate>,
    subscription: Option<Box<dyn VisibilitySubscription>>,
    disposed: bool,
}

impl Counter {
    /// Validate `spec` and build an Idle counter showing the start value.
    pub fn new(spec: CounterSpec) -> Result<Self, CounterError> {
        spec.validate()?;
        let gate = match spec.trigger {
            TriggerMode::Immediate => None,
            TriggerMode::OnVisible { threshold } => Some(VisibilityGate::new(threshold)),
        };
        let mut counter = Self {
            spec,
            phase: Phase::Idle,
            started_at_ms: None,
            current_value: 0.0,
            last_progress: 0.0,
            gate,
            subscription: None,
            disposed: false,
        };
        counter.current_value = counter.display(counter.spec.start_value);
        Ok(counter)
    }

    /// Like [`Counter::new`], taking ownership of the host's visibility subscription
    /// for this counter's display region.
    pub fn with_subscription(
        spec: CounterSpec,
        subscription: Box<dyn VisibilitySubscription>,
    ) -> Result<Self, CounterError> {
        let mut counter = Self::new(spec)?;
        counter.subscription = Some(subscription);
        Ok(counter)
    }

    pub fn spec(&self) -> &CounterSpec {
        &self.spec
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started_at_ms(&self) -> Option<f64> {
        self.started_at_ms
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// True for an Immediate counter that has not seen its first frame yet.
    pub fn awaits_first_frame(&self) -> bool {
        !self.disposed
            && self.phase == Phase::Idle
            && matches!(self.spec.trigger, TriggerMode::Immediate)
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Leave Idle at `now_ms`. Returns false (and changes nothing) when the
    /// counter already ran, is running, or was disposed.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.disposed || self.phase != Phase::Idle {
            return false;
        }
        if !now_ms.is_finite() {
            log::warn!("countup: ignoring start at non-finite timestamp {now_ms}");
            return false;
        }
        self.phase = Phase::Running;
        self.started_at_ms = Some(now_ms);
        self.last_progress = 0.0;
        // Nothing left to watch for once the run has begun.
        self.release_subscription();
        true
    }

    /// Feed a visible-fraction report for the display region. Starts the counter
    /// on the first crossing of the threshold and returns whether it did.
    pub fn report_visibility(&mut self, ratio: f64, now_ms: f64) -> bool {
        if self.disposed || self.phase != Phase::Idle {
            return false;
        }
        let crossed = match self.gate.as_mut() {
            Some(gate) => gate.observe(ratio),
            None => false,
        };
        crossed && self.start(now_ms)
    }

    /// Display value at `now_ms` without touching state.
    pub fn value_at(&self, now_ms: f64) -> f64 {
        if self.disposed {
            return self.current_value;
        }
        match (self.phase, self.started_at_ms) {
            (Phase::Completed, _) => self.spec.end_value,
            (_, None) => self.display(self.spec.start_value),
            (_, Some(started)) => self.value_for_progress(self.progress_at(started, now_ms)),
        }
    }

    /// Per-frame step. Starts Immediate counters on their first frame, advances
    /// progress, and completes the run once progress reaches 1.
    pub fn sample(&mut self, now_ms: f64) -> f64 {
        if self.disposed {
            return self.current_value;
        }
        if self.awaits_first_frame() {
            self.start(now_ms);
        }
        let started = match (self.phase, self.started_at_ms) {
            (Phase::Running, Some(started)) => started,
            _ => return self.current_value,
        };
        let progress = self.progress_at(started, now_ms).max(self.last_progress);
        self.last_progress = progress;
        if progress >= 1.0 || self.spec.start_value == self.spec.end_value {
            self.phase = Phase::Completed;
            self.current_value = self.spec.end_value;
        } else {
            self.current_value = self.value_for_progress(progress);
        }
        self.current_value
    }

    /// Release the visibility subscription and stop reacting to any later
    /// frame or visibility callback. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.release_subscription();
        self.gate = None;
        self.disposed = true;
    }

    fn release_subscription(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.release();
        }
    }

    fn progress_at(&self, started: f64, now_ms: f64) -> f64 {
        let p = (now_ms - started) / self.spec.duration_ms;
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    fn value_for_progress(&self, progress: f64) -> f64 {
        // Exact target at the boundary; the eased formula can leave a rounding unit behind.
        if progress >= 1.0 {
            return self.spec.end_value;
        }
        let eased = self.spec.easing.eval(progress);
        // Weighted form: `end - start` can overflow for far-apart finite endpoints.
        let raw = self.spec.start_value * (1.0 - eased) + self.spec.end_value * eased;
        self.display(raw)
    }

    fn display(&self, raw: f64) -> f64 {
        let (lo, hi) = self.spec.value_range();
        round_for_display(raw, self.spec.decimals).clamp(lo, hi)
    }
}

impl Drop for Counter {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("spec", &self.spec)
            .field("phase", &self.phase)
            .field("started_at_ms", &self.started_at_ms)
            .field("current_value", &self.current_value)
            .field("subscribed", &self.subscription.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}
