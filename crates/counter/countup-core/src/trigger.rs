//! Trigger strategies deciding when a counter leaves Idle.
//!
//! Immediate counters start on the first host frame that samples them.
//! OnVisible counters wait for the host's visibility observer to report that the
//! display region crossed the threshold from below; the gate fires once and the
//! counter releases its observer subscription.

use serde::{Deserialize, Serialize};

use crate::error::CounterError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TriggerMode {
    #[default]
    Immediate,
    OnVisible {
        /// Minimum visible fraction of the display region, in [0, 1].
        threshold: f64,
    },
}

impl TriggerMode {
    pub fn on_visible(threshold: f64) -> Self {
        TriggerMode::OnVisible { threshold }
    }

    pub(crate) fn validate(&self) -> Result<(), CounterError> {
        match self {
            TriggerMode::Immediate => Ok(()),
            TriggerMode::OnVisible { threshold } => {
                if threshold.is_finite() && (0.0..=1.0).contains(threshold) {
                    Ok(())
                } else {
                    Err(CounterError::invalid(format!(
                        "visibility threshold must lie in [0, 1], got {threshold}"
                    )))
                }
            }
        }
    }
}

/// Host-owned visibility observation for one display region.
///
/// The counter holds the subscription and releases it exactly once: after the
/// first threshold crossing, or on dispose/drop, whichever comes first.
pub trait VisibilitySubscription {
    fn release(&mut self);
}

/// Single-shot threshold crossing detector.
#[derive(Clone, Debug)]
pub struct VisibilityGate {
    threshold: f64,
    fired: bool,
}

impl VisibilityGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Whether `ratio` counts as visible. A zero threshold means any visible pixel.
    fn meets(&self, ratio: f64) -> bool {
        if self.threshold == 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        }
    }

    /// Feed one observation. Returns true only on the first crossing.
    /// Regions start out "below", so an initial report above the threshold counts.
    pub fn observe(&mut self, ratio: f64) -> bool {
        if self.fired || !ratio.is_finite() {
            return false;
        }
        if self.meets(ratio) {
            self.fired = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_on_first_crossing() {
        let mut gate = VisibilityGate::new(0.5);
        assert!(!gate.observe(0.0));
        assert!(!gate.observe(0.49));
        assert!(gate.observe(0.5));
        assert!(gate.has_fired());
        assert!(!gate.observe(0.2));
        assert!(!gate.observe(0.9));
    }

    #[test]
    fn zero_threshold_needs_some_visibility() {
        let mut gate = VisibilityGate::new(0.0);
        assert!(!gate.observe(0.0));
        assert!(gate.observe(0.01));
    }

    #[test]
    fn nan_ratio_ignored() {
        let mut gate = VisibilityGate::new(0.5);
        assert!(!gate.observe(f64::NAN));
        assert!(!gate.has_fired());
    }

    #[test]
    fn threshold_validation() {
        assert!(TriggerMode::on_visible(0.5).validate().is_ok());
        assert!(TriggerMode::on_visible(1.0).validate().is_ok());
        assert!(TriggerMode::on_visible(1.5).validate().is_err());
        assert!(TriggerMode::on_visible(-0.1).validate().is_err());
        assert!(TriggerMode::on_visible(f64::NAN).validate().is_err());
    }

    #[test]
    fn serde_forms() {
        let t: TriggerMode =
            serde_json::from_str(r#"{"mode":"on_visible","threshold":0.5}"#).unwrap();
        assert_eq!(t, TriggerMode::OnVisible { threshold: 0.5 });
        let i: TriggerMode = serde_json::from_str(r#"{"mode":"immediate"}"#).unwrap();
        assert_eq!(i, TriggerMode::Immediate);
    }
}
