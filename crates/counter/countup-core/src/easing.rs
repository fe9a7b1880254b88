//! Easing curves that map linear time progress onto animation progress.
//!
//! Every curve here satisfies `eval(0) == 0` and `eval(1) == 1`. Custom closures
//! and bezier control points are checked against that at counter creation
//! (see [`Easing::check_boundaries`]).
//!
//! Serialized form is internally tagged:
//! `{"type": "ease_out_cubic"}` or
//! `{"type": "cubic_bezier", "x1": 0.25, "y1": 0.1, "x2": 0.25, "y2": 1.0}`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CounterError;

/// Allowed deviation of `eval(0)` / `eval(1)` from 0 / 1.
pub const EASING_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    /// Decelerates into the target. Default for count-up counters.
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
    /// CSS cubic-bezier(x1, y1, x2, y2). x1 and x2 must lie in [0, 1].
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Caller-supplied curve. Not serializable.
    #[serde(skip)]
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Easing {
    /// Create a custom easing from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Easing::Custom(Arc::new(f))
    }

    /// Evaluate the curve at `t`, clamped into [0, 1] first.
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Easing::CubicBezier { x1, y1, x2, y2 } => bezier_ease_t(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }

    /// Verify the curve starts at 0 and ends at 1.
    pub fn check_boundaries(&self) -> Result<(), CounterError> {
        if let Easing::CubicBezier { x1, y1, x2, y2 } = self {
            if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                return Err(CounterError::invalid(
                    "cubic bezier control points must be finite",
                ));
            }
            if !(0.0..=1.0).contains(x1) || !(0.0..=1.0).contains(x2) {
                return Err(CounterError::invalid(format!(
                    "cubic bezier x control points must lie in [0, 1], got x1={x1} x2={x2}"
                )));
            }
        }
        let at_start = self.eval(0.0);
        let at_end = self.eval(1.0);
        if !at_start.is_finite() || at_start.abs() > EASING_TOLERANCE {
            return Err(CounterError::invalid(format!(
                "easing must map 0 to 0, got {at_start}"
            )));
        }
        if !at_end.is_finite() || (at_end - 1.0).abs() > EASING_TOLERANCE {
            return Err(CounterError::invalid(format!(
                "easing must map 1 to 1, got {at_end}"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "Linear"),
            Easing::EaseInQuad => write!(f, "EaseInQuad"),
            Easing::EaseOutQuad => write!(f, "EaseOutQuad"),
            Easing::EaseInOutQuad => write!(f, "EaseInOutQuad"),
            Easing::EaseInCubic => write!(f, "EaseInCubic"),
            Easing::EaseOutCubic => write!(f, "EaseOutCubic"),
            Easing::EaseInOutCubic => write!(f, "EaseInOutCubic"),
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Custom(_) => write!(f, "Custom"),
        }
    }
}

#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x bezier by bisection, then evaluate y at the found parameter.
#[inline]
fn bezier_ease_t(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..48 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
