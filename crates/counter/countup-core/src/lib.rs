//! countup core (host-agnostic)
//!
//! Single-use animated counters: a value tweens from a start to a target over a
//! fixed duration with an easing curve, triggered on the first host frame or on
//! the first visibility crossing of its display region. The crate holds no
//! timers and does no I/O; hosts drive it with their own frame timestamps.

pub mod config;
pub mod counter;
pub mod data;
pub mod easing;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod section;
pub mod trigger;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use counter::{round_for_display, Counter, Phase};
pub use data::{CounterSpec, DEFAULT_DURATION_MS, MAX_DECIMALS};
pub use easing::Easing;
pub use engine::Engine;
pub use error::CounterError;
pub use format::DisplayFormat;
pub use ids::CounterId;
pub use inputs::{CounterCommand, Inputs, VisibilityReport};
pub use outputs::{Change, CounterEvent, Outputs};
pub use section::{Section, SiteStats, StatItem};
pub use trigger::{TriggerMode, VisibilityGate, VisibilitySubscription};
