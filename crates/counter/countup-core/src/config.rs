//! Core configuration for countup-core.

use serde::{Deserialize, Serialize};

/// Configuration for engine sizing and output policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for counter storage and per-tick change buffers.
    pub capacity: usize,

    /// Maximum events to retain per tick; extra events are dropped with a warning.
    pub max_events_per_tick: usize,

    /// Emit a change for every live counter each tick, not only for counters
    /// whose displayed value moved.
    pub emit_unchanged: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 16,
            max_events_per_tick: 1024,
            emit_unchanged: false,
        }
    }
}
