//! Output contracts from the engine.
//!
//! Outputs carry the displayed-value changes for this tick keyed by counter id,
//! plus a separate list of lifecycle events. Adapters write the changes into
//! the page and stop their frame loop once no work is pending.

use serde::{Deserialize, Serialize};

use crate::ids::CounterId;

/// One changed display value this tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub counter: CounterId,
    pub value: f64,
}

/// Discrete lifecycle signals emitted during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CounterEvent {
    Started { counter: CounterId, at_ms: f64 },
    Completed { counter: CounterId, value: f64 },
    Disposed { counter: CounterId },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CounterEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CounterEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Latest change for `counter` in this tick, if any.
    pub fn change_for(&self, counter: CounterId) -> Option<f64> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.counter == counter)
            .map(|c| c.value)
    }
}
