//! Input contracts for the engine.
//!
//! Adapters (web) collect visibility observer callbacks and explicit commands
//! between frames and pass them into Engine::update() with the frame timestamp.

use serde::{Deserialize, Serialize};

use crate::ids::CounterId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Visible-fraction reports, applied in order before sampling.
    #[serde(default)]
    pub visibility: Vec<VisibilityReport>,
    /// Explicit commands, applied after visibility reports.
    #[serde(default)]
    pub commands: Vec<CounterCommand>,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisibilityReport {
    pub counter: CounterId,
    pub ratio: f64,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CounterCommand {
    /// Start regardless of trigger mode. No-op once the counter has left Idle.
    Start { counter: CounterId },
    /// Release the counter's resources and remove it from the engine.
    Dispose { counter: CounterId },
}

impl Inputs {
    pub fn visible(mut self, counter: CounterId, ratio: f64) -> Self {
        self.visibility.push(VisibilityReport { counter, ratio });
        self
    }

    pub fn command(mut self, cmd: CounterCommand) -> Self {
        self.commands.push(cmd);
        self
    }
}
