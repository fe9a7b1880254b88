//! Error types for counter construction and lookup.

use crate::ids::CounterId;

/// Errors surfaced by the counter core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CounterError {
    /// Configuration out of contract. Only raised while building a counter.
    #[error("invalid counter spec: {reason}")]
    InvalidSpec { reason: String },

    /// No live counter is registered under this id.
    #[error("unknown counter: {id:?}")]
    UnknownCounter { id: CounterId },

    /// Every `CounterId` has been handed out by this engine.
    #[error("counter ids exhausted")]
    IdsExhausted,
}

impl CounterError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CounterError::InvalidSpec {
            reason: reason.into(),
        }
    }
}
