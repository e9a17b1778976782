//! State machine error types.

use thiserror::Error;

use strand_events::errors::EventError;

use crate::types::CallbackKind;

/// Errors that can occur during state machine construction or transitions.
#[derive(Debug, Error)]
pub enum FsmError {
    /// The requested sub-state is outside the machine's declared domain.
    ///
    /// Transitioning to an undeclared value is a programming error; it
    /// fails fast and is never retried.
    #[error("unknown state '{state}' in domain '{domain}'")]
    UnknownState {
        /// Domain that rejected the request.
        domain: String,
        /// The undeclared sub-state value.
        state: String,
    },

    /// No machine is registered for the named domain.
    #[error("unknown domain '{0}'")]
    UnknownDomain(String),

    /// A machine cannot be built over an empty sub-state set.
    #[error("domain '{0}' declares no states")]
    EmptyDomain(String),

    /// The callback kind is not a periodic one
    /// (Update/LateUpdate/FixedUpdate).
    #[error("callback kind '{0}' is not periodic")]
    NotPeriodic(CallbackKind),

    /// Failed to read the machine configuration file.
    #[error("failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Failed to parse the machine configuration JSON.
    #[error("failed to parse config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// A dispatch performed on the machine's behalf failed. Handler
    /// faults raised inside Enter/Exit/Finally/periodic callbacks reach
    /// the caller through this variant, untouched.
    #[error(transparent)]
    Dispatch(#[from] EventError),
}

/// Result type for state machine operations.
pub type Result<T> = std::result::Result<T, FsmError>;
