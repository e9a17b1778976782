//! Dispatcher error types.

use thiserror::Error;

use crate::listener::ListenerId;

/// Error type a listener action may surface.
///
/// The dispatcher never inspects or swallows these; they propagate to the
/// caller of [`trigger`](crate::dispatcher::EventDispatcher::trigger)
/// wrapped in [`EventError::Handler`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during registration, cancellation, or dispatch.
#[derive(Debug, Error)]
pub enum EventError {
    /// The registration input was invalid (e.g., empty event name).
    ///
    /// The dispatcher's tables are untouched when this is returned.
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    /// The listener id is unknown or was already cancelled.
    ///
    /// Cancelling twice is an error rather than a no-op so that callers
    /// can detect double-cancellation bugs.
    #[error("listener {0} is not registered")]
    NotFound(ListenerId),

    /// A listener action returned an error.
    #[error("handler fault: {0}")]
    Handler(#[source] HandlerError),
}

/// Result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_registration_display() {
        let err = EventError::InvalidRegistration("event name is empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid registration: event name is empty"
        );
    }

    #[test]
    fn not_found_display() {
        let err = EventError::NotFound(42);
        assert_eq!(err.to_string(), "listener 42 is not registered");
    }

    #[test]
    fn handler_fault_display() {
        let inner: HandlerError = "boom".into();
        let err = EventError::Handler(inner);
        assert_eq!(err.to_string(), "handler fault: boom");
    }

    #[test]
    fn handler_fault_exposes_source() {
        use std::error::Error as _;

        let inner: HandlerError = "boom".into();
        let err = EventError::Handler(inner);
        assert!(err.source().is_some());
    }
}
