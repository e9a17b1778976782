//! The weighted, short-circuiting event dispatcher.
//!
//! # Dispatch model
//!
//! Listeners for one event run strictly in weight order (ascending, ties
//! in registration order) and all receive the same mutable
//! [`EventArgs`]. A listener returning `Ok(false)` stops the chain. A
//! trigger on an event with no listeners is routine, not an error.
//!
//! # Re-entrancy
//!
//! Dispatch iterates a snapshot of the listener list taken when the
//! trigger starts, and the table lock is released while actions run.
//! Registering or unregistering listeners for *other* events from inside
//! a handler is supported; mutating the event currently being dispatched
//! only affects subsequent triggers.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::args::EventArgs;
use crate::errors::{EventError, HandlerError, Result};
use crate::listener::{
    DEFAULT_FILTER_WEIGHT, DEFAULT_LISTENER_WEIGHT, EventAction, Listener, ListenerId,
    ListenerInfo, next_listener_id,
};
use crate::table::EventTable;

/// Outcome of a single trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// No listener is registered for the event.
    NoListeners,
    /// Every listener ran and returned `Ok(true)`.
    Completed,
    /// A listener returned `Ok(false)`; the rest of the chain was skipped.
    ShortCircuited,
}

/// Register/unregister handlers against named events and invoke them in
/// weight order.
///
/// One dispatcher instance may be shared (via `Arc`) by many independent
/// listeners and many state machines; callers are isolated from each
/// other's presence.
#[derive(Default)]
pub struct EventDispatcher {
    table: Mutex<EventTable>,
}

impl EventDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action against `event` at an explicit weight.
    ///
    /// Lower weights run first; equal weights run in registration order.
    /// Registering the same closure twice creates two independent
    /// listeners. Fails with [`EventError::InvalidRegistration`] if
    /// `event` is empty; the table is untouched on failure.
    pub fn register<F>(
        &self,
        event: &str,
        weight: i32,
        is_filter: bool,
        action: F,
    ) -> Result<ListenerId>
    where
        F: FnMut(&mut EventArgs) -> std::result::Result<bool, HandlerError> + Send + 'static,
    {
        if event.is_empty() {
            return Err(EventError::InvalidRegistration(
                "event name is empty".to_string(),
            ));
        }

        let id = next_listener_id();
        let boxed: EventAction = Box::new(action);
        let listener = Arc::new(Listener {
            id,
            event: event.to_string(),
            weight,
            is_filter,
            action: Mutex::new(boxed),
        });
        self.table.lock().insert(listener);
        debug!(event, id, weight, is_filter, "registered listener");
        Ok(id)
    }

    /// Register a plain listener at the default listener weight.
    ///
    /// The action always continues the chain.
    pub fn listen<F>(&self, event: &str, mut f: F) -> Result<ListenerId>
    where
        F: FnMut(&mut EventArgs) + Send + 'static,
    {
        self.register(event, DEFAULT_LISTENER_WEIGHT, false, move |args| {
            f(args);
            Ok(true)
        })
    }

    /// Register a filter at the default filter weight.
    ///
    /// Filters run before default-weight listeners and conventionally
    /// rewrite the shared arguments. The action always continues the
    /// chain.
    pub fn filter<F>(&self, event: &str, mut f: F) -> Result<ListenerId>
    where
        F: FnMut(&mut EventArgs) + Send + 'static,
    {
        self.register(event, DEFAULT_FILTER_WEIGHT, true, move |args| {
            f(args);
            Ok(true)
        })
    }

    /// Cancel a listener by id.
    ///
    /// Fails with [`EventError::NotFound`] if the id is unknown or was
    /// already cancelled.
    pub fn unregister(&self, id: ListenerId) -> Result<()> {
        if self.table.lock().remove(id) {
            debug!(id, "unregistered listener");
            Ok(())
        } else {
            Err(EventError::NotFound(id))
        }
    }

    /// Cancel every listener of one event. Returns how many were removed.
    pub fn cancel_event(&self, event: &str) -> usize {
        let removed = self.table.lock().remove_event(event);
        if removed > 0 {
            debug!(event, removed, "cancelled event listeners");
        }
        removed
    }

    /// Invoke the listeners of `event` in weight order.
    ///
    /// Every listener receives the same `args` buffer; mutations made by
    /// earlier listeners (filters in particular) are visible to later
    /// ones. Stops at the first `Ok(false)` and returns
    /// [`DispatchResult::ShortCircuited`]. A listener error aborts the
    /// trigger and propagates as [`EventError::Handler`].
    pub fn trigger(&self, event: &str, args: &mut EventArgs) -> Result<DispatchResult> {
        let snapshot = self.table.lock().snapshot(event);
        if snapshot.is_empty() {
            return Ok(DispatchResult::NoListeners);
        }

        for listener in &snapshot {
            trace!(event, id = listener.id, weight = listener.weight, "dispatching");
            let keep_going = {
                let mut action = listener.action.lock();
                (*action)(args)
            }
            .map_err(EventError::Handler)?;

            if !keep_going {
                trace!(event, id = listener.id, "short-circuited");
                return Ok(DispatchResult::ShortCircuited);
            }
        }
        Ok(DispatchResult::Completed)
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.table.lock().event_len(event)
    }

    /// Total number of registered listeners across all events.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.table.lock().len()
    }

    /// Information about every registered listener, ordered by id.
    #[must_use]
    pub fn list_all(&self) -> Vec<ListenerInfo> {
        self.table.lock().infos()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.total_listeners())
            .finish()
    }
}
