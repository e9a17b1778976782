//! Listener records and registration defaults.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::args::EventArgs;
use crate::errors::HandlerError;

/// Process-unique listener handle, assigned at registration and used for
/// cancellation. Stable until the listener is unregistered.
pub type ListenerId = u64;

/// Boxed listener action.
///
/// Receives the shared argument buffer and returns the continuation
/// signal: `Ok(true)` lets dispatch proceed to the next listener,
/// `Ok(false)` short-circuits the chain, `Err` aborts the trigger.
pub type EventAction = Box<dyn FnMut(&mut EventArgs) -> Result<bool, HandlerError> + Send>;

/// Default weight for plain listeners. Lower weights run first.
pub const DEFAULT_LISTENER_WEIGHT: i32 = 1000;

/// Default weight for filters, chosen so filters run before plain
/// listeners and can rewrite the arguments those listeners observe.
pub const DEFAULT_FILTER_WEIGHT: i32 = -1000;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_listener_id() -> ListenerId {
    NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed)
}

/// A registered handler bound to one event name.
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) event: String,
    pub(crate) weight: i32,
    pub(crate) is_filter: bool,
    /// The action lives behind its own lock so it stays invocable from a
    /// shared dispatcher handle while the table lock is released.
    pub(crate) action: Mutex<EventAction>,
}

impl Listener {
    pub(crate) fn info(&self) -> ListenerInfo {
        ListenerInfo {
            id: self.id,
            event: self.event.clone(),
            weight: self.weight,
            is_filter: self.is_filter,
        }
    }
}

/// Information about a registered listener (for listing/inspection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerInfo {
    /// Cancellation handle.
    pub id: ListenerId,
    /// Event name the listener is bound to.
    pub event: String,
    /// Dispatch weight; lower runs first.
    pub weight: i32,
    /// Whether the listener was registered as a filter. Informational:
    /// filters follow the same dispatch mechanics, the tag documents that
    /// they mutate the shared arguments rather than consume them.
    pub is_filter: bool,
}
