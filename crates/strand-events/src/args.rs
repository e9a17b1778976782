//! The shared argument buffer passed through a dispatch chain.
//!
//! One [`EventArgs`] value is built per `trigger` call and handed to every
//! listener in weight order. There are no per-listener copies: a filter
//! that rewrites a value changes what every later listener observes.
//!
//! Listeners handling suspending lifecycle events (state Enter/Exit) do
//! not block the dispatch; they push a [`Routine`] via [`EventArgs::defer`]
//! and the triggering party drains and drives the collected routines over
//! subsequent frames.

use serde_json::Value;

use crate::routine::Routine;

/// Mutable positional arguments plus deferred work collected during one
/// dispatch.
#[derive(Default)]
pub struct EventArgs {
    values: Vec<Value>,
    deferred: Vec<Box<dyn Routine>>,
}

impl EventArgs {
    /// Build an argument buffer from positional values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            deferred: Vec::new(),
        }
    }

    /// An empty argument buffer, for events that carry no payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The value at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Overwrite the value at `index`.
    ///
    /// The mutation is visible to every listener dispatched after the
    /// caller within the same trigger. Out-of-range indexes are ignored.
    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// All positional values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Mutable access to all positional values.
    pub fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    /// Number of positional values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the buffer carries no positional values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Hand a routine back to the code that triggered this event.
    ///
    /// Dispatch itself stays synchronous; the routine is driven to
    /// completion by the triggering party on later frames.
    pub fn defer(&mut self, routine: impl Routine + 'static) {
        self.deferred.push(Box::new(routine));
    }

    /// Drain the routines deferred by listeners during this dispatch.
    #[must_use]
    pub fn take_deferred(&mut self) -> Vec<Box<dyn Routine>> {
        std::mem::take(&mut self.deferred)
    }

    /// Number of routines currently deferred.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }
}

impl From<Vec<Value>> for EventArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl std::fmt::Debug for EventArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventArgs")
            .field("values", &self.values)
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::{FrameDelay, RoutineStep};
    use serde_json::json;

    #[test]
    fn new_holds_values_in_order() {
        let args = EventArgs::new(vec![json!(1), json!("two")]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(0), Some(&json!(1)));
        assert_eq!(args.get(1), Some(&json!("two")));
    }

    #[test]
    fn empty_has_no_values() {
        let args = EventArgs::empty();
        assert!(args.is_empty());
        assert_eq!(args.get(0), None);
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut args = EventArgs::new(vec![json!(10)]);
        args.set(0, json!(20));
        assert_eq!(args.get(0), Some(&json!(20)));
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut args = EventArgs::empty();
        args.set(3, json!(1));
        assert!(args.is_empty());
    }

    #[test]
    fn defer_collects_routines() {
        let mut args = EventArgs::empty();
        args.defer(FrameDelay::new(1));
        args.defer(FrameDelay::new(2));
        assert_eq!(args.deferred_len(), 2);

        let mut routines = args.take_deferred();
        assert_eq!(routines.len(), 2);
        assert_eq!(args.deferred_len(), 0);
        assert_eq!(routines[0].resume(), RoutineStep::Yielded);
    }

    #[test]
    fn debug_reports_deferred_count() {
        let mut args = EventArgs::empty();
        args.defer(FrameDelay::new(0));
        let debug = format!("{args:?}");
        assert!(debug.contains("EventArgs"));
        assert!(debug.contains("deferred"));
    }
}
