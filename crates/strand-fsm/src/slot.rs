//! Per-sub-state bookkeeping.

use crate::types::{CallbackKind, event_name};

/// One declared sub-state: its name plus a cache of the synthesized
/// dispatcher event names for each callback kind.
///
/// The cache is populated lazily on first use and invalidated whenever
/// the sub-state is entered again, in case the surrounding configuration
/// changed between visits.
#[derive(Debug, Clone)]
pub(crate) struct StateSlot {
    name: String,
    triggers: [Option<String>; 6],
}

impl StateSlot {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: [const { None }; 6],
        }
    }

    /// The synthesized event name for `kind`, computed once per visit.
    pub(crate) fn trigger_name(&mut self, prefix: &str, domain: &str, kind: CallbackKind) -> &str {
        let slot = &mut self.triggers[kind.index()];
        if slot.is_none() {
            *slot = Some(event_name(prefix, domain, &self.name, kind));
        }
        slot.as_deref().unwrap_or_default()
    }

    /// Drop every cached name; the next lookup re-resolves.
    pub(crate) fn invalidate(&mut self) {
        self.triggers = [const { None }; 6];
    }
}
