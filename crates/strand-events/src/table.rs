//! Event name → ordered listener list mapping.
//!
//! Pure data structure: maintains weight-ascending order with stable ties
//! (registration order) and an id index for cancellation. All dispatch
//! behavior lives in the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use crate::listener::{Listener, ListenerId, ListenerInfo};

#[derive(Default)]
pub(crate) struct EventTable {
    /// Listeners keyed by event name, weight-ascending, stable on ties.
    events: HashMap<String, Vec<Arc<Listener>>>,
    /// Cancellation index: listener id → owning event name.
    index: HashMap<ListenerId, String>,
}

impl EventTable {
    /// Insert a listener and restore weight order.
    ///
    /// `Vec::sort_by_key` is stable, so equal weights keep registration
    /// order and the new entry lands after its peers.
    pub(crate) fn insert(&mut self, listener: Arc<Listener>) {
        let _ = self.index.insert(listener.id, listener.event.clone());
        let list = self.events.entry(listener.event.clone()).or_default();
        list.push(listener);
        list.sort_by_key(|l| l.weight);
    }

    /// Remove a listener by id. Returns `false` if the id is unknown.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some(event) = self.index.remove(&id) else {
            return false;
        };
        if let Some(list) = self.events.get_mut(&event) {
            list.retain(|l| l.id != id);
            if list.is_empty() {
                let _ = self.events.remove(&event);
            }
        }
        true
    }

    /// Remove every listener of one event. Returns how many were removed.
    pub(crate) fn remove_event(&mut self, event: &str) -> usize {
        let Some(list) = self.events.remove(event) else {
            return 0;
        };
        for listener in &list {
            let _ = self.index.remove(&listener.id);
        }
        list.len()
    }

    /// Clone of the listener list for `event`, taken in dispatch order.
    ///
    /// Triggers iterate this snapshot, so table mutation from inside a
    /// handler affects subsequent triggers only.
    pub(crate) fn snapshot(&self, event: &str) -> Vec<Arc<Listener>> {
        self.events.get(event).cloned().unwrap_or_default()
    }

    pub(crate) fn event_len(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    pub(crate) fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub(crate) fn infos(&self) -> Vec<ListenerInfo> {
        let mut infos: Vec<ListenerInfo> = self
            .events
            .values()
            .flat_map(|list| list.iter().map(|l| l.info()))
            .collect();
        infos.sort_by_key(|info| info.id);
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn make_listener(id: ListenerId, event: &str, weight: i32) -> Arc<Listener> {
        Arc::new(Listener {
            id,
            event: event.to_string(),
            weight,
            is_filter: false,
            action: Mutex::new(Box::new(|_| Ok(true))),
        })
    }

    #[test]
    fn insert_orders_by_weight_ascending() {
        let mut table = EventTable::default();
        table.insert(make_listener(1, "e", 30));
        table.insert(make_listener(2, "e", 10));
        table.insert(make_listener(3, "e", 20));

        let order: Vec<ListenerId> = table.snapshot("e").iter().map(|l| l.id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn equal_weights_keep_registration_order() {
        let mut table = EventTable::default();
        table.insert(make_listener(1, "e", 5));
        table.insert(make_listener(2, "e", 5));
        table.insert(make_listener(3, "e", 5));

        let order: Vec<ListenerId> = table.snapshot("e").iter().map(|l| l.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn remove_unknown_id_returns_false() {
        let mut table = EventTable::default();
        assert!(!table.remove(99));
    }

    #[test]
    fn remove_clears_id_index() {
        let mut table = EventTable::default();
        table.insert(make_listener(1, "e", 0));
        assert!(table.remove(1));
        assert!(!table.remove(1));
        assert_eq!(table.event_len("e"), 0);
    }

    #[test]
    fn remove_event_drops_all_its_listeners() {
        let mut table = EventTable::default();
        table.insert(make_listener(1, "a", 0));
        table.insert(make_listener(2, "a", 0));
        table.insert(make_listener(3, "b", 0));

        assert_eq!(table.remove_event("a"), 2);
        assert_eq!(table.len(), 1);
        assert!(!table.remove(1));
        assert!(table.remove(3));
    }

    #[test]
    fn snapshot_of_unknown_event_is_empty() {
        let table = EventTable::default();
        assert!(table.snapshot("missing").is_empty());
    }

    #[test]
    fn infos_lists_every_listener() {
        let mut table = EventTable::default();
        table.insert(make_listener(2, "a", 0));
        table.insert(make_listener(1, "b", 0));
        let infos = table.infos();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, 1);
        assert_eq!(infos[1].id, 2);
    }
}
