//! Event delivery to the presentation layer
//!
//! Monitors report state transitions through an [`EventSink`]; the core
//! ships [`StatusBoard`], a latest-state map, as the reference sink.
//! Display layers wrap or replace it.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{EntityId, LinkState};

/// Receives `(source, new_state)` notifications from monitor tasks
///
/// Deliveries are fire-and-forget. Implementations may hold a short lock
/// to serialize updates but must never block a monitor beyond that;
/// events from one source arrive in emission order.
pub trait EventSink: Send + Sync {
    fn notify(&self, source: &EntityId, new_state: LinkState);
}

/// Latest-state map shared by all monitors
#[derive(Debug, Default)]
pub struct StatusBoard {
    states: Mutex<HashMap<EntityId, LinkState>>,
}

impl StatusBoard {
    /// Create an empty status board
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest reported state of `id`, `Unknown` if nothing was reported yet
    pub fn state_of(&self, id: &EntityId) -> LinkState {
        self.states
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    /// All reported states, ordered by group and name
    pub fn snapshot(&self) -> Vec<(EntityId, LinkState)> {
        let mut entries: Vec<_> = self
            .states
            .lock()
            .unwrap()
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.group.cmp(&b.group).then_with(|| a.name.cmp(&b.name)));
        entries
    }
}

impl EventSink for StatusBoard {
    fn notify(&self, source: &EntityId, new_state: LinkState) {
        self.states.lock().unwrap().insert(source.clone(), new_state);
    }
}
