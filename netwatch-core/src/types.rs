//! Identity and state primitives shared by all monitored targets
//!
//! Defines the tri-valued link state reported to event sinks and
//! provides thread-safe state tracking.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Key identifying a monitored target: display-group index plus name.
///
/// Keys are unique across the whole configuration; validation rejects a
/// second target with the same `(group, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    /// Index of the display group the target was declared in
    pub group: usize,
    /// Target name as declared in the configuration
    pub name: String,
}

impl EntityId {
    /// Create a new entity id
    pub fn new(group: usize, name: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

/// Reachability signal of a monitored target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Target is reachable (VPN: connected)
    Up,

    /// Target is unreachable (VPN: disconnected)
    Down,

    /// No reading yet, or a transition is in progress
    #[default]
    Unknown,
}

impl LinkState {
    /// Map a raw probe reading onto a link state
    pub fn from_reading(reachable: bool) -> Self {
        if reachable {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Up => write!(f, "up"),
            LinkState::Down => write!(f, "down"),
            LinkState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Thread-safe link state wrapper
///
/// One writer (the owning monitor task) and any number of readers; VPN
/// controllers poll the handles of their internet and tunnel monitors.
#[derive(Debug, Clone, Default)]
pub struct SharedLinkState(Arc<Mutex<LinkState>>);

impl SharedLinkState {
    /// Create a new shared link state, initialized to `Unknown`
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(LinkState::default())))
    }

    /// Get the current link state
    pub fn get(&self) -> LinkState {
        *self.0.lock().unwrap()
    }

    /// Set the link state
    pub fn set(&self, state: LinkState) {
        *self.0.lock().unwrap() = state;
    }

    /// Check if the state is currently `Up`
    pub fn is_up(&self) -> bool {
        matches!(self.get(), LinkState::Up)
    }
}
