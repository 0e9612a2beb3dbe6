//! Reachability monitoring
//!
//! Continuous ping probing and per-host debounced state reporting.

pub mod host;
pub mod probe;
pub mod sink;

// Public re-exports
pub use host::HostMonitor;
pub use probe::ReachabilityProbe;
pub use sink::{EventSink, StatusBoard};
