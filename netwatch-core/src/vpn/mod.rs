//! VPN link control
//!
//! Reconciles desired vs. actual tunnel state and runs the configured
//! connect/disconnect commands.

pub mod command;
pub mod controller;
pub mod netinfo;

// Public re-exports
pub use controller::{VpnController, VpnPhase, VpnTiming};
