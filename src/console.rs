//! Console presentation of state transitions
//!
//! Stands in for a full display layer: every transition is printed as a
//! timestamped line and recorded on the shared status board.

use std::sync::Arc;

use chrono::Local;
use colored::Colorize;

use netwatch_core::monitor::{EventSink, StatusBoard};
use netwatch_core::types::{EntityId, LinkState};

/// Prints each transition and records it on the status board
pub struct ConsoleSink {
    board: Arc<StatusBoard>,
}

impl ConsoleSink {
    pub fn new(board: Arc<StatusBoard>) -> Self {
        Self { board }
    }
}

impl EventSink for ConsoleSink {
    fn notify(&self, source: &EntityId, new_state: LinkState) {
        self.board.notify(source, new_state);

        let status = match new_state {
            LinkState::Up => "UP".green().bold(),
            LinkState::Down => "DOWN".red().bold(),
            LinkState::Unknown => "....".yellow(),
        };
        println!(
            "{} {:<24} {}",
            Local::now().format("%H:%M:%S"),
            source.to_string(),
            status
        );
    }
}
