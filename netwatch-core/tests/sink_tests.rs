//! Integration tests for event delivery and state-map serialization

use std::sync::Arc;
use std::thread;

use netwatch_core::monitor::{EventSink, StatusBoard};
use netwatch_core::types::{EntityId, LinkState};

#[test]
fn test_events_from_one_source_apply_in_order() {
    let board = StatusBoard::new();
    let id = EntityId::new(0, "GATEWAY");

    board.notify(&id, LinkState::Up);
    board.notify(&id, LinkState::Down);
    board.notify(&id, LinkState::Unknown);

    assert_eq!(board.state_of(&id), LinkState::Unknown);
}

#[test]
fn test_concurrent_sources_do_not_corrupt_the_map() {
    // Given: one board shared by several monitor threads
    let board = Arc::new(StatusBoard::new());

    // When: each source hammers the board with flapping states
    let handles: Vec<_> = (0..4)
        .map(|group| {
            let board = board.clone();
            thread::spawn(move || {
                let id = EntityId::new(group, "HOST");
                for _ in 0..100 {
                    board.notify(&id, LinkState::Down);
                    board.notify(&id, LinkState::Up);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Then: every source ends on its last emitted state
    for group in 0..4 {
        assert_eq!(board.state_of(&EntityId::new(group, "HOST")), LinkState::Up);
    }
    assert_eq!(board.snapshot().len(), 4);
}
