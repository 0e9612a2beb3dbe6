//! Integration tests for the VPN controller decision flow
//!
//! Drives controllers tick by tick with synthetic address sets and with
//! scripted commands that log their invocations to a scratch file, so
//! command storms and missing launches are both observable.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use netwatch_core::config::{VpnMode, VpnTarget};
use netwatch_core::monitor::EventSink;
use netwatch_core::types::{EntityId, LinkState, SharedLinkState};
use netwatch_core::vpn::{VpnController, VpnPhase, VpnTiming};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(EntityId, LinkState)>>,
}

impl RecordingSink {
    fn states(&self) -> Vec<LinkState> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, state)| *state)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, source: &EntityId, new_state: LinkState) {
        self.events
            .lock()
            .unwrap()
            .push((source.clone(), new_state));
    }
}

fn fast_timing() -> VpnTiming {
    VpnTiming {
        check_interval: Duration::from_millis(5),
        command_wait: Duration::from_millis(400),
        internet_checks: 3,
        vpn_pings: 2,
    }
}

fn ips(addresses: &[&str]) -> HashSet<String> {
    addresses.iter().map(|ip| ip.to_string()).collect()
}

fn target(mode: VpnMode, connect: &str, disconnect: &str) -> VpnTarget {
    VpnTarget {
        name: "OFFICE".to_string(),
        assigned_ip: "172.16.".to_string(),
        exclude_ips: vec!["10.0.".to_string()],
        ping_ip: None,
        connect: connect.to_string(),
        disconnect: disconnect.to_string(),
        mode,
    }
}

/// Command line appending one marker line to `log` on every invocation
fn logging_command(marker: &str, log: &Path) -> String {
    format!("sh -c 'echo {} >> {}'", marker, log.display())
}

fn line_count(log: &Path) -> usize {
    std::fs::read_to_string(log)
        .map(|contents| contents.lines().count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_excluded_ip_settles_disconnected_without_commands() {
    // Given: auto mode, an excluded prefix on a current address, tunnel down
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("cmd.log");
    let sink = Arc::new(RecordingSink::default());
    let target = target(
        VpnMode::Auto,
        &logging_command("connect", &log),
        &logging_command("disconnect", &log),
    );
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        None,
        sink.clone(),
    );

    // When: one tick with 10.0.5.2 present
    controller.tick_with(&ips(&["10.0.5.2"]), true).await;

    // Then: desired and actual agree on "down", no command runs
    assert_eq!(controller.phase(), Some(VpnPhase::Disconnected));
    assert_eq!(sink.states(), vec![LinkState::Down]);
    assert_eq!(line_count(&log), 0, "no command expected");

    // And: a repeated identical tick stays silent
    controller.tick_with(&ips(&["10.0.5.2"]), true).await;
    assert_eq!(sink.states(), vec![LinkState::Down]);
}

#[tokio::test]
#[cfg(unix)]
async fn test_connect_flow_reaches_connected() {
    // Given: auto mode, no excluded address, internet healthy
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("cmd.log");
    let sink = Arc::new(RecordingSink::default());
    let target = target(
        VpnMode::Auto,
        &logging_command("connect", &log),
        &logging_command("disconnect", &log),
    );
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        None,
        sink.clone(),
    );

    // When: the tunnel is not up yet
    controller.tick_with(&ips(&["192.168.1.5"]), true).await;

    // Then: transition is announced and the connect command runs once
    assert_eq!(controller.phase(), Some(VpnPhase::Connecting));
    assert_eq!(sink.states(), vec![LinkState::Unknown]);
    assert_eq!(line_count(&log), 1);

    // When: the connect script brought the tunnel address up
    controller
        .tick_with(&ips(&["192.168.1.5", "172.16.0.9"]), true)
        .await;

    // Then: the controller settles without another command
    assert_eq!(controller.phase(), Some(VpnPhase::Connected));
    assert_eq!(sink.states(), vec![LinkState::Unknown, LinkState::Up]);
    assert_eq!(line_count(&log), 1);
}

#[tokio::test]
#[cfg(unix)]
async fn test_cooldown_yields_exactly_one_command() {
    // Given: a desired-state mismatch that persists across ticks
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("cmd.log");
    let sink = Arc::new(RecordingSink::default());
    let target = target(
        VpnMode::Auto,
        &logging_command("connect", &log),
        &logging_command("disconnect", &log),
    );
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        None,
        sink.clone(),
    );

    // When: two ticks happen within the cooldown window
    controller.tick_with(&ips(&["192.168.1.5"]), true).await;
    controller.tick_with(&ips(&["192.168.1.5"]), true).await;

    // Then: only the first tick launched the command
    assert_eq!(line_count(&log), 1);

    // When: the cooldown elapses
    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.tick_with(&ips(&["192.168.1.5"]), true).await;

    // Then: the command is retried
    assert_eq!(line_count(&log), 2);
}

#[tokio::test]
#[cfg(unix)]
async fn test_disconnect_mode_never_connects() {
    // Given: forced disconnect mode with the tunnel currently up
    let dir = tempfile::tempdir().unwrap();
    let connect_log = dir.path().join("connect.log");
    let disconnect_log = dir.path().join("disconnect.log");
    let sink = Arc::new(RecordingSink::default());
    let target = target(
        VpnMode::Disconnect,
        &logging_command("connect", &connect_log),
        &logging_command("disconnect", &disconnect_log),
    );
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        None,
        sink.clone(),
    );

    // When: ticking with the tunnel address present, internet state irrelevant
    controller.tick_with(&ips(&["172.16.0.9"]), false).await;

    // Then: a disconnect launches, a connect never does
    assert_eq!(controller.phase(), Some(VpnPhase::Disconnecting));
    assert_eq!(line_count(&disconnect_log), 1);
    assert_eq!(line_count(&connect_log), 0);

    // When: the tunnel address is gone
    controller.tick_with(&ips(&["192.168.1.5"]), false).await;

    // Then: the controller settles on disconnected
    assert_eq!(controller.phase(), Some(VpnPhase::Disconnected));
    assert_eq!(line_count(&connect_log), 0);
}

#[tokio::test]
#[cfg(unix)]
async fn test_connect_mode_ignores_exclude_list() {
    // Given: forced connect mode and an excluded address present
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("cmd.log");
    let sink = Arc::new(RecordingSink::default());
    let target = target(
        VpnMode::Connect,
        &logging_command("connect", &log),
        &logging_command("disconnect", &log),
    );
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        None,
        sink.clone(),
    );

    // When: ticking while 10.0.5.2 (excluded prefix) is a local address
    controller.tick_with(&ips(&["10.0.5.2"]), true).await;

    // Then: the connect launches anyway
    assert_eq!(controller.phase(), Some(VpnPhase::Connecting));
    assert_eq!(line_count(&log), 1);
}

#[tokio::test]
async fn test_connect_is_held_without_internet() {
    // Given: auto mode wants the tunnel up but upstream is unhealthy
    let sink = Arc::new(RecordingSink::default());
    let target = target(VpnMode::Auto, "true", "true");
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        None,
        sink.clone(),
    );

    // When: ticking with internet_ok = false
    controller.tick_with(&ips(&["192.168.1.5"]), false).await;

    // Then: nothing happens this tick
    assert_eq!(controller.phase(), None);
    assert!(sink.states().is_empty());
}

#[tokio::test]
async fn test_internet_check_short_circuits_on_first_negative() {
    // Given: an internet monitor that has never reported Up
    let internet = SharedLinkState::new();
    let sink = Arc::new(RecordingSink::default());
    let target = target(VpnMode::Auto, "true", "true");
    let timing = VpnTiming {
        check_interval: Duration::from_millis(50),
        ..fast_timing()
    };
    let controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        timing,
        Some(internet.clone()),
        None,
        sink,
    );

    // When: evaluating the precondition
    let start = Instant::now();
    let healthy = controller.internet_connected().await;

    // Then: it fails without waiting for the remaining checks
    assert!(!healthy);
    assert!(
        start.elapsed() < Duration::from_millis(40),
        "first negative read must short-circuit"
    );

    // When: the monitor reports Up
    internet.set(LinkState::Up);
    let start = Instant::now();
    let healthy = controller.internet_connected().await;

    // Then: all three spaced reads are taken
    assert!(healthy);
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
#[cfg(unix)]
async fn test_tunnel_liveness_gates_tunnel_up() {
    // Given: the tunnel address is assigned but the liveness probe is down
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("cmd.log");
    let tunnel = SharedLinkState::new();
    tunnel.set(LinkState::Down);
    let sink = Arc::new(RecordingSink::default());
    let target = VpnTarget {
        ping_ip: Some("172.16.0.1".to_string()),
        ..target(
            VpnMode::Connect,
            &logging_command("connect", &log),
            &logging_command("disconnect", &log),
        )
    };
    let mut controller = VpnController::new(
        EntityId::new(1, "OFFICE"),
        &target,
        fast_timing(),
        None,
        Some(tunnel.clone()),
        sink.clone(),
    );

    // When: ticking with the assigned prefix present but liveness down
    controller.tick_with(&ips(&["172.16.0.9"]), true).await;

    // Then: the tunnel does not count as up, a connect is attempted
    assert_eq!(controller.phase(), Some(VpnPhase::Connecting));
    assert_eq!(line_count(&log), 1);

    // When: the liveness probe reports Up
    tunnel.set(LinkState::Up);
    controller.tick_with(&ips(&["172.16.0.9"]), true).await;

    // Then: the controller settles on connected
    assert_eq!(controller.phase(), Some(VpnPhase::Connected));
    assert_eq!(sink.states().last(), Some(&LinkState::Up));
}
