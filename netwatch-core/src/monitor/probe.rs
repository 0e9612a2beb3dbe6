//! Continuous ICMP echo probing of a single address
//!
//! Each probe wraps one long-lived `ping` process and turns every reply
//! line into a boolean reachability reading. The process is spawned once,
//! not per check; a reading becomes available whenever ping prints a line.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{trace, warn};

use crate::error::ProbeError;

/// Continuous reachability probe for one address
pub struct ReachabilityProbe {
    address: String,
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl ReachabilityProbe {
    /// Spawn the long-lived ping process for `address`
    pub fn spawn(address: &str) -> Result<Self, ProbeError> {
        let (child, lines) = spawn_ping(address)?;
        Ok(Self {
            address: address.to_string(),
            child,
            lines,
        })
    }

    /// Wait for the next echo result
    ///
    /// Returns true iff the reply line carries a TTL marker, meaning an
    /// echo reply arrived within the per-probe timeout. If the ping
    /// process died or its output failed to read, the probe restarts it
    /// and reports a single error for this reading; the caller decides
    /// how to treat the gap.
    pub async fn read_next(&mut self) -> Result<bool, ProbeError> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                trace!(address = %self.address, line, "ping output");
                Ok(is_reply_alive(line))
            }
            Ok(None) => {
                warn!(address = %self.address, "ping process closed its output, restarting");
                self.respawn()?;
                Err(ProbeError::StreamClosed {
                    address: self.address.clone(),
                })
            }
            Err(e) => {
                warn!(address = %self.address, error = %e, "failed to read ping output, restarting");
                self.respawn()?;
                Err(ProbeError::ReadFailed(e))
            }
        }
    }

    /// Replace a dead ping process with a fresh one
    fn respawn(&mut self) -> Result<(), ProbeError> {
        let _ = self.child.start_kill();
        let (child, lines) = spawn_ping(&self.address)?;
        self.child = child;
        self.lines = lines;
        Ok(())
    }
}

/// A reply line indicates a live host iff ping printed a TTL marker for it
fn is_reply_alive(line: &str) -> bool {
    line.contains("ttl") || line.contains("TTL")
}

/// Platform ping arguments: continuous mode, 1-byte payload, 1s reply
/// timeout. On Linux `-O` makes ping report missed replies as well, so
/// every probe interval yields a line either way.
fn ping_args() -> &'static [&'static str] {
    #[cfg(windows)]
    {
        &["-w", "100", "-l", "1", "-t"]
    }
    #[cfg(not(windows))]
    {
        &["-n", "-W", "1", "-s", "1", "-O"]
    }
}

fn spawn_ping(address: &str) -> Result<(Child, Lines<BufReader<ChildStdout>>), ProbeError> {
    let mut cmd = Command::new("ping");
    cmd.args(ping_args())
        .arg(address)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    let mut child = cmd.spawn().map_err(|e| ProbeError::SpawnFailed {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    let stdout = child.stdout.take().ok_or_else(|| ProbeError::SpawnFailed {
        address: address.to_string(),
        reason: "stdout not captured".to_string(),
    })?;

    Ok((child, BufReader::new(stdout).lines()))
}
