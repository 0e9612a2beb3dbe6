//! Connect/disconnect command execution
//!
//! Command lines are split with POSIX shell-word rules (quoted segments
//! honored) and run with all standard streams discarded; only the exit
//! status matters to the caller.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::CommandError;

/// Run `cmdline`, returning true iff it exited with status 0
///
/// The command runs on the calling task and blocks it until the
/// subprocess exits; controllers therefore run commands on their own
/// task so a slow script cannot stall other monitors.
pub async fn run_command(cmdline: &str) -> Result<bool, CommandError> {
    let words = shell_words::split(cmdline)?;
    let (program, args) = words.split_first().ok_or(CommandError::EmptyCommand)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    let status = cmd
        .status()
        .await
        .map_err(|e| CommandError::SpawnFailed {
            program: program.clone(),
            reason: e.to_string(),
        })?;

    debug!(command = cmdline, code = ?status.code(), "command finished");
    Ok(status.success())
}
