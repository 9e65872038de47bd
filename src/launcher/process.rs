//! External process spawning.

use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::launcher::LaunchError;

/// How long a detached launch is watched for an immediate failure.
const STARTUP_GRACE: Duration = Duration::from_millis(200);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs external commands for the launcher.
pub trait ProcessSpawner: Send + Sync + std::fmt::Debug {
    /// Run `program` with `args` to completion, failing if it cannot start or
    /// exits non-zero.
    fn spawn(&self, program: &str, args: &[String]) -> Result<(), LaunchError>;

    /// Start `program` with `args` and return once it is running.
    ///
    /// Used for commands that are the browser itself and may live for hours.
    /// Fails if the program cannot start or exits non-zero right away.
    fn start(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        self.spawn(program, args)
    }
}

/// Spawner backed by `std::process::Command`.
///
/// Stdout is inherited so browser chatter lands next to our own log lines.
/// `spawn` captures stderr for the error report; `start` inherits it, since
/// nobody would drain a pipe for a long-lived browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSpawner;

impl ProcessSpawner for CommandSpawner {
    fn spawn(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(LaunchError::ExitStatus {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn start(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let deadline = Instant::now() + STARTUP_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(LaunchError::ExitStatus {
                        program: program.to_string(),
                        status: status.to_string(),
                        stderr: String::new(),
                    })
                }
                Ok(None) if Instant::now() >= deadline => break,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    tracing::warn!(program, error = %e, "Cannot poll launched process");
                    break;
                }
            }
        }

        tracing::debug!(program, pid = child.id(), "Browser process detached");
        reap(child, program);
        Ok(())
    }
}

/// Wait for `child` on a background thread so it does not linger as a zombie.
fn reap(mut child: Child, program: &str) {
    let spawned = thread::Builder::new()
        .name("reap-browser".to_string())
        .spawn(move || {
            let _ = child.wait();
        });
    if let Err(e) = spawned {
        tracing::warn!(program, error = %e, "Cannot reap launched process");
    }
}
