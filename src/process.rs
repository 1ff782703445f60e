//! Bounded subprocess execution for section providers.
//!
//! The orchestrator never times sections out, so every external command a
//! provider runs goes through [`run_command`] with its own wall-clock limit.
use crate::util::{millis, truncate_string};
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const MAX_ERROR_BYTES: usize = 2048;

/// Captured result of a command that ran to completion.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Trimmed stdout, or an error carrying trimmed stderr on non-zero exit.
    pub fn into_stdout(self) -> Result<String> {
        if self.success {
            Ok(self.stdout.trim().to_string())
        } else {
            Err(anyhow!("{}", truncate_string(self.stderr.trim(), MAX_ERROR_BYTES)))
        }
    }
}

/// Run `program` with `args`, killing it once `timeout` elapses.
///
/// Spawn failures and timeouts are errors; a non-zero exit is reported through
/// [`CommandOutput::success`].
pub fn run_command(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let start = Instant::now();
    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawn {program}"))?;

    // Drain both pipes while waiting so large outputs cannot block the child.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("wait for {program}"))?
        {
            break status;
        }
        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!(
                "{program} timed out after {}s",
                timeout.as_secs_f32()
            ));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(stdout);
    let stderr = collect(stderr);
    tracing::trace!(
        program,
        elapsed_ms = millis(start.elapsed()),
        code = ?status.code(),
        "command finished"
    );

    Ok(CommandOutput {
        success: status.success(),
        stdout,
        stderr,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
