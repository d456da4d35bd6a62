//! Command Runner
//!
//! Executes external CLI commands with output capture and a hard deadline.
//! A call either finishes on its own or is killed once its timeout expires.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often a running child is polled for its exit status
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout (lossy UTF-8)
    pub stdout: String,
    /// Captured stderr (lossy UTF-8)
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Command runner errors
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Binary '{0}' not found. Install it or add to PATH.")]
    BinaryNotFound(String),

    #[error("Failed to launch process: {0}")]
    LaunchFailed(String),

    #[error("Command timed out after {}s", .0.as_secs_f32())]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Seam between the Ollama facade and the operating system.
///
/// Each call is blocking and bounded; implementations never leave a child
/// running past `timeout` except through `spawn_detached`.
pub trait ProcessRunner {
    /// Run `program` to completion, optionally feeding `input` on stdin.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;

    /// Start `program` in the background and hand it off to the OS.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;
}

/// Runs real processes via `std::process`
#[derive(Debug, Clone)]
pub struct CommandRunner {
    /// Environment variables to add
    env_additions: HashMap<String, String>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            env_additions: HashMap::new(),
        }
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_additions.insert(key.into(), value.into());
        self
    }

    /// Find a binary in PATH
    pub fn which(binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }

    /// Resolve a program name to an executable path.
    ///
    /// Existing paths are taken as is, bare names are looked up in PATH.
    fn resolve(binary: &str) -> Result<PathBuf, CommandError> {
        let path = Path::new(binary);
        if path.components().count() > 1 && path.exists() {
            return Ok(path.to_path_buf());
        }
        Self::which(binary).ok_or_else(|| CommandError::BinaryNotFound(binary.to_string()))
    }

    fn command(&self, program: &str, args: &[&str]) -> Result<Command, CommandError> {
        let mut cmd = Command::new(Self::resolve(program)?);
        cmd.args(args);
        cmd.envs(&self.env_additions);
        Ok(cmd)
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let mut cmd = self.command(program, args)?;
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| CommandError::LaunchFailed(e.to_string()))?;

        // The writer owns stdin and drops it when done, which signals EOF.
        // It is never joined: once the child is gone the write fails on its own.
        if let (Some(text), Some(mut stdin)) = (input, child.stdin.take()) {
            let text = text.to_owned();
            thread::spawn(move || {
                if let Err(e) = stdin.write_all(text.as_bytes()) {
                    tracing::debug!("Failed to write command input: {}", e);
                }
            });
        }
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let started = Instant::now();
        let deadline = started + timeout;
        let Some(status) = wait_until(&mut child, deadline)? else {
            // Pipe threads are left to finish on their own; a grandchild may
            // still hold the write ends open.
            tracing::debug!(
                program,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Command killed after timeout"
            );
            return Err(CommandError::TimedOut(timeout));
        };

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout: collect(stdout, deadline),
            stderr: collect(stderr, deadline),
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let mut cmd = self.command(program, args)?;
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        // Own process group, so a terminal Ctrl-C aimed at us does not reach it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| CommandError::LaunchFailed(e.to_string()))?;
        let pid = child.id();
        tracing::debug!(program, pid, "Spawned detached process");

        // Reap the child if it exits while we are still alive
        thread::spawn(move || {
            if let Ok(status) = child.wait() {
                tracing::debug!(pid, ?status, "Detached process exited");
            }
        });
        Ok(())
    }
}

/// Poll `child` until it exits or `deadline` passes.
///
/// Returns `None` after killing and reaping a child that outlived the deadline.
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>, CommandError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Drain a pipe on its own thread; the text arrives on the returned channel
fn spawn_reader<R>(source: Option<R>) -> Option<Receiver<String>>
where
    R: Read + Send + 'static,
{
    source.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Text drained from a pipe, or empty if it is still open at `deadline`.
///
/// A grandchild that inherited the pipe keeps it open after the child exits.
fn collect(reader: Option<Receiver<String>>, deadline: Instant) -> String {
    let Some(rx) = reader else {
        return String::new();
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => text,
        Err(_) => {
            tracing::debug!("Output pipe still open at deadline, dropping it");
            String::new()
        }
    }
}
