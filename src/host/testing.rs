//! Scripted process runner for tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use super::{CommandError, CommandOutput, ProcessRunner};

/// One invocation seen by [`ScriptedRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub input: Option<String>,
    /// `None` for detached spawns
    pub timeout: Option<Duration>,
}

impl RecordedCall {
    /// Program and arguments joined by spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Replays queued results in order and records every call.
///
/// Once the queue is empty, further calls fail with `BinaryNotFound`.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<Result<CommandOutput, CommandError>>>,
    calls: RefCell<Vec<RecordedCall>>,
    spawn_error: RefCell<Option<CommandError>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a process that exits with `code`
    pub fn exits(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(CommandOutput {
            exit_code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
        self
    }

    /// Queue a successful process with `stdout`
    pub fn ok(self, stdout: &str) -> Self {
        self.exits(0, stdout, "")
    }

    /// Queue a runner-level failure
    pub fn fails(self, error: CommandError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    /// Queue a timeout
    pub fn times_out(self) -> Self {
        self.fails(CommandError::TimedOut(Duration::from_secs(1)))
    }

    /// Make the next detached spawn fail
    pub fn spawn_fails(self, error: CommandError) -> Self {
        *self.spawn_error.borrow_mut() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Command lines of all recorded calls, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(RecordedCall::command_line).collect()
    }

    fn record(&self, program: &str, args: &[&str], input: Option<&str>, timeout: Option<Duration>) {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            input: input.map(str::to_string),
            timeout,
        });
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        self.record(program, args, input, Some(timeout));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(CommandError::BinaryNotFound(program.to_string())))
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        self.record(program, args, None, None);
        match self.spawn_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
