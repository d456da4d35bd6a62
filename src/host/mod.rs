//! Host module for process management and command execution

pub mod command_runner;

#[cfg(test)]
pub mod testing;

pub use command_runner::{CommandError, CommandOutput, CommandRunner, ProcessRunner};
