//! Ollama process facade
//!
//! Every operation is one (or a short, fixed sequence of) blocking external
//! command invocation(s) with a timeout. Failures are logged and folded into
//! the return value; nothing here returns an error to the caller.

mod generate;
mod models;
pub mod parse;
mod server;

use std::time::Duration;

use crate::core::{
    BenignClassifier, CommandOutcome, OperationKind, OutcomeKind, PatternError, Platform,
};
use crate::host::{CommandError, CommandOutput, CommandRunner, ProcessRunner};
use crate::settings::{Settings, Timeouts};

/// Controls a local Ollama installation through its CLI
pub struct Ollama<R: ProcessRunner = CommandRunner> {
    runner: R,
    binary: String,
    install_script_url: String,
    timeouts: Timeouts,
    classifier: BenignClassifier,
    platform: Platform,
}

impl Ollama<CommandRunner> {
    /// Real runner, with the configured `[env]` entries added to every child
    pub fn from_settings(settings: &Settings) -> Result<Self, PatternError> {
        let runner = settings
            .env
            .iter()
            .fold(CommandRunner::new(), |runner, (key, value)| {
                runner.with_env(key, value)
            });
        Self::new(runner, settings)
    }
}

impl<R: ProcessRunner> Ollama<R> {
    pub fn new(runner: R, settings: &Settings) -> Result<Self, PatternError> {
        Ok(Self {
            runner,
            binary: settings.binary.clone(),
            install_script_url: settings.install_script_url.clone(),
            timeouts: settings.timeouts.clone(),
            classifier: settings.classifier()?,
            platform: Platform::current(),
        })
    }

    /// Override the detected platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    #[cfg(test)]
    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    fn timeout(&self, kind: OperationKind) -> Duration {
        self.timeouts.for_operation(kind)
    }

    /// Run any program under the timeout configured for `kind`
    fn invoke(
        &self,
        kind: OperationKind,
        program: &str,
        args: &[&str],
        input: Option<&str>,
    ) -> Result<CommandOutput, CommandError> {
        let timeout = self.timeout(kind);
        tracing::debug!(operation = %kind, program, ?args, ?timeout, "Invoking command");

        let result = self.runner.run(program, args, input, timeout);
        match &result {
            Ok(output) => {
                tracing::debug!(operation = %kind, exit_code = ?output.exit_code, "Command finished")
            }
            Err(e) => tracing::debug!(operation = %kind, "Command failed: {}", e),
        }
        result
    }

    /// Run the Ollama binary and classify the result.
    ///
    /// On success the payload is the trimmed stdout; otherwise the message is
    /// the trimmed stderr (or the exit code when stderr is empty).
    fn execute(&self, kind: OperationKind, args: &[&str], input: Option<&str>) -> CommandOutcome {
        let output = match self.invoke(kind, &self.binary, args, input) {
            Ok(output) => output,
            Err(e) => return CommandOutcome::from_error(&e),
        };

        let verdict = self.classifier.classify(kind, &output);
        let outcome = CommandOutcome::new(verdict);
        if verdict == OutcomeKind::Completed {
            return outcome.with_payload(output.stdout.trim());
        }

        let stderr = output.stderr.trim();
        if stderr.is_empty() {
            let code = output
                .exit_code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            outcome.with_message(format!("exited with {}", code))
        } else {
            outcome.with_message(stderr)
        }
    }
}
