//! Model listing and lifecycle

use tracing::{debug, info, warn};

use super::parse::{parse_model_list, parse_running_models, tasklist_pids};
use super::server::{ProcessMatch, WINDOWS_IMAGE};
use super::Ollama;
use crate::core::{CommandOutcome, ModelInfo, ModelLookup, OperationKind, OutcomeKind, Platform};
use crate::host::ProcessRunner;

impl<R: ProcessRunner> Ollama<R> {
    /// Names of installed models, in `ollama list` order
    pub fn list_models(&self) -> Vec<String> {
        let outcome = self.execute(OperationKind::ListModels, &["list"], None);
        if !outcome.success() {
            warn!("Error retrieving models: {}", outcome.message());
            return Vec::new();
        }

        let models = parse_model_list(outcome.payload.as_deref().unwrap_or(""));
        debug!(?models, "Found models");
        models
    }

    /// Whether `model` is installed.
    ///
    /// A bare name also matches its `:latest` tag, the way `ollama run` resolves it.
    pub fn is_model_installed(&self, model: &str) -> bool {
        self.list_models()
            .iter()
            .any(|name| name == model || name.strip_suffix(":latest") == Some(model))
    }

    /// Names of models currently loaded, per `ollama ps`
    pub fn running_models(&self) -> Vec<String> {
        let outcome = self.execute(OperationKind::RunningModels, &["ps"], None);
        match outcome.kind {
            OutcomeKind::Completed => {
                let models = parse_running_models(outcome.payload.as_deref().unwrap_or(""));
                debug!(?models, "Current models found");
                models
            }
            OutcomeKind::TimedOut => {
                warn!("'ollama ps' timed out");
                Vec::new()
            }
            OutcomeKind::Unavailable => {
                warn!("'ollama' command not found; Ollama may not be installed or not in PATH");
                Vec::new()
            }
            _ => {
                warn!("'ollama ps' error: {}", outcome.message());
                Vec::new()
            }
        }
    }

    /// Load `model`; a model that is already running counts as started
    pub fn run_model(&self, model: &str) -> bool {
        self.lifecycle(OperationKind::RunModel, &["run", model], model)
    }

    /// Unload `model`; a model that was not running counts as stopped
    pub fn stop_model(&self, model: &str) -> bool {
        self.lifecycle(OperationKind::StopModel, &["stop", model], model)
    }

    /// Download `model` from the registry
    pub fn pull_model(&self, model: &str) -> bool {
        self.lifecycle(OperationKind::PullModel, &["pull", model], model)
    }

    /// Remove `model`. A missing model yields a `NotFound` outcome.
    pub fn delete_model(&self, model: &str) -> CommandOutcome {
        let outcome = self.execute(OperationKind::DeleteModel, &["rm", model], None);
        match outcome.kind {
            OutcomeKind::Completed => info!(model, "Model deleted"),
            OutcomeKind::NotFound => info!(model, "Model not found, nothing to delete"),
            _ => warn!(model, "Failed to delete model: {}", outcome.message()),
        }
        outcome
    }

    /// Parsed `ollama show` output for `model`
    pub fn model_info(&self, model: &str) -> ModelLookup {
        let outcome = self.execute(OperationKind::ShowModel, &["show", model], None);
        match outcome.kind {
            OutcomeKind::Completed | OutcomeKind::AlreadySatisfied => {
                ModelLookup::Found(ModelInfo::parse(outcome.payload.as_deref().unwrap_or("")))
            }
            OutcomeKind::NotFound => {
                info!(model, "Model not found");
                ModelLookup::NotFound
            }
            _ => {
                warn!(model, "Failed to inspect model: {}", outcome.message());
                ModelLookup::Failed(outcome.message().to_string())
            }
        }
    }

    /// Force-kill server processes serving `model`.
    ///
    /// Finding no such process counts as success.
    pub fn kill_model_processes(&self, model: &str) -> bool {
        match self.platform {
            Platform::Linux | Platform::MacOs => self.kill_model_unix(model),
            Platform::Windows => self.kill_model_windows(model),
            Platform::Unsupported => {
                warn!(platform = %self.platform, "Unsupported system");
                false
            }
        }
    }

    fn kill_model_unix(&self, model: &str) -> bool {
        let pattern = format!("ollama.*{}", model);
        let pids = match self.pgrep(OperationKind::KillModel, &pattern) {
            ProcessMatch::Found(pids) => pids,
            ProcessMatch::NoMatch => {
                debug!(model, "No process found for model");
                return true;
            }
            ProcessMatch::Unreadable => {
                warn!(model, "pgrep matched but printed no process id");
                return false;
            }
        };

        pids.iter().fold(true, |all_killed, pid| {
            let pid = pid.to_string();
            self.kill_one("kill", &["-9", &pid], &pid) && all_killed
        })
    }

    fn kill_model_windows(&self, model: &str) -> bool {
        let listing = match self.invoke(OperationKind::KillModel, "tasklist", &[], None) {
            Ok(output) => output.stdout,
            Err(e) => {
                warn!("Error listing processes: {}", e);
                return false;
            }
        };

        tasklist_pids(&listing, WINDOWS_IMAGE, model)
            .iter()
            .fold(true, |all_killed, pid| {
                self.kill_one("taskkill", &["/PID", pid.as_str(), "/F"], pid) && all_killed
            })
    }

    fn kill_one(&self, program: &str, args: &[&str], pid: &str) -> bool {
        match self.invoke(OperationKind::KillModel, program, args, None) {
            Ok(output) if output.success() => {
                debug!(pid, "Killed process");
                true
            }
            Ok(output) => {
                warn!(pid, "Failed to kill process: {}", output.stderr.trim());
                false
            }
            Err(e) => {
                warn!(pid, "Failed to kill process: {}", e);
                false
            }
        }
    }

    fn lifecycle(&self, kind: OperationKind, args: &[&str], model: &str) -> bool {
        let outcome = self.execute(kind, args, None);
        match outcome.kind {
            OutcomeKind::Completed => true,
            OutcomeKind::AlreadySatisfied => {
                debug!(
                    operation = %kind,
                    model,
                    "Already in requested state: {}",
                    outcome.message()
                );
                true
            }
            _ => {
                warn!(operation = %kind, model, "Command failed: {}", outcome.message());
                false
            }
        }
    }
}
