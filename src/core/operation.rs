//! Names for every external invocation the facade performs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation kinds; keys for timeouts and benign-failure patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// `ollama --version`, used for both the install check and the version query
    Version,
    Install,
    /// `pgrep` / `tasklist` lookups
    ProcessQuery,
    StopServer,
    ListModels,
    RunningModels,
    RunModel,
    StopModel,
    KillModel,
    PullModel,
    DeleteModel,
    ShowModel,
    Prompt,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Version => "version",
            OperationKind::Install => "install",
            OperationKind::ProcessQuery => "process_query",
            OperationKind::StopServer => "stop_server",
            OperationKind::ListModels => "list_models",
            OperationKind::RunningModels => "running_models",
            OperationKind::RunModel => "run_model",
            OperationKind::StopModel => "stop_model",
            OperationKind::KillModel => "kill_model",
            OperationKind::PullModel => "pull_model",
            OperationKind::DeleteModel => "delete_model",
            OperationKind::ShowModel => "show_model",
            OperationKind::Prompt => "prompt",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
