//! Operations shared by the subcommands and the interactive menu

use crate::core::ModelLookup;
use crate::host::ProcessRunner;
use crate::ollama::Ollama;

use super::report::Report;

/// One facade operation with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CheckInstalled,
    Install,
    IsRunning,
    Start,
    Stop,
    Version,
    ListModels,
    HasModel(String),
    RunningModels,
    RunModel(String),
    StopModel(String),
    KillModel(String),
    PullModel(String),
    DeleteModel(String),
    ShowModel(String),
    Prompt {
        model: String,
        template: String,
        code: String,
    },
}

impl Action {
    pub fn perform<R: ProcessRunner>(self, ollama: &Ollama<R>) -> Report {
        match self {
            Action::CheckInstalled => Report::Flag(ollama.is_installed()),
            Action::Install => Report::Flag(ollama.install()),
            Action::IsRunning => Report::Flag(ollama.is_running()),
            Action::Start => Report::Flag(ollama.start()),
            Action::Stop => Report::Flag(ollama.stop()),
            Action::Version => Report::Text(ollama.version()),
            Action::ListModels => Report::List(ollama.list_models()),
            Action::HasModel(model) => Report::Flag(ollama.is_model_installed(&model)),
            Action::RunningModels => Report::List(ollama.running_models()),
            Action::RunModel(model) => Report::Flag(ollama.run_model(&model)),
            Action::StopModel(model) => Report::Flag(ollama.stop_model(&model)),
            Action::KillModel(model) => Report::Flag(ollama.kill_model_processes(&model)),
            Action::PullModel(model) => Report::Flag(ollama.pull_model(&model)),
            Action::DeleteModel(model) => Report::Outcome(ollama.delete_model(&model)),
            Action::ShowModel(model) => match ollama.model_info(&model) {
                ModelLookup::Found(info) => Report::Info(info),
                other => Report::Lookup(other),
            },
            Action::Prompt {
                model,
                template,
                code,
            } => {
                let answer = ollama.send_prompt(&model, &template, &code);
                Report::Text(Some(answer).filter(|a| !a.is_empty()))
            }
        }
    }
}
