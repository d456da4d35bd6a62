//! Command-line interface

pub mod action;
pub mod menu;
pub mod report;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::ollama::Ollama;
use crate::settings::Settings;
use action::Action;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    pub const BINARY_MISSING: i32 = 2;
    pub const OPERATION_FAILED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
}

/// Control a local Ollama installation from the terminal
#[derive(Parser, Debug)]
#[command(name = "ollamactl", version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file (default: <config dir>/ollamactl/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ollama binary name or path
    #[arg(long, global = true, env = "OLLAMACTL_BINARY", value_name = "PATH")]
    pub binary: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the Ollama binary is installed
    Check,
    /// Install Ollama with the upstream install script (Linux/macOS)
    Install,
    /// Check whether the Ollama server is running
    Status,
    /// Start `ollama serve` in the background
    Start,
    /// Stop the Ollama server
    Stop,
    /// Show the installed Ollama version
    Version,
    /// List installed models
    Models,
    /// Check whether a model is installed
    Has(ModelArgs),
    /// List models currently loaded
    Ps,
    /// Load a model
    Run(ModelArgs),
    /// Unload a model
    StopModel(ModelArgs),
    /// Force-kill server processes serving a model
    Kill(ModelArgs),
    /// Download a model
    Pull(ModelArgs),
    /// Delete a model
    Rm(ModelArgs),
    /// Show model details
    Show(ModelArgs),
    /// Send a prompt with a code snippet to a model
    Prompt(PromptArgs),
    /// Interactive menu (default when no command is given)
    Menu,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Model name, e.g. `llama2` or `mistral:7b`
    pub model: String,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Model name
    pub model: String,

    /// Prompt template; `{code}` is replaced with the code
    #[arg(short, long)]
    pub template: String,

    /// Code snippet
    #[arg(long, conflicts_with = "code_file", required_unless_present = "code_file")]
    pub code: Option<String>,

    /// Read the code snippet from a file
    #[arg(long, value_name = "FILE")]
    pub code_file: Option<PathBuf>,
}

impl Commands {
    /// The action to perform, or `None` for the interactive menu
    pub fn into_action(self) -> anyhow::Result<Option<Action>> {
        let action = match self {
            Commands::Check => Action::CheckInstalled,
            Commands::Install => Action::Install,
            Commands::Status => Action::IsRunning,
            Commands::Start => Action::Start,
            Commands::Stop => Action::Stop,
            Commands::Version => Action::Version,
            Commands::Models => Action::ListModels,
            Commands::Has(args) => Action::HasModel(args.model),
            Commands::Ps => Action::RunningModels,
            Commands::Run(args) => Action::RunModel(args.model),
            Commands::StopModel(args) => Action::StopModel(args.model),
            Commands::Kill(args) => Action::KillModel(args.model),
            Commands::Pull(args) => Action::PullModel(args.model),
            Commands::Rm(args) => Action::DeleteModel(args.model),
            Commands::Show(args) => Action::ShowModel(args.model),
            Commands::Prompt(args) => {
                let code = match (args.code, args.code_file) {
                    (Some(code), _) => code,
                    (None, Some(path)) => std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read code from {}", path.display()))?,
                    (None, None) => anyhow::bail!("Either --code or --code-file is required"),
                };
                Action::Prompt {
                    model: args.model,
                    template: args.template,
                    code,
                }
            }
            Commands::Menu => return Ok(None),
        };
        Ok(Some(action))
    }
}

/// Load settings, build the facade and run the requested command
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(binary) = cli.binary {
        settings.binary = binary;
    }
    let ollama = Ollama::from_settings(&settings)?;
    tracing::debug!(platform = %ollama.platform(), binary = ollama.binary(), "Ready");

    let action = match cli.command {
        Some(command) => command.into_action()?,
        None => None,
    };

    let Some(action) = action else {
        let stdin = io::stdin();
        menu::run(&ollama, stdin.lock(), io::stdout())?;
        return Ok(exit_codes::SUCCESS);
    };

    let report = action.perform(&ollama);
    let mut stdout = io::stdout().lock();
    if cli.json {
        writeln!(stdout, "{}", report.to_json())?;
    } else {
        writeln!(stdout, "{}", report.render())?;
    }
    Ok(report.exit_code())
}
