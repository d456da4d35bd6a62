//! User settings loaded from a TOML file
//!
//! Every key is optional; a missing file means defaults throughout.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::{BenignClassifier, BenignVerdict, OperationKind, PatternError};

/// Upstream install script piped into `sh`
pub const DEFAULT_INSTALL_SCRIPT_URL: &str = "https://ollama.ai/install.sh";

/// Default name of the Ollama binary
pub const DEFAULT_BINARY: &str = "ollama";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ollama binary name or path
    pub binary: String,
    pub install_script_url: String,
    pub timeouts: Timeouts,
    /// Extra benign-failure patterns, checked after the built-in ones
    pub benign: Vec<BenignPattern>,
    /// Environment for spawned processes, e.g. `OLLAMA_HOST`
    pub env: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            install_script_url: DEFAULT_INSTALL_SCRIPT_URL.to_string(),
            timeouts: Timeouts::default(),
            benign: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

/// Per-operation timeouts in seconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub version: u64,
    pub install: u64,
    pub process_query: u64,
    pub list_models: u64,
    pub running_models: u64,
    pub run_model: u64,
    pub stop_model: u64,
    pub pull_model: u64,
    pub delete_model: u64,
    pub show_model: u64,
    pub prompt: u64,
    /// Wait between spawning `ollama serve` and checking it is up
    pub settle: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            version: 10,
            install: 300,
            process_query: 10,
            list_models: 3,
            running_models: 10,
            run_model: 60,
            stop_model: 20,
            pull_model: 300,
            delete_model: 30,
            show_model: 30,
            prompt: 180,
            settle: 3,
        }
    }
}

impl Timeouts {
    /// Time limit for one invocation of `kind`
    pub fn for_operation(&self, kind: OperationKind) -> Duration {
        let secs = match kind {
            OperationKind::Version => self.version,
            OperationKind::Install => self.install,
            OperationKind::ProcessQuery | OperationKind::StopServer | OperationKind::KillModel => {
                self.process_query
            }
            OperationKind::ListModels => self.list_models,
            OperationKind::RunningModels => self.running_models,
            OperationKind::RunModel => self.run_model,
            OperationKind::StopModel => self.stop_model,
            OperationKind::PullModel => self.pull_model,
            OperationKind::DeleteModel => self.delete_model,
            OperationKind::ShowModel => self.show_model,
            OperationKind::Prompt => self.prompt,
        };
        Duration::from_secs(secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle)
    }
}

/// A user-supplied benign-failure rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BenignPattern {
    pub operation: OperationKind,
    /// Case-insensitive regular expression matched against stderr
    pub pattern: String,
    pub outcome: BenignVerdict,
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ollamactl").join("config.toml"))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicitly given path must exist; the default location may not.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml(&content).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Built-in classifier extended with the configured patterns
    pub fn classifier(&self) -> Result<BenignClassifier, PatternError> {
        let mut classifier = BenignClassifier::default();
        for rule in &self.benign {
            classifier.add_pattern(rule.operation, &rule.pattern, rule.outcome)?;
        }
        Ok(classifier)
    }
}
