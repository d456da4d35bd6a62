//! Rendering of operation results

use serde::Serialize;

use super::exit_codes;
use crate::core::{CommandOutcome, ModelInfo, ModelLookup, OutcomeKind};

/// Result of one action, ready to print
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Flag(bool),
    Text(Option<String>),
    List(Vec<String>),
    Outcome(CommandOutcome),
    Info(ModelInfo),
    Lookup(ModelLookup),
}

impl Report {
    /// Human-readable rendering
    pub fn render(&self) -> String {
        match self {
            Report::Flag(value) => format!("Result: {}", value),
            Report::Text(Some(text)) => format!("Result: {}", text),
            Report::Text(None) => "Action executed.".to_string(),
            Report::List(items) if items.is_empty() => "Result: (none)".to_string(),
            Report::List(items) => format!("Result: {}", items.join(", ")),
            Report::Outcome(outcome) => render_outcome(outcome),
            Report::Info(info) if info.is_empty() => "Result: (no details)".to_string(),
            Report::Info(info) => {
                let width = info.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                let mut out = String::from("Result:");
                for (key, value) in info.iter() {
                    out.push_str(&format!("\n  {:<width$}  {}", key, value, width = width));
                }
                out
            }
            Report::Lookup(ModelLookup::NotFound) => "Result: model not found".to_string(),
            Report::Lookup(ModelLookup::Failed(message)) => format!("Result: failed ({})", message),
            Report::Lookup(ModelLookup::Found(info)) => Report::Info(info.clone()).render(),
        }
    }

    /// JSON rendering for `--json`
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "null".to_string())
    }

    /// Process exit code for this result
    pub fn exit_code(&self) -> i32 {
        match self {
            Report::Flag(true) | Report::Text(Some(_)) | Report::List(_) | Report::Info(_) => {
                exit_codes::SUCCESS
            }
            Report::Flag(false) | Report::Text(None) => exit_codes::OPERATION_FAILED,
            Report::Outcome(outcome) => match outcome.kind {
                OutcomeKind::Completed | OutcomeKind::AlreadySatisfied => exit_codes::SUCCESS,
                OutcomeKind::NotFound => exit_codes::NOT_FOUND,
                OutcomeKind::Unavailable => exit_codes::BINARY_MISSING,
                OutcomeKind::Failed | OutcomeKind::TimedOut => exit_codes::OPERATION_FAILED,
            },
            Report::Lookup(ModelLookup::Found(_)) => exit_codes::SUCCESS,
            Report::Lookup(ModelLookup::NotFound) => exit_codes::NOT_FOUND,
            Report::Lookup(ModelLookup::Failed(_)) => exit_codes::OPERATION_FAILED,
        }
    }
}

fn render_outcome(outcome: &CommandOutcome) -> String {
    let label = match outcome.kind {
        OutcomeKind::Completed => "done",
        OutcomeKind::AlreadySatisfied => "already done",
        OutcomeKind::NotFound => "model not found",
        OutcomeKind::Failed => "failed",
        OutcomeKind::TimedOut => "timed out",
        OutcomeKind::Unavailable => "ollama unavailable",
    };
    match outcome.message.as_deref().filter(|m| !m.is_empty()) {
        Some(message) if !outcome.success() => format!("Result: {} ({})", label, message),
        _ => format!("Result: {}", label),
    }
}
