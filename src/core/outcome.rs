//! Typed result of a single external command

use serde::Serialize;

use crate::host::CommandError;

/// How an invocation ended, after benign-failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Exit code zero
    Completed,
    /// Non-zero exit, but the target was already in the requested state
    AlreadySatisfied,
    /// The named model does not exist
    NotFound,
    /// Non-zero exit that no benign pattern explains
    Failed,
    /// Killed after exceeding its timeout
    TimedOut,
    /// Binary missing or could not be launched
    Unavailable,
}

impl OutcomeKind {
    pub fn is_success(self) -> bool {
        matches!(self, OutcomeKind::Completed | OutcomeKind::AlreadySatisfied)
    }
}

/// Outcome of one command: kind, optional payload text, optional diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub kind: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandOutcome {
    pub fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            payload: None,
            message: None,
        }
    }

    /// Map a runner error onto the outcome taxonomy
    pub fn from_error(error: &CommandError) -> Self {
        let kind = match error {
            CommandError::BinaryNotFound(_) | CommandError::LaunchFailed(_) => {
                OutcomeKind::Unavailable
            }
            CommandError::TimedOut(_) => OutcomeKind::TimedOut,
            CommandError::Io(_) => OutcomeKind::Failed,
        };
        Self::new(kind).with_message(error.to_string())
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn success(&self) -> bool {
        self.kind.is_success()
    }

    /// Diagnostic text, or an empty string
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_success_kinds() {
        assert!(OutcomeKind::Completed.is_success());
        assert!(OutcomeKind::AlreadySatisfied.is_success());
        assert!(!OutcomeKind::NotFound.is_success());
        assert!(!OutcomeKind::Failed.is_success());
        assert!(!OutcomeKind::TimedOut.is_success());
        assert!(!OutcomeKind::Unavailable.is_success());
    }

    #[test]
    fn test_from_error() {
        let outcome = CommandOutcome::from_error(&CommandError::BinaryNotFound("ollama".into()));
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
        assert!(outcome.message().contains("ollama"));

        let outcome = CommandOutcome::from_error(&CommandError::TimedOut(Duration::from_secs(3)));
        assert_eq!(outcome.kind, OutcomeKind::TimedOut);
        assert!(!outcome.success());
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let outcome = CommandOutcome::new(OutcomeKind::NotFound);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"kind":"not_found"}"#);
    }
}
