//! Benign-failure classification
//!
//! The Ollama CLI reports "already in the desired state" conditions as errors.
//! Which stderr wording counts as benign depends on the operation, so the
//! patterns live here, keyed by [`OperationKind`], instead of at call sites.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::{OperationKind, OutcomeKind};
use crate::host::CommandOutput;

/// What a matched benign pattern turns a non-zero exit into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenignVerdict {
    AlreadySatisfied,
    NotFound,
}

impl From<BenignVerdict> for OutcomeKind {
    fn from(verdict: BenignVerdict) -> Self {
        match verdict {
            BenignVerdict::AlreadySatisfied => OutcomeKind::AlreadySatisfied,
            BenignVerdict::NotFound => OutcomeKind::NotFound,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid benign pattern '{pattern}': {source}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex_lite::Error,
}

#[derive(Debug, Clone)]
struct BenignRule {
    pattern: Regex,
    verdict: BenignVerdict,
}

/// Maps operation kinds to the stderr patterns that mark a benign failure
#[derive(Debug, Clone)]
pub struct BenignClassifier {
    rules: HashMap<OperationKind, Vec<BenignRule>>,
}

impl BenignClassifier {
    /// A classifier with no patterns: every non-zero exit is a failure
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register a case-insensitive pattern for `kind`.
    ///
    /// Rules are checked in registration order; the first match wins.
    pub fn add_pattern(
        &mut self,
        kind: OperationKind,
        pattern: &str,
        verdict: BenignVerdict,
    ) -> Result<(), PatternError> {
        let compiled = Regex::new(&format!("(?i){}", pattern)).map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.entry(kind).or_default().push(BenignRule {
            pattern: compiled,
            verdict,
        });
        Ok(())
    }

    /// First verdict whose pattern matches `stderr`
    pub fn match_stderr(&self, kind: OperationKind, stderr: &str) -> Option<BenignVerdict> {
        self.rules
            .get(&kind)?
            .iter()
            .find(|rule| rule.pattern.is_match(stderr))
            .map(|rule| rule.verdict)
    }

    /// Classify a finished process.
    ///
    /// Exit code zero is always `Completed`; stderr is only consulted on failure.
    pub fn classify(&self, kind: OperationKind, output: &CommandOutput) -> OutcomeKind {
        if output.success() {
            return OutcomeKind::Completed;
        }
        self.match_stderr(kind, &output.stderr)
            .map(OutcomeKind::from)
            .unwrap_or(OutcomeKind::Failed)
    }
}

impl Default for BenignClassifier {
    fn default() -> Self {
        let defaults = [
            (OperationKind::RunModel, "already running", BenignVerdict::AlreadySatisfied),
            (OperationKind::StopModel, "no running model", BenignVerdict::AlreadySatisfied),
            (OperationKind::DeleteModel, "model .*not found", BenignVerdict::NotFound),
            (OperationKind::ShowModel, "model .*not found", BenignVerdict::NotFound),
        ];

        let mut classifier = Self::empty();
        for (kind, pattern, verdict) in defaults {
            if let Err(e) = classifier.add_pattern(kind, pattern, verdict) {
                tracing::error!("Built-in benign pattern rejected: {}", e);
            }
        }
        classifier
    }
}
