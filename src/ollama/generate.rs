//! Prompt submission through `ollama run`

use tracing::{debug, warn};

use super::Ollama;
use crate::core::{assemble_prompt, OperationKind};
use crate::host::ProcessRunner;

impl<R: ProcessRunner> Ollama<R> {
    /// Send a code question to `model` and return its answer.
    ///
    /// The prompt is written to stdin of `ollama run <model>`. Any failure,
    /// including a timeout, yields an empty string; partial output is dropped.
    pub fn send_prompt(&self, model: &str, template: &str, code: &str) -> String {
        let prompt = assemble_prompt(template, code);
        debug!(model, prompt_len = prompt.len(), "Sending prompt");

        let outcome = self.execute(OperationKind::Prompt, &["run", model], Some(&prompt));
        if outcome.success() {
            outcome.payload.unwrap_or_default()
        } else {
            warn!(model, "Error with 'ollama run': {}", outcome.message());
            String::new()
        }
    }
}
