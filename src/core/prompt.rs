//! Prompt assembly for code questions

/// Placeholder replaced with the submitted code
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Combine a prompt template with a code snippet.
///
/// Every `{code}` in `template` is replaced with `code`. Templates without the
/// placeholder get the code appended as a fenced block.
pub fn assemble_prompt(template: &str, code: &str) -> String {
    if template.contains(CODE_PLACEHOLDER) {
        template.replace(CODE_PLACEHOLDER, code)
    } else {
        format!("{}\n\nCode:\n```\n{}\n```", template, code)
    }
}
