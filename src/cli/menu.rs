//! Interactive text menu
//!
//! Lists the operations, asks for their arguments and prints each result.
//! Generic over its input and output so it can be driven from tests.

use std::io::{self, BufRead, Write};

use super::action::Action;
use crate::host::ProcessRunner;
use crate::ollama::Ollama;

/// Words that leave the menu, besides the number of the exit entry
const EXIT_WORDS: [&str; 4] = ["exit", "quit", "q", "e"];

const MODEL_INPUT: &[&str] = &["Model name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    CheckInstalled,
    Install,
    IsRunning,
    Start,
    Stop,
    Version,
    ListModels,
    HasModel,
    RunningModels,
    RunModel,
    StopModel,
    KillModel,
    PullModel,
    DeleteModel,
    ShowModel,
    Prompt,
    Exit,
}

pub struct MenuItem {
    pub label: &'static str,
    pub action: MenuAction,
    /// Prompts for the arguments the action needs, in order
    pub inputs: &'static [&'static str],
}

impl MenuItem {
    const fn new(label: &'static str, action: MenuAction, inputs: &'static [&'static str]) -> Self {
        Self {
            label,
            action,
            inputs,
        }
    }
}

/// Menu entries; the exit entry is always last
pub const MENU: &[MenuItem] = &[
    MenuItem::new("Check Ollama installation", MenuAction::CheckInstalled, &[]),
    MenuItem::new("Install Ollama", MenuAction::Install, &[]),
    MenuItem::new("Is Ollama running?", MenuAction::IsRunning, &[]),
    MenuItem::new("Start Ollama", MenuAction::Start, &[]),
    MenuItem::new("Stop Ollama", MenuAction::Stop, &[]),
    MenuItem::new("Show Ollama version", MenuAction::Version, &[]),
    MenuItem::new("List models", MenuAction::ListModels, &[]),
    MenuItem::new("Is a model installed?", MenuAction::HasModel, MODEL_INPUT),
    MenuItem::new("Running models", MenuAction::RunningModels, &[]),
    MenuItem::new("Run a model", MenuAction::RunModel, MODEL_INPUT),
    MenuItem::new("Stop a model", MenuAction::StopModel, MODEL_INPUT),
    MenuItem::new("Kill model processes", MenuAction::KillModel, MODEL_INPUT),
    MenuItem::new("Pull a model", MenuAction::PullModel, MODEL_INPUT),
    MenuItem::new("Delete a model", MenuAction::DeleteModel, MODEL_INPUT),
    MenuItem::new("Show model details", MenuAction::ShowModel, MODEL_INPUT),
    MenuItem::new(
        "Prompt + code: combine model, prompt and code and send them via the CLI",
        MenuAction::Prompt,
        &[
            "Model name",
            "Prompt (use {code} as placeholder)",
            "Code (as text, use \\n for line breaks)",
        ],
    ),
    MenuItem::new("Exit", MenuAction::Exit, &[]),
];

/// Build the action for a menu entry from the answers to its prompts
fn build_action(kind: MenuAction, mut inputs: Vec<String>) -> Option<Action> {
    let mut next = || (!inputs.is_empty()).then(|| inputs.remove(0));

    let action = match kind {
        MenuAction::CheckInstalled => Action::CheckInstalled,
        MenuAction::Install => Action::Install,
        MenuAction::IsRunning => Action::IsRunning,
        MenuAction::Start => Action::Start,
        MenuAction::Stop => Action::Stop,
        MenuAction::Version => Action::Version,
        MenuAction::ListModels => Action::ListModels,
        MenuAction::HasModel => Action::HasModel(next()?),
        MenuAction::RunningModels => Action::RunningModels,
        MenuAction::RunModel => Action::RunModel(next()?),
        MenuAction::StopModel => Action::StopModel(next()?),
        MenuAction::KillModel => Action::KillModel(next()?),
        MenuAction::PullModel => Action::PullModel(next()?),
        MenuAction::DeleteModel => Action::DeleteModel(next()?),
        MenuAction::ShowModel => Action::ShowModel(next()?),
        MenuAction::Prompt => {
            let model = next()?;
            let template = next()?;
            // Single-line input: a literal \n stands for a line break
            let code = next()?.replace("\\n", "\n");
            Action::Prompt {
                model,
                template,
                code,
            }
        }
        MenuAction::Exit => return None,
    };
    Some(action)
}

/// Read one trimmed line; `None` at end of input
fn read_line<I: BufRead>(input: &mut I) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_menu<O: Write>(out: &mut O) -> io::Result<()> {
    writeln!(out, "\n=== Ollama Control ===")?;
    for (idx, item) in MENU.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, item.label)?;
    }
    Ok(())
}

/// Run the menu loop until the user exits or input ends
pub fn run<R, I, O>(ollama: &Ollama<R>, mut input: I, mut out: O) -> io::Result<()>
where
    R: ProcessRunner,
    I: BufRead,
    O: Write,
{
    let exit_choice = MENU.len().to_string();

    loop {
        print_menu(&mut out)?;
        write!(out, "Choose an option (a number or 'exit'): ")?;
        out.flush()?;

        let Some(choice) = read_line(&mut input)? else {
            break;
        };
        let choice = choice.to_lowercase();

        if EXIT_WORDS.contains(&choice.as_str()) || choice == exit_choice {
            writeln!(out, "Closing CLI. See you soon.")?;
            break;
        }

        match choice.parse::<usize>() {
            Ok(n) if (1..MENU.len()).contains(&n) => {
                let item = &MENU[n - 1];
                writeln!(out, "\n--- {} ---", item.label)?;

                let mut answers = Vec::with_capacity(item.inputs.len());
                for prompt in item.inputs {
                    write!(out, "{}: ", prompt)?;
                    out.flush()?;
                    match read_line(&mut input)? {
                        Some(answer) => answers.push(answer),
                        None => return Ok(()),
                    }
                }

                match build_action(item.action, answers) {
                    Some(action) => {
                        let report = action.perform(ollama);
                        writeln!(out, "\n{}", report.render())?;
                    }
                    None => writeln!(out, "\nAction executed.")?,
                }
            }
            Ok(_) => writeln!(
                out,
                "Invalid choice! Please choose a number between 1 and {}.",
                MENU.len()
            )?,
            Err(_) => writeln!(out, "Invalid input! Please enter a valid number.")?,
        }

        write!(out, "\nPress Enter to return to the menu...")?;
        out.flush()?;
        if read_line(&mut input)?.is_none() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Platform;
    use crate::host::testing::ScriptedRunner;
    use crate::ollama::test_support::ollama;
    use std::io::Cursor;

    fn position(action: MenuAction) -> usize {
        MENU.iter().position(|item| item.action == action).unwrap() + 1
    }

    fn drive(runner: ScriptedRunner, script: &str) -> (String, Vec<crate::host::testing::RecordedCall>) {
        let o = ollama(runner, Platform::Linux);
        let mut out = Vec::new();
        run(&o, Cursor::new(script.to_string()), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), o.runner().calls())
    }

    #[test]
    fn test_exit_entry_is_last() {
        assert_eq!(MENU.last().map(|item| item.action), Some(MenuAction::Exit));
    }

    #[test]
    fn test_quit_words() {
        for word in ["q", "EXIT", " quit "] {
            let (out, calls) = drive(ScriptedRunner::new(), &format!("{}\n", word));
            assert!(out.contains("See you soon"));
            assert!(calls.is_empty());
        }

        let (out, _) = drive(ScriptedRunner::new(), &format!("{}\n", MENU.len()));
        assert!(out.contains("See you soon"));
    }

    #[test]
    fn test_end_of_input_leaves_menu() {
        let (out, calls) = drive(ScriptedRunner::new(), "");
        assert!(out.contains("=== Ollama Control ==="));
        assert!(calls.is_empty());
    }

    #[test]
    fn test_list_models_entry() {
        let script = format!("{}\n\nq\n", position(MenuAction::ListModels));
        let (out, calls) = drive(
            ScriptedRunner::new().ok("NAME SIZE\nllama2 3.8GB\nmistral 4.1GB\n"),
            &script,
        );
        assert!(out.contains("--- List models ---"));
        assert!(out.contains("Result: llama2, mistral"));
        assert_eq!(calls[0].command_line(), "ollama list");
    }

    #[test]
    fn test_prompt_entry_expands_line_breaks() {
        let script = format!(
            "{}\nllama2\nFix: {{code}}\nlet a = 1;\\nlet b = 2;\n\nq\n",
            position(MenuAction::Prompt)
        );
        let (out, calls) = drive(ScriptedRunner::new().ok("Looks fine."), &script);

        assert!(out.contains("Result: Looks fine."));
        assert_eq!(calls[0].command_line(), "ollama run llama2");
        assert_eq!(
            calls[0].input.as_deref(),
            Some("Fix: let a = 1;\nlet b = 2;")
        );
    }

    #[test]
    fn test_invalid_choices() {
        let (out, calls) = drive(ScriptedRunner::new(), "0\n\nabc\n\nq\n");
        assert!(out.contains("Invalid choice! Please choose a number between 1 and"));
        assert!(out.contains("Invalid input! Please enter a valid number."));
        assert!(calls.is_empty());
    }

    #[test]
    fn test_version_failure_prints_action_executed() {
        let script = format!("{}\n\nq\n", position(MenuAction::Version));
        let (out, _) = drive(ScriptedRunner::new().exits(1, "", "boom"), &script);
        assert!(out.contains("Action executed."));
    }

    #[test]
    fn test_build_action_needs_all_inputs() {
        assert_eq!(build_action(MenuAction::RunModel, vec![]), None);
        assert_eq!(
            build_action(MenuAction::RunModel, vec!["llama2".into()]),
            Some(Action::RunModel("llama2".into()))
        );
        assert_eq!(build_action(MenuAction::Exit, vec![]), None);
    }
}
