//! ollamactl - command-line control for a local Ollama installation
//!
//! Wraps the `ollama` CLI to:
//! - check, install, start and stop the server
//! - list, run, stop, pull, delete and inspect models
//! - pipe code questions to a model
//!
//! Every operation is a single blocking call to an external process.

mod cli;
mod core;
mod host;
mod logging;
mod ollama;
mod settings;

use clap::Parser;
use cli::{exit_codes, Cli};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::UNEXPECTED_FAILURE
        }
    }
}
