//! Installation and server lifecycle

use std::thread;

use tracing::{debug, info, warn};

use super::parse::{parse_pids, tasklist_contains};
use super::Ollama;
use crate::core::{OperationKind, Platform};
use crate::host::{CommandError, ProcessRunner};

/// Pattern handed to `pgrep -f` to find the server and its model runners.
///
/// Anything else with `ollama` in its command line (this tool, a shell, an
/// editor) is left alone.
const SERVER_PATTERN: &str = "ollama (serve|runner)";

/// Image name of the server in the Windows task list
pub(super) const WINDOWS_IMAGE: &str = "ollama.exe";

/// Result of a `pgrep -f` lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ProcessMatch {
    /// pgrep matched nothing, failed to run, or matched only this process
    NoMatch,
    Found(Vec<u32>),
    /// pgrep reported a match but printed no PID
    Unreadable,
}

impl<R: ProcessRunner> Ollama<R> {
    /// Whether `ollama --version` exits cleanly
    pub fn is_installed(&self) -> bool {
        match self.invoke(OperationKind::Version, &self.binary, &["--version"], None) {
            Ok(output) if output.success() => {
                info!("Ollama binary found");
                true
            }
            Ok(output) => {
                warn!(exit_code = ?output.exit_code, "Ollama binary not found or incorrect");
                false
            }
            Err(e) => {
                warn!("Error checking Ollama installation: {}", e);
                false
            }
        }
    }

    /// Version string reported by the binary
    pub fn version(&self) -> Option<String> {
        let outcome = self.execute(OperationKind::Version, &["--version"], None);
        if outcome.success() {
            info!("Ollama version: {}", outcome.payload.as_deref().unwrap_or(""));
            outcome.payload
        } else {
            warn!("Error retrieving version: {}", outcome.message());
            None
        }
    }

    /// Run the upstream install script through `sh`.
    ///
    /// Only Linux and macOS have an install command; elsewhere this reports
    /// failure without running anything.
    pub fn install(&self) -> bool {
        match self.platform {
            Platform::Linux | Platform::MacOs => {}
            Platform::Windows | Platform::Unsupported => {
                warn!(
                    platform = %self.platform,
                    "Automatic installation is not supported on this platform; \
                     download the installer from https://ollama.com/download"
                );
                return false;
            }
        }

        info!(platform = %self.platform, "Starting Ollama installation");
        let script = format!("curl -fsSL {} | sh", self.install_script_url);
        match self.invoke(OperationKind::Install, "sh", &["-c", &script], None) {
            Ok(output) if output.success() => {
                info!("Ollama installed successfully");
                true
            }
            Ok(output) => {
                warn!("Installation failed: {}", output.stderr.trim());
                false
            }
            Err(CommandError::TimedOut(limit)) => {
                warn!("Installation took too long (over {}s)", limit.as_secs());
                false
            }
            Err(e) => {
                warn!("Unexpected error during installation: {}", e);
                false
            }
        }
    }

    /// Whether an Ollama process is alive
    pub fn is_running(&self) -> bool {
        match self.platform {
            Platform::Linux | Platform::MacOs => !self.server_pids().is_empty(),
            Platform::Windows => {
                match self.invoke(OperationKind::ProcessQuery, "tasklist", &[], None) {
                    Ok(output) => tasklist_contains(&output.stdout, WINDOWS_IMAGE),
                    Err(e) => {
                        debug!("Error listing processes: {}", e);
                        false
                    }
                }
            }
            Platform::Unsupported => false,
        }
    }

    /// Spawn `ollama serve` in the background and check that it came up.
    ///
    /// The server process is not tracked; it outlives this call.
    pub fn start(&self) -> bool {
        info!("Starting Ollama service");
        if let Err(e) = self.runner.spawn_detached(&self.binary, &["serve"]) {
            warn!("Error starting the Ollama service: {}", e);
            return false;
        }

        thread::sleep(self.timeouts.settle());

        if self.is_running() {
            info!("Ollama service launched");
            true
        } else {
            warn!("Ollama service could not be started");
            false
        }
    }

    /// Stop the server.
    ///
    /// macOS first asks Homebrew to stop its service, then falls back to
    /// signalling the processes directly.
    pub fn stop(&self) -> bool {
        match self.platform {
            Platform::MacOs => {
                match self.invoke(
                    OperationKind::StopServer,
                    "brew",
                    &["services", "stop", "ollama"],
                    None,
                ) {
                    Ok(output) if output.success() => {
                        info!("Ollama brew service stopped");
                        return true;
                    }
                    Ok(output) => debug!("brew services stop failed: {}", output.stderr.trim()),
                    Err(e) => debug!("brew unavailable: {}", e),
                }
                self.terminate_server()
            }
            Platform::Linux => self.terminate_server(),
            Platform::Windows | Platform::Unsupported => {
                warn!(
                    platform = %self.platform,
                    "Stopping Ollama is not implemented for this platform"
                );
                false
            }
        }
    }

    /// SIGTERM every process matching the server pattern
    fn terminate_server(&self) -> bool {
        let pids = self.server_pids();
        if pids.is_empty() {
            debug!("No Ollama process to stop");
            return false;
        }

        let pid_args: Vec<String> = pids.iter().map(u32::to_string).collect();
        let mut args = vec!["-TERM"];
        args.extend(pid_args.iter().map(String::as_str));

        match self.invoke(OperationKind::StopServer, "kill", &args, None) {
            Ok(output) if output.success() => {
                info!(?pids, "Ollama stopped");
                true
            }
            Ok(output) => {
                warn!("Failed to stop Ollama: {}", output.stderr.trim());
                false
            }
            Err(e) => {
                warn!("Error stopping the Ollama service: {}", e);
                false
            }
        }
    }

    /// Processes matching `pattern` via `pgrep -f`, excluding this process.
    ///
    /// The own PID is dropped only after the output has been checked for
    /// PIDs, so a self-only match counts as no match.
    pub(super) fn pgrep(&self, kind: OperationKind, pattern: &str) -> ProcessMatch {
        let output = match self.invoke(kind, "pgrep", &["-f", pattern], None) {
            Ok(output) if output.success() => output,
            Ok(_) => return ProcessMatch::NoMatch,
            Err(e) => {
                debug!("Error searching for processes: {}", e);
                return ProcessMatch::NoMatch;
            }
        };

        let pids = parse_pids(&output.stdout);
        if pids.is_empty() {
            return ProcessMatch::Unreadable;
        }

        let own = std::process::id();
        let others: Vec<u32> = pids.into_iter().filter(|pid| *pid != own).collect();
        if others.is_empty() {
            ProcessMatch::NoMatch
        } else {
            ProcessMatch::Found(others)
        }
    }

    fn server_pids(&self) -> Vec<u32> {
        match self.pgrep(OperationKind::ProcessQuery, SERVER_PATTERN) {
            ProcessMatch::Found(pids) => pids,
            ProcessMatch::NoMatch | ProcessMatch::Unreadable => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ollama;
    use crate::core::Platform;
    use crate::host::testing::ScriptedRunner;
    use crate::host::CommandError;
    use std::time::Duration;

    #[test]
    fn test_is_installed() {
        let o = ollama(ScriptedRunner::new().ok("ollama version is 0.5.7"), Platform::Linux);
        assert!(o.is_installed());
        assert_eq!(o.runner().command_lines(), vec!["ollama --version"]);
        assert_eq!(o.runner().calls()[0].timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_is_installed_false_on_any_failure() {
        let o = ollama(
            ScriptedRunner::new()
                .exits(127, "", "")
                .times_out()
                .fails(CommandError::BinaryNotFound("ollama".into())),
            Platform::Linux,
        );
        assert!(!o.is_installed());
        assert!(!o.is_installed());
        assert!(!o.is_installed());
    }

    #[test]
    fn test_version() {
        let o = ollama(
            ScriptedRunner::new().ok("ollama version is 0.5.7\n").exits(1, "", "bad"),
            Platform::Linux,
        );
        assert_eq!(o.version().as_deref(), Some("ollama version is 0.5.7"));
        assert_eq!(o.version(), None);
    }

    #[test]
    fn test_install_runs_script_on_unix() {
        let o = ollama(ScriptedRunner::new().ok(""), Platform::MacOs);
        assert!(o.install());

        let call = &o.runner().calls()[0];
        assert_eq!(call.program, "sh");
        assert_eq!(call.args, vec!["-c", "curl -fsSL https://ollama.ai/install.sh | sh"]);
        assert_eq!(call.timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_install_failure_and_timeout() {
        let o = ollama(
            ScriptedRunner::new().exits(1, "", "curl: (6) Could not resolve host").times_out(),
            Platform::Linux,
        );
        assert!(!o.install());
        assert!(!o.install());
    }

    #[test]
    fn test_install_unsupported_on_windows() {
        let o = ollama(ScriptedRunner::new(), Platform::Windows);
        assert!(!o.install());
        assert!(o.runner().calls().is_empty());
    }

    #[test]
    fn test_is_running_unix() {
        let o = ollama(
            ScriptedRunner::new().ok("4242\n").exits(1, "", ""),
            Platform::Linux,
        );
        assert!(o.is_running());
        assert!(!o.is_running());
        assert_eq!(o.runner().command_lines()[0], "pgrep -f ollama (serve|runner)");
    }

    #[test]
    fn test_is_running_ignores_own_process() {
        let own = std::process::id().to_string();
        let o = ollama(ScriptedRunner::new().ok(&own), Platform::Linux);
        assert!(!o.is_running());
    }

    #[test]
    fn test_server_lookup_targets_serve_and_runner_only() {
        let o = ollama(ScriptedRunner::new().ok("4242\n"), Platform::Linux);
        assert!(o.is_running());
        assert_eq!(o.runner().calls()[0].args, vec!["-f", "ollama (serve|runner)"]);
    }

    #[test]
    fn test_is_running_without_pids_in_output() {
        let o = ollama(ScriptedRunner::new().ok("\n"), Platform::Linux);
        assert!(!o.is_running());
    }

    #[test]
    fn test_stop_does_not_signal_own_process() {
        let own = std::process::id().to_string();
        let o = ollama(ScriptedRunner::new().ok(&own), Platform::Linux);
        assert!(!o.stop());
        assert_eq!(o.runner().calls().len(), 1);
    }

    #[test]
    fn test_is_running_windows() {
        let o = ollama(
            ScriptedRunner::new()
                .ok("Image Name   PID\nOllama.exe   1234 Console\n")
                .ok("Image Name   PID\nexplorer.exe 99 Console\n"),
            Platform::Windows,
        );
        assert!(o.is_running());
        assert!(!o.is_running());
        assert_eq!(o.runner().command_lines()[0], "tasklist");
    }

    #[test]
    fn test_is_running_unsupported() {
        let o = ollama(ScriptedRunner::new(), Platform::Unsupported);
        assert!(!o.is_running());
        assert!(o.runner().calls().is_empty());
    }

    #[test]
    fn test_start_spawns_then_checks() {
        let o = ollama(ScriptedRunner::new().ok("777\n"), Platform::Linux);
        assert!(o.start());

        let calls = o.runner().calls();
        assert_eq!(calls[0].command_line(), "ollama serve");
        assert_eq!(calls[0].timeout, None);
        assert_eq!(calls[1].command_line(), "pgrep -f ollama (serve|runner)");
    }

    #[test]
    fn test_start_reports_server_not_up() {
        let o = ollama(ScriptedRunner::new().exits(1, "", ""), Platform::Linux);
        assert!(!o.start());
    }

    #[test]
    fn test_start_spawn_failure() {
        let o = ollama(
            ScriptedRunner::new().spawn_fails(CommandError::BinaryNotFound("ollama".into())),
            Platform::Linux,
        );
        assert!(!o.start());
        // No running check after a failed spawn
        assert_eq!(o.runner().calls().len(), 1);
    }

    #[test]
    fn test_stop_macos_prefers_brew() {
        let o = ollama(ScriptedRunner::new().ok("Stopping `ollama`..."), Platform::MacOs);
        assert!(o.stop());
        assert_eq!(o.runner().command_lines(), vec!["brew services stop ollama"]);
    }

    #[test]
    fn test_stop_macos_falls_back_to_kill() {
        let o = ollama(
            ScriptedRunner::new()
                .exits(1, "", "Error: Service `ollama` is not started.")
                .ok("101\n202\n")
                .ok(""),
            Platform::MacOs,
        );
        assert!(o.stop());
        assert_eq!(
            o.runner().command_lines(),
            vec![
                "brew services stop ollama",
                "pgrep -f ollama (serve|runner)",
                "kill -TERM 101 202"
            ]
        );
    }

    #[test]
    fn test_stop_linux_without_server() {
        let o = ollama(ScriptedRunner::new().exits(1, "", ""), Platform::Linux);
        assert!(!o.stop());
        assert_eq!(
            o.runner().command_lines(),
            vec!["pgrep -f ollama (serve|runner)"]
        );
    }

    #[test]
    fn test_stop_unsupported_platforms() {
        for platform in [Platform::Windows, Platform::Unsupported] {
            let o = ollama(ScriptedRunner::new(), platform);
            assert!(!o.stop());
            assert!(o.runner().calls().is_empty());
        }
    }
}
