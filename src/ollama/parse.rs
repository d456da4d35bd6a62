//! Text parsing for Ollama CLI and process-table output

/// Model names from `ollama list` output.
///
/// Skips blank lines and the `NAME ...` header, keeping the first
/// whitespace-delimited token of every other line.
pub fn parse_model_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("NAME"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Model names from `ollama ps` output.
///
/// The first line is always the header; anything shorter than header plus
/// one row means nothing is loaded.
pub fn parse_running_models(stdout: &str) -> Vec<String> {
    let lines: Vec<&str> = stdout.trim().lines().collect();
    if lines.len() < 2 {
        return Vec::new();
    }

    lines[1..]
        .iter()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Numeric PIDs from `pgrep` output, ignoring anything else
pub fn parse_pids(stdout: &str) -> Vec<u32> {
    stdout
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect()
}

/// Whether a `tasklist` listing contains `image` (case-insensitive)
pub fn tasklist_contains(stdout: &str, image: &str) -> bool {
    stdout.to_lowercase().contains(&image.to_lowercase())
}

/// PIDs of `tasklist` rows mentioning both `image` and `needle`.
///
/// Rows are `Image Name  PID  Session Name ...`, so the PID is column two.
pub fn tasklist_pids(stdout: &str, image: &str, needle: &str) -> Vec<String> {
    let image = image.to_lowercase();
    let needle = needle.to_lowercase();

    stdout
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains(&image) && lower.contains(&needle)
        })
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}
