//! Shell history listing and replay

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use termcolor::{ColorSpec, WriteColor};
use tracing::debug;

use crate::error::HistoryError;
use crate::output::stdout_for;
use crate::runner::CommandRunner;

pub const DEFAULT_LIMIT: usize = 50;

/// zsh extended history prefix, e.g. `: 1700000000:0;`
static ZSH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:\s*\d+:\d+;").expect("ZSH_PREFIX regex is invalid"));

/// A numbered history line. Higher numbers are more recent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub number: usize,
    pub command: String,
}

/// Candidate history files under `home`, in lookup order.
pub fn history_files(home: &Path) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            home.join("AppData")
                .join("Roaming")
                .join("Microsoft")
                .join("Windows")
                .join("PowerShell")
                .join("PSReadLine")
                .join("ConsoleHost_history.txt"),
        ]
    } else {
        vec![home.join(".bash_history"), home.join(".zsh_history")]
    }
}

/// Split history text into commands, oldest first.
pub fn parse_history(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| ZSH_PREFIX.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse the first readable file among `candidates`.
fn read_first(candidates: &[PathBuf]) -> Option<Vec<String>> {
    candidates.iter().find_map(|path| {
        let bytes = fs::read(path).ok()?;
        debug!(path = %path.display(), "reading shell history");
        Some(parse_history(&String::from_utf8_lossy(&bytes)))
    })
}

/// Load the user's shell history, oldest first.
///
/// On Windows a missing PSReadLine file falls back to `doskey /history`.
pub async fn load_history(
    home: &Path,
    runner: &CommandRunner,
) -> Result<Vec<String>, HistoryError> {
    let candidates = history_files(home);
    if let Some(history) = read_first(&candidates) {
        if !history.is_empty() || cfg!(windows) {
            return Ok(history);
        }
        return Err(HistoryError::NotFound);
    }

    if cfg!(windows) {
        let result = runner.run("doskey /history").await;
        if result.is_success() {
            return Ok(parse_history(&result.stdout));
        }
    }
    Err(HistoryError::NotFound)
}

fn filtered<'a>(history: &'a [String], search: Option<&str>) -> Vec<&'a str> {
    match search.map(str::to_lowercase) {
        Some(needle) => history
            .iter()
            .filter(|cmd| cmd.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect(),
        None => history.iter().map(String::as_str).collect(),
    }
}

/// The last `limit` commands matching `search`, most recent first.
///
/// Numbers count positions within the matching commands, so the most recent
/// match is numbered with the match total.
pub fn query(history: &[String], search: Option<&str>, limit: usize) -> Vec<HistoryEntry> {
    let matches = filtered(history, search);
    let total = matches.len();
    matches
        .iter()
        .rev()
        .take(limit)
        .enumerate()
        .map(|(index, command)| HistoryEntry {
            number: total - index,
            command: command.to_string(),
        })
        .collect()
}

/// The command numbered `number` by `query` with the same `search`.
pub fn entry(history: &[String], search: Option<&str>, number: usize) -> Result<String, HistoryError> {
    let matches = filtered(history, search);
    number
        .checked_sub(1)
        .and_then(|i| matches.get(i))
        .map(|s| s.to_string())
        .ok_or(HistoryError::NoSuchEntry(number))
}

/// Print history entries as `N. command`.
pub fn print_history(entries: &[HistoryEntry], use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);
    let mut number = ColorSpec::new();
    number.set_dimmed(true);
    let mut command = ColorSpec::new();
    command.set_fg(Some(termcolor::Color::Cyan));

    for item in entries {
        stdout.set_color(&number)?;
        write!(stdout, "{:>5}. ", item.number)?;
        stdout.set_color(&command)?;
        writeln!(stdout, "{}", item.command)?;
    }
    stdout.reset()
}
