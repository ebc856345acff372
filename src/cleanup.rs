//! Removal of generated build and dependency directories

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::{debug, warn};

use crate::error::CleanupError;
use crate::output::stdout_for;

/// Directory names considered safe to delete, checked directly under the root.
pub const CLEANUP_CANDIDATES: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".next",
    "coverage",
    ".cache",
    "out",
    ".turbo",
];

/// A directory that failed to delete.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Candidates found under the root, in `CLEANUP_CANDIDATES` order
    pub candidates: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
    pub dry_run: bool,
}

/// Existing candidate directories directly under `root`.
///
/// Symlinks named like a candidate are not followed or reported.
pub fn find_candidates(root: &Path) -> Result<Vec<PathBuf>, CleanupError> {
    if !root.is_dir() {
        return Err(CleanupError::RootNotFound(root.to_path_buf()));
    }
    Ok(CLEANUP_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .filter(|path| {
            fs::symlink_metadata(path)
                .map(|m| m.is_dir())
                .unwrap_or(false)
        })
        .collect())
}

/// Delete every candidate. A failed deletion is recorded and the rest proceed.
pub fn remove_all(candidates: Vec<PathBuf>) -> CleanupReport {
    let mut report = CleanupReport {
        candidates: candidates.clone(),
        ..Default::default()
    };
    for path in candidates {
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                report.removed.push(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot remove directory");
                report.failures.push(CleanupFailure {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    report
}

/// A report for `--dry-run`: candidates only, nothing removed.
pub fn dry_run(candidates: Vec<PathBuf>) -> CleanupReport {
    CleanupReport {
        candidates,
        dry_run: true,
        ..Default::default()
    }
}

/// Print the candidate list, one path per line.
pub fn print_candidates(candidates: &[PathBuf], use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Yellow));

    let noun = if candidates.len() == 1 {
        "directory"
    } else {
        "directories"
    };
    writeln!(stdout, "Found {} {} to clean:", candidates.len(), noun)?;
    for path in candidates {
        stdout.set_color(&spec)?;
        writeln!(stdout, "  • {}", path.display())?;
    }
    stdout.reset()
}

pub fn print_failures(report: &CleanupReport, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red));
    for failure in &report.failures {
        stdout.set_color(&red)?;
        writeln!(stdout, "  ✗ {}: {}", failure.path.display(), failure.message)?;
    }
    stdout.reset()
}
