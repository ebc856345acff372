//! Project analysis: marker file checks plus a counting walk

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::output::{format_number, header, stdout_for};
use crate::scan::{FileEntry, ScanConfig, ScanWarning, TreeWalker, Visitor};

pub const MANIFEST_FILE: &str = "package.json";
pub const VCS_MARKER: &str = ".git";
pub const README_FILE: &str = "README.md";
pub const LICENSE_FILE: &str = "LICENSE";

/// Manifest keys whose entries count as dependencies.
const DEPENDENCY_GROUPS: &[&str] = &["dependencies", "devDependencies"];

/// Directories skipped by the counting walk when none are given.
pub const PROBE_EXCLUDED: &[&str] = &["node_modules", ".git"];

/// What a probe found out about a project directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectSummary {
    pub files: usize,
    pub directories: usize,
    pub has_manifest: bool,
    pub has_vcs: bool,
    pub has_readme: bool,
    pub has_license: bool,
    /// Runtime plus development dependencies; 0 without a readable manifest
    pub dependencies: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
}

impl ProjectSummary {
    /// Advice for whatever project markers are missing.
    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut suggestions = Vec::new();
        if !self.has_readme {
            suggestions.push("Add a README.md describing the project");
        }
        if !self.has_license {
            suggestions.push("Add a LICENSE file");
        }
        if !self.has_vcs {
            suggestions.push("Run \"git init\" to initialize version control");
        }
        suggestions
    }
}

/// Counts entries without reading any file content.
#[derive(Debug, Default)]
struct EntryCounter {
    files: usize,
    directories: usize,
}

impl Visitor for EntryCounter {
    fn visit_file(&mut self, _file: &mut FileEntry<'_>) {
        self.files += 1;
    }

    fn enter_dir(&mut self, _path: &Path) {
        self.directories += 1;
    }
}

pub struct ProjectProbe {
    config: ScanConfig,
}

impl ProjectProbe {
    /// Probe `root` with the default exclusions and no extension filter.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(ScanConfig::new(root).excluding(PROBE_EXCLUDED.iter().copied()))
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn probe(&self) -> Result<ProjectSummary, ScanError> {
        let mut counter = EntryCounter::default();
        let summary = TreeWalker::new(self.config.clone()).walk(&mut counter)?;

        let root = self.config.root();
        let manifest = root.join(MANIFEST_FILE);
        let has_manifest = manifest.is_file();
        let dependencies = if has_manifest {
            count_dependencies(&manifest)
        } else {
            0
        };

        let result = ProjectSummary {
            files: counter.files,
            directories: counter.directories,
            has_manifest,
            has_vcs: root.join(VCS_MARKER).exists(),
            has_readme: root.join(README_FILE).is_file(),
            has_license: root.join(LICENSE_FILE).is_file(),
            dependencies,
            warnings: summary.warnings,
        };
        debug!(?result, "probe complete");
        Ok(result)
    }
}

/// Number of runtime plus development dependencies declared in a manifest.
/// Unreadable or malformed manifests count as zero. Each group is counted on
/// its own, so a group that is not an object contributes zero by itself.
fn count_dependencies(manifest: &Path) -> usize {
    let parsed = fs::read_to_string(manifest)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(value) => DEPENDENCY_GROUPS
            .iter()
            .map(|&group| match value.get(group) {
                Some(Value::Object(entries)) => entries.len(),
                None | Some(Value::Null) => 0,
                Some(_) => {
                    warn!(path = %manifest.display(), group = %group, "ignoring non-object dependency group");
                    0
                }
            })
            .sum(),
        Err(e) => {
            warn!(path = %manifest.display(), error = %e, "cannot parse manifest");
            0
        }
    }
}

fn write_check(out: &mut impl WriteColor, present: bool, label: &str, missing: &str) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    if present {
        spec.set_fg(Some(Color::Green));
        out.set_color(&spec)?;
        writeln!(out, "  ✓ {}", label)?;
    } else {
        spec.set_fg(Some(Color::Yellow));
        out.set_color(&spec)?;
        writeln!(out, "  ✗ {}", missing)?;
    }
    out.reset()
}

/// Print a project summary with its suggestions.
pub fn print_summary(summary: &ProjectSummary, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);

    header(&mut stdout, "Project Structure")?;
    writeln!(stdout, "Files:        {}", format_number(summary.files))?;
    writeln!(stdout, "Directories:  {}", format_number(summary.directories))?;
    writeln!(stdout)?;

    header(&mut stdout, "Configuration")?;
    write_check(&mut stdout, summary.has_manifest, MANIFEST_FILE, "package.json missing")?;
    write_check(&mut stdout, summary.has_vcs, "Git initialized", "Git not initialized")?;
    write_check(&mut stdout, summary.has_readme, README_FILE, "README.md missing")?;
    write_check(&mut stdout, summary.has_license, LICENSE_FILE, "LICENSE missing")?;

    if summary.has_manifest {
        writeln!(stdout)?;
        writeln!(stdout, "Dependencies: {}", summary.dependencies)?;
    }

    let suggestions = summary.suggestions();
    if !suggestions.is_empty() {
        writeln!(stdout)?;
        header(&mut stdout, "Suggestions")?;
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow));
        for suggestion in suggestions {
            stdout.set_color(&spec)?;
            writeln!(stdout, "  • {}", suggestion)?;
        }
        stdout.reset()?;
    }

    Ok(())
}
