//! TreeWalker - depth-first traversal feeding a visitor

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::ScanError;

use super::config::ScanConfig;
use super::filter::{PathFilter, extension_of};

/// Receives every qualifying file (and every descended directory) of a walk.
pub trait Visitor {
    fn visit_file(&mut self, file: &mut FileEntry<'_>);

    /// Called before the walker lists a subdirectory. The root is not reported.
    fn enter_dir(&mut self, _path: &Path) {}
}

impl<F> Visitor for F
where
    F: FnMut(&mut FileEntry<'_>),
{
    fn visit_file(&mut self, file: &mut FileEntry<'_>) {
        self(file)
    }
}

/// A file handed to a visitor. Content is only read when asked for.
pub struct FileEntry<'w> {
    path: PathBuf,
    warnings: &'w mut Vec<ScanWarning>,
}

impl FileEntry<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension, empty when the file has none.
    pub fn extension(&self) -> String {
        self.path
            .file_name()
            .map(|n| extension_of(&n.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Read the whole file as text. Invalid UTF-8 is replaced, not rejected.
    ///
    /// Returns `None` when the file cannot be read; the failure is recorded
    /// as a warning on the walk and the visitor should skip the file.
    pub fn read_content(&mut self) -> Option<String> {
        match fs::read(&self.path) {
            Ok(bytes) => Some(
                String::from_utf8(bytes)
                    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
            ),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "skipping unreadable file");
                self.warnings
                    .push(ScanWarning::new(&self.path, WarningKind::ReadFile, &e));
                None
            }
        }
    }
}

/// What went wrong with a skipped entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A directory could not be listed; its subtree was skipped
    ListDir,
    /// A file could not be read; it was skipped
    ReadFile,
    /// A directory entry could not be inspected; it was skipped
    Entry,
}

/// A skipped entry, reported to the caller instead of aborting the walk.
#[derive(Debug, Clone, Serialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub kind: WarningKind,
    pub message: String,
}

impl ScanWarning {
    fn new(path: &Path, kind: WarningKind, err: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            WarningKind::ListDir => "cannot list directory",
            WarningKind::ReadFile => "cannot read file",
            WarningKind::Entry => "cannot inspect entry",
        };
        write!(f, "{} '{}': {}", what, self.path.display(), self.message)
    }
}

/// Totals and warnings of one completed walk.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalkSummary {
    /// Files handed to the visitor
    pub files: usize,
    /// Directories descended into (the root excluded)
    pub directories: usize,
    pub warnings: Vec<ScanWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

/// A listed directory child. Fixed for the duration of the walk.
#[derive(Debug)]
struct DirEntryRef {
    name: String,
    path: PathBuf,
    kind: EntryKind,
}

/// Sequential depth-first walker.
///
/// Siblings are visited in file-name order and each subdirectory is fully
/// drained before the next sibling. An explicit stack replaces recursion so
/// depth is only bounded by memory.
pub struct TreeWalker {
    config: ScanConfig,
}

impl TreeWalker {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn walk<V: Visitor>(&self, visitor: &mut V) -> Result<WalkSummary, ScanError> {
        let root = self.config.root();
        let metadata = fs::metadata(root).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ScanError::RootNotFound(root.to_path_buf())
            } else {
                ScanError::Io {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut summary = WalkSummary::default();
        let top = list_dir(root, &mut summary.warnings).map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        debug!(root = %root.display(), "starting walk");

        let filter = PathFilter::new(&self.config);
        let mut stack = vec![top.into_iter()];

        while let Some(siblings) = stack.last_mut() {
            let Some(entry) = siblings.next() else {
                stack.pop();
                continue;
            };

            if !filter.should_descend(&entry.name, entry.kind == EntryKind::Dir) {
                trace!(path = %entry.path.display(), "filtered out");
                continue;
            }

            match entry.kind {
                EntryKind::Dir => {
                    summary.directories += 1;
                    visitor.enter_dir(&entry.path);
                    match list_dir(&entry.path, &mut summary.warnings) {
                        Ok(children) => stack.push(children.into_iter()),
                        Err(e) => {
                            warn!(path = %entry.path.display(), error = %e, "skipping unlistable directory");
                            summary
                                .warnings
                                .push(ScanWarning::new(&entry.path, WarningKind::ListDir, &e));
                        }
                    }
                }
                EntryKind::File => {
                    summary.files += 1;
                    let mut file = FileEntry {
                        path: entry.path,
                        warnings: &mut summary.warnings,
                    };
                    visitor.visit_file(&mut file);
                }
            }
        }

        debug!(
            files = summary.files,
            directories = summary.directories,
            warnings = summary.warnings.len(),
            "walk complete"
        );
        Ok(summary)
    }
}

/// List the immediate children of a directory, sorted by file name.
///
/// Symlinks and other special files are dropped, so link cycles can't occur.
/// Entries that fail mid-listing are recorded in `warnings` and skipped.
fn list_dir(path: &Path, warnings: &mut Vec<ScanWarning>) -> io::Result<Vec<DirEntryRef>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable directory entry");
                warnings.push(ScanWarning::new(path, WarningKind::ListDir, &e));
            }
        }
    }
    entries.sort_by_key(|e| e.file_name());

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let path = entry.path();
            let kind = entry_kind(&path, entry.file_type(), warnings)?;
            Some(DirEntryRef {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                kind,
            })
        })
        .collect())
}

/// Classify an entry, or `None` for anything the walk does not follow.
fn entry_kind(
    path: &Path,
    file_type: io::Result<fs::FileType>,
    warnings: &mut Vec<ScanWarning>,
) -> Option<EntryKind> {
    match file_type {
        Ok(t) if t.is_dir() => Some(EntryKind::Dir),
        Ok(t) if t.is_file() => Some(EntryKind::File),
        Ok(_) => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping uninspectable entry");
            warnings.push(ScanWarning::new(path, WarningKind::Entry, &e));
            None
        }
    }
}
