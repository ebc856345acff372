//! Configuration types for directory scans

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Source extensions scanned by `count` and `todo` when none are given.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "py", "java", "cpp", "c", "go", "rs",
];

/// Directory names skipped by `count` and `todo` when none are given.
pub const DEFAULT_EXCLUDED: &[&str] = &["node_modules", "dist", "build", ".git"];

/// Configuration for one scan. Built once, read-only during the walk.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    /// Directory names never descended into (exact, case-sensitive)
    pub excluded_names: HashSet<String>,
    /// Lower-cased extensions without the leading dot. `None` accepts every file.
    pub included_extensions: Option<HashSet<String>>,
}

impl ScanConfig {
    /// A config that accepts every file and excludes nothing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_names: HashSet::new(),
            included_extensions: None,
        }
    }

    /// The source-file defaults used by the line counter and TODO scanner.
    pub fn with_source_defaults(root: impl Into<PathBuf>) -> Self {
        Self::new(root)
            .excluding(DEFAULT_EXCLUDED.iter().copied())
            .with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }

    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        self
    }

    /// Restrict processing to the given extensions. An empty list means no filter.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: HashSet<String> = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self.included_extensions = if set.is_empty() { None } else { Some(set) };
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Normalize a user-supplied extension: trim, drop a leading dot, lower-case.
fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_normalized() {
        let config = ScanConfig::new(".").with_extensions([".RS", " py ", "", "Js"]);
        let exts = config.included_extensions.unwrap();
        assert_eq!(exts.len(), 3);
        assert!(exts.contains("rs"));
        assert!(exts.contains("py"));
        assert!(exts.contains("js"));
    }

    #[test]
    fn test_empty_extension_list_means_no_filter() {
        let config = ScanConfig::new(".").with_extensions(Vec::<String>::new());
        assert!(config.included_extensions.is_none());
    }

    #[test]
    fn test_source_defaults() {
        let config = ScanConfig::with_source_defaults("src");
        assert!(config.excluded_names.contains("node_modules"));
        assert!(config.excluded_names.contains(".git"));
        assert_eq!(config.included_extensions.as_ref().unwrap().len(), 10);
        assert_eq!(config.root(), Path::new("src"));
    }

    #[test]
    fn test_excluding_drops_blank_names() {
        let config = ScanConfig::new(".").excluding(["target", " ", ""]);
        assert_eq!(config.excluded_names.len(), 1);
    }
}
