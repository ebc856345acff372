//! Entry filtering for directory scans

use std::path::Path;

use super::config::ScanConfig;

/// Decides which entries a walk descends into or hands to its visitor.
///
/// Directories are only checked against the exclusion set; files are only
/// checked against the extension allow-list.
pub struct PathFilter<'a> {
    config: &'a ScanConfig,
}

impl<'a> PathFilter<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    pub fn should_descend(&self, name: &str, is_dir: bool) -> bool {
        if is_dir {
            return !self.config.excluded_names.contains(name);
        }
        match &self.config.included_extensions {
            None => true,
            Some(allowed) => allowed.contains(&extension_of(name)),
        }
    }
}

/// Lower-cased text after the last `.` of a file name.
///
/// Names without a dot and dot-files like `.bashrc` have no extension.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
