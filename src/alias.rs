//! Persistent command aliases
//!
//! Aliases live in one human-editable JSON object mapping names to command
//! strings. Every operation loads the whole record and writes the whole
//! record back; concurrent writers are not merged and the last save wins.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tempfile::NamedTempFile;
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::{debug, warn};

use crate::error::AliasError;
use crate::output::stdout_for;

/// File name of the alias record next to the executable.
pub const ALIAS_FILE_NAME: &str = ".prix_aliases.json";

/// Check a name against `[A-Za-z0-9_-]+`.
pub fn validate_name(name: &str) -> Result<(), AliasError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(AliasError::InvalidName(name.to_string()))
    }
}

/// Alias name to command string, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasRecord {
    entries: IndexMap<String, String>,
}

impl AliasRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an alias, returning the command it replaced.
    pub fn insert(&mut self, name: &str, command: &str) -> Result<Option<String>, AliasError> {
        validate_name(name)?;
        if command.trim().is_empty() {
            return Err(AliasError::EmptyCommand);
        }
        Ok(self.entries.insert(name.to_string(), command.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// File-backed alias storage.
#[derive(Debug, Clone)]
pub struct AliasStore {
    path: PathBuf,
}

impl AliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store kept next to the running executable.
    pub fn beside_executable() -> io::Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| io::Error::other("executable has no parent directory"))?;
        Ok(Self::new(dir.join(ALIAS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. Missing or corrupt storage yields an empty record.
    pub fn load(&self) -> AliasRecord {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no alias file yet");
                return AliasRecord::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read alias file");
                return AliasRecord::new();
            }
        };

        let mut record = AliasRecord::new();
        match serde_json::from_str::<IndexMap<String, serde_json::Value>>(&text) {
            Ok(entries) => {
                for (name, value) in entries {
                    let Some(command) = value.as_str() else {
                        warn!(name = %name, "dropping alias whose command is not a string");
                        continue;
                    };
                    if let Err(e) = record.insert(&name, command) {
                        warn!(name = %name, error = %e, "dropping invalid alias");
                    }
                }
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt alias file");
            }
        }
        record
    }

    /// Replace the stored record. The write is atomic: readers see either the
    /// old file or the new one.
    pub fn save(&self, record: &AliasRecord) -> Result<(), AliasError> {
        let io_err = |source| AliasError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, record)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(path = %self.path.display(), count = record.len(), "saved aliases");
        Ok(())
    }

    /// Add or replace one alias, returning the replaced command.
    pub fn set(&self, name: &str, command: &str) -> Result<Option<String>, AliasError> {
        let mut record = self.load();
        let previous = record.insert(name, command)?;
        self.save(&record)?;
        Ok(previous)
    }

    /// Delete one alias, returning its command.
    pub fn remove(&self, name: &str) -> Result<String, AliasError> {
        let mut record = self.load();
        let command = record
            .remove(name)
            .ok_or_else(|| AliasError::NotFound(name.to_string()))?;
        self.save(&record)?;
        Ok(command)
    }

    /// Delete every alias, returning how many there were.
    pub fn clear(&self) -> Result<usize, AliasError> {
        let count = self.load().len();
        self.save(&AliasRecord::new())?;
        Ok(count)
    }

    /// Look up the command for `name`.
    pub fn get(&self, name: &str) -> Result<String, AliasError> {
        self.load()
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| AliasError::NotFound(name.to_string()))
    }
}

/// Print every alias as `name → command`.
pub fn print_aliases(record: &AliasRecord, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);
    let mut name_spec = ColorSpec::new();
    name_spec.set_fg(Some(Color::Cyan));
    let mut arrow = ColorSpec::new();
    arrow.set_dimmed(true);

    for (name, command) in record.iter() {
        write!(stdout, "  ")?;
        stdout.set_color(&name_spec)?;
        write!(stdout, "{}", name)?;
        stdout.set_color(&arrow)?;
        write!(stdout, " → ")?;
        stdout.reset()?;
        writeln!(stdout, "{}", command)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;

    fn store(tree: &TestTree) -> AliasStore {
        AliasStore::new(tree.path().join(ALIAS_FILE_NAME))
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("build").is_ok());
        assert!(validate_name("dev-server_2").is_ok());
        assert!(validate_name("bad name").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("semi;colon").is_err());
        assert!(validate_name("ünïcode").is_err());
    }

    #[test]
    fn test_set_then_load() {
        let tree = TestTree::new();
        let store = store(&tree);
        assert_eq!(store.set("build", "npm run build").unwrap(), None);

        let record = store.load();
        assert_eq!(record.get("build"), Some("npm run build"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_set_replaces_and_returns_previous() {
        let tree = TestTree::new();
        let store = store(&tree);
        store.set("dev", "npm run dev").unwrap();
        let previous = store.set("dev", "vite").unwrap();
        assert_eq!(previous.as_deref(), Some("npm run dev"));
        assert_eq!(store.get("dev").unwrap(), "vite");
    }

    #[test]
    fn test_remove_then_load() {
        let tree = TestTree::new();
        let store = store(&tree);
        store.set("build", "npm run build").unwrap();
        store.set("test", "npm test").unwrap();

        assert_eq!(store.remove("build").unwrap(), "npm run build");
        let record = store.load();
        assert!(!record.contains("build"));
        assert!(record.contains("test"));
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let tree = TestTree::new();
        let err = store(&tree).remove("ghost").unwrap_err();
        assert!(matches!(err, AliasError::NotFound(_)));
    }

    #[test]
    fn test_invalid_name_is_rejected_without_writing() {
        let tree = TestTree::new();
        let store = store(&tree);
        let err = store.set("bad name", "x").unwrap_err();
        assert!(matches!(err, AliasError::InvalidName(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let tree = TestTree::new();
        let err = store(&tree).set("noop", "   ").unwrap_err();
        assert!(matches!(err, AliasError::EmptyCommand));
    }

    #[test]
    fn test_clear() {
        let tree = TestTree::new();
        let store = store(&tree);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.load().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let tree = TestTree::new();
        assert!(store(&tree).load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let tree = TestTree::new();
        tree.add_file(ALIAS_FILE_NAME, "{ this is not json");
        assert!(store(&tree).load().is_empty());

        tree.add_file(ALIAS_FILE_NAME, r#"["an", "array"]"#);
        assert!(store(&tree).load().is_empty());
    }

    #[test]
    fn test_hand_edited_invalid_names_are_dropped() {
        let tree = TestTree::new();
        tree.add_file(ALIAS_FILE_NAME, r#"{"ok": "ls", "not ok": "pwd"}"#);
        let record = store(&tree).load();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("ok"), Some("ls"));
    }

    #[test]
    fn test_non_string_commands_are_dropped_and_others_survive_save() {
        let tree = TestTree::new();
        tree.add_file(
            ALIAS_FILE_NAME,
            r#"{"build": "npm run build", "n": 1, "obj": {"a": "b"}, "test": "npm test"}"#,
        );
        let store = store(&tree);
        let record = store.load();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("build"), Some("npm run build"));

        store.set("x", "echo x").unwrap();
        let record = store.load();
        assert!(record.contains("build"));
        assert!(record.contains("test"));
        assert!(record.contains("x"));
        assert!(!record.contains("n"));
    }

    #[test]
    fn test_saved_file_is_flat_json_in_insertion_order() {
        let tree = TestTree::new();
        let store = store(&tree);
        store.set("zeta", "z").unwrap();
        store.set("alpha", "a").unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"zeta": "z", "alpha": "a"}));
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let tree = TestTree::new();
        let store = AliasStore::new(tree.path().join("nested/dir").join(ALIAS_FILE_NAME));
        store.set("x", "echo x").unwrap();
        assert!(store.path().is_file());
    }
}
