//! Test harness for prix integration tests

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub use prix::test_utils::TestTree;

/// Run the prix binary in `dir`. The alias file is pinned inside `dir` so
/// tests never touch the store next to the real executable.
pub fn run_prix(dir: &Path, args: &[&str]) -> (String, String, bool) {
    run_prix_with_env(dir, args, &[])
}

pub fn run_prix_with_env(
    dir: &Path,
    args: &[&str],
    env: &[(&str, &Path)],
) -> (String, String, bool) {
    let binary = env!("CARGO_BIN_EXE_prix");
    let mut cmd = Command::new(binary);
    cmd.args(args)
        .current_dir(dir)
        .env("PRIX_ALIAS_FILE", dir.join("aliases.json"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for (key, value) in env {
        cmd.env(key, value);
    }
    let output = cmd.output().expect("Failed to run prix");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// Run prix with `--json` and parse stdout.
pub fn run_prix_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let (stdout, stderr, success) = run_prix(dir, &full);
    assert!(success, "prix {:?} failed: {}", args, stderr);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_temp_dir() {
        let tree = TestTree::new();
        assert!(tree.path().exists());
    }

    #[test]
    fn test_harness_add_file() {
        let tree = TestTree::new();
        let file_path = tree.add_file("src/test.rs", "fn main() {}");
        assert!(file_path.exists());
    }

    #[test]
    fn test_harness_runs_binary() {
        let tree = TestTree::new();
        let (stdout, _stderr, success) = run_prix(tree.path(), &["--version"]);
        assert!(success);
        assert!(stdout.starts_with("prix "));
    }
}
