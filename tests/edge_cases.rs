//! Edge case tests for prix

mod harness;

use harness::{TestTree, run_prix, run_prix_json, run_prix_with_env};

#[test]
fn test_empty_directory() {
    let tree = TestTree::new();
    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["total_files"], 0);
    assert_eq!(report["total_lines"], 0);
    assert_eq!(report["by_extension"], serde_json::json!([]));
}

#[test]
fn test_empty_file_counts_one_line() {
    let tree = TestTree::new();
    tree.add_file("empty.rs", "");
    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["total_files"], 1);
    assert_eq!(report["total_lines"], 1);
}

#[test]
fn test_file_as_root_fails() {
    let tree = TestTree::new();
    tree.add_file("main.rs", "fn main() {}");
    let (_stdout, stderr, success) = run_prix(tree.path(), &["count", "main.rs"]);
    assert!(!success);
    assert!(stderr.contains("is not a directory"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_utf8_is_still_scanned() {
    let tree = TestTree::new();
    tree.add_bytes("bin.c", &[0xff, 0xfe, b'\n', b'/', b'/', b' ', b'T', b'O', b'D', b'O', b':', b' ', b'x']);

    let report = run_prix_json(tree.path(), &["todo"]);
    let matches = report["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["line"], 2);
    assert_eq!(matches[0]["message"], "x");
}

#[test]
fn test_deeply_nested_directories() {
    let tree = TestTree::new();
    let path: Vec<String> = (0..40).map(|i| format!("level{}", i)).collect();
    tree.add_file(&format!("{}/deep.rs", path.join("/")), "a\nb");

    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["total_files"], 1);
    assert_eq!(report["total_lines"], 2);
}

#[test]
fn test_uppercase_extension_is_counted() {
    let tree = TestTree::new();
    tree.add_file("Main.RS", "x\ny");
    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["by_extension"][0]["extension"], "rs");
}

#[test]
fn test_dotfile_has_no_extension() {
    let tree = TestTree::new();
    tree.add_file(".rs", "hidden");
    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["total_files"], 0);
}

#[test]
fn test_excluded_name_matches_any_depth() {
    let tree = TestTree::new();
    tree.add_file("packages/app/node_modules/x/index.js", "1");
    tree.add_file("packages/app/src/app.js", "1");
    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["total_files"], 1);
}

#[test]
fn test_malformed_manifest_is_not_fatal() {
    let tree = TestTree::new();
    tree.add_file("package.json", "{ broken");
    let summary = run_prix_json(tree.path(), &["analyze"]);
    assert_eq!(summary["has_manifest"], true);
    assert_eq!(summary["dependencies"], 0);
}

#[test]
fn test_corrupt_alias_file_reads_as_empty() {
    let tree = TestTree::new();
    tree.add_file("aliases.json", "not json at all");
    let record = run_prix_json(tree.path(), &["alias"]);
    assert_eq!(record, serde_json::json!({}));

    // the next save replaces the corrupt file
    assert!(run_prix(tree.path(), &["alias", "set", "x", "ls"]).2);
    let record = run_prix_json(tree.path(), &["alias"]);
    assert_eq!(record, serde_json::json!({"x": "ls"}));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let tree = TestTree::new();
    tree.add_file("real/lib.rs", "1\n2");
    std::os::unix::fs::symlink(tree.path().join("real"), tree.path().join("alias_dir")).unwrap();
    std::os::unix::fs::symlink(tree.path().join("real/lib.rs"), tree.path().join("link.rs"))
        .unwrap();
    std::os::unix::fs::symlink(tree.path(), tree.path().join("real/loop")).unwrap();

    let report = run_prix_json(tree.path(), &["count"]);
    assert_eq!(report["total_files"], 1);
}

#[cfg(unix)]
#[test]
fn test_unlistable_directory_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TestTree::new();
    tree.add_file("ok.rs", "fine");
    let locked = tree.add_dir("locked");
    tree.add_file("locked/hidden.rs", "secret");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits; only assert when the restriction bites
    let listable = std::fs::read_dir(&locked).is_ok();
    let report = run_prix_json(tree.path(), &["count"]);
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    if listable {
        return;
    }

    assert_eq!(report["total_files"], 1);
    let warnings = report["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["kind"], "list_dir");
}

#[cfg(unix)]
#[test]
fn test_history_from_zsh_file() {
    let home = TestTree::new();
    home.add_file(
        ".zsh_history",
        ": 1700000000:0;git status\n: 1700000001:0;cargo test\n: 1700000002:0;git push\n",
    );

    let (stdout, stderr, success) = run_prix_with_env(
        home.path(),
        &["--json", "history", "--search", "GIT"],
        &[("HOME", home.path())],
    );
    assert!(success, "stderr: {}", stderr);
    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        entries,
        serde_json::json!([
            {"number": 2, "command": "git push"},
            {"number": 1, "command": "git status"},
        ])
    );
}

#[cfg(unix)]
#[test]
fn test_history_limit() {
    let home = TestTree::new();
    home.add_file(".bash_history", "one\ntwo\nthree\n");

    let (stdout, _stderr, success) = run_prix_with_env(
        home.path(),
        &["history", "-l", "2"],
        &[("HOME", home.path())],
    );
    assert!(success);
    assert!(stdout.contains("3. three"), "stdout: {}", stdout);
    assert!(stdout.contains("2. two"));
    assert!(!stdout.contains("one"));
    assert!(stdout.contains("Total commands: 3"), "stdout: {}", stdout);
}

#[cfg(unix)]
#[test]
fn test_history_run_entry() {
    let home = TestTree::new();
    home.add_file(".bash_history", "echo first-entry\necho second-entry\n");

    let (stdout, stderr, success) = run_prix_with_env(
        home.path(),
        &["history", "--run", "1", "--yes"],
        &[("HOME", home.path())],
    );
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("first-entry"));
    assert!(!stdout.contains("second-entry"));
}

#[cfg(unix)]
#[test]
fn test_history_missing_fails() {
    let home = TestTree::new();
    let (_stdout, stderr, success) =
        run_prix_with_env(home.path(), &["history"], &[("HOME", home.path())]);
    assert!(!success);
    assert!(stderr.contains("could not find shell history"), "stderr: {}", stderr);
}
