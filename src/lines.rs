//! Line counting by file extension
//!
//! `LineAggregator` is a walk visitor that tallies lines per extension.
//! Percentages are derived at display time only.

use std::io::{self, Write};

use indexmap::IndexMap;
use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::error::ScanError;
use crate::output::{format_number, header, stdout_for};
use crate::scan::{FileEntry, ScanConfig, ScanWarning, TreeWalker, Visitor};

/// Lines counted for one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineStat {
    pub extension: String,
    pub lines: usize,
}

impl LineStat {
    /// Share of `total` lines, in percent.
    pub fn percentage_of(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.lines as f64 * 100.0 / total as f64
        }
    }
}

/// Result of a line count.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineReport {
    pub total_files: usize,
    pub total_lines: usize,
    /// Sorted by line count descending; ties keep first-seen order
    pub by_extension: Vec<LineStat>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
}

/// Visitor accumulating line totals. One file's content is held at a time.
#[derive(Debug, Default)]
pub struct LineAggregator {
    total_files: usize,
    total_lines: usize,
    /// Insertion order doubles as first-encountered order for tie breaking
    by_extension: IndexMap<String, usize>,
}

impl LineAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file's content under `extension`.
    pub fn record(&mut self, extension: String, content: &str) {
        let lines = count_lines(content);
        self.total_files += 1;
        self.total_lines += lines;
        *self.by_extension.entry(extension).or_insert(0) += lines;
    }

    pub fn finalize(self) -> LineReport {
        let mut by_extension: Vec<LineStat> = self
            .by_extension
            .into_iter()
            .map(|(extension, lines)| LineStat { extension, lines })
            .collect();
        // sort_by is stable, so equal counts stay in first-seen order
        by_extension.sort_by(|a, b| b.lines.cmp(&a.lines));

        LineReport {
            total_files: self.total_files,
            total_lines: self.total_lines,
            by_extension,
            warnings: Vec::new(),
        }
    }
}

impl Visitor for LineAggregator {
    fn visit_file(&mut self, file: &mut FileEntry<'_>) {
        let Some(content) = file.read_content() else {
            return;
        };
        self.record(file.extension(), &content);
    }
}

/// Number of `\n`-separated segments. An empty file counts as one line.
pub fn count_lines(content: &str) -> usize {
    content.split('\n').count()
}

/// Walk `config.root` and count lines of every matching file.
pub fn count_tree(config: ScanConfig) -> Result<LineReport, ScanError> {
    let mut aggregator = LineAggregator::new();
    let summary = TreeWalker::new(config).walk(&mut aggregator)?;
    let mut report = aggregator.finalize();
    report.warnings = summary.warnings;
    Ok(report)
}

/// Print a line report to stdout with optional color.
pub fn print_line_report(report: &LineReport, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);

    header(&mut stdout, "Line Counter")?;
    writeln!(stdout, "Total Files:  {}", format_number(report.total_files))?;
    writeln!(stdout, "Total Lines:  {}", format_number(report.total_lines))?;

    if report.by_extension.is_empty() {
        return Ok(());
    }

    writeln!(stdout)?;
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    stdout.set_color(&bold)?;
    writeln!(stdout, "By Extension:")?;
    stdout.reset()?;

    let mut ext_color = ColorSpec::new();
    ext_color.set_fg(Some(Color::Yellow));

    for stat in &report.by_extension {
        let label = if stat.extension.is_empty() {
            "(none)".to_string()
        } else {
            format!(".{}", stat.extension)
        };
        write!(stdout, "  ")?;
        stdout.set_color(&ext_color)?;
        write!(stdout, "{:<10}", label)?;
        stdout.reset()?;
        writeln!(
            stdout,
            "{:>10} lines ({:.1}%)",
            format_number(stat.lines),
            stat.percentage_of(report.total_lines)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines("one\n"), 2);
        assert_eq!(count_lines("one\ntwo\nthree"), 3);
        assert_eq!(count_lines("\n\n"), 3);
        assert_eq!(count_lines("crlf\r\nline"), 2);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut agg = LineAggregator::new();
        agg.record("py".into(), "a\nb");
        agg.record("rs".into(), "a\nb\nc");
        agg.record("go".into(), "a\nb");
        agg.record("rs".into(), "");

        let report = agg.finalize();
        assert_eq!(report.total_files, 4);
        assert_eq!(report.total_lines, 8);
        let order: Vec<_> = report
            .by_extension
            .iter()
            .map(|s| (s.extension.as_str(), s.lines))
            .collect();
        assert_eq!(order, vec![("rs", 4), ("py", 2), ("go", 2)]);
    }

    #[test]
    fn test_percentage_of() {
        let stat = LineStat {
            extension: "rs".into(),
            lines: 25,
        };
        assert_eq!(stat.percentage_of(100), 25.0);
        assert_eq!(stat.percentage_of(0), 0.0);
    }

    #[test]
    fn test_count_tree_respects_filters() {
        let tree = TestTree::new();
        tree.add_file("src/main.rs", "fn main() {\n}\n");
        tree.add_file("src/empty.rs", "");
        tree.add_file("script.PY", "print(1)");
        tree.add_file("README.md", "# readme\n");
        tree.add_file("node_modules/dep/index.js", "a\nb\nc\nd\n");

        let report = count_tree(ScanConfig::with_source_defaults(tree.path())).unwrap();
        assert_eq!(report.total_files, 3);
        assert_eq!(report.total_lines, 3 + 1 + 1);
        assert_eq!(report.by_extension[0].extension, "rs");
        assert_eq!(report.by_extension[0].lines, 4);
        assert_eq!(report.by_extension[1].extension, "py");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_count_tree_is_idempotent() {
        let tree = TestTree::new();
        tree.add_file("a.rs", "1\n2\n3");
        tree.add_file("b/c.go", "1\n2");
        tree.add_file("b/d.rs", "");

        let first = count_tree(ScanConfig::with_source_defaults(tree.path())).unwrap();
        let second = count_tree(ScanConfig::with_source_defaults(tree.path())).unwrap();
        assert_eq!(first.total_files, second.total_files);
        assert_eq!(first.total_lines, second.total_lines);
        assert_eq!(first.by_extension, second.by_extension);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_becomes_warning() {
        use std::os::unix::fs::PermissionsExt;

        let tree = TestTree::new();
        tree.add_file("ok.rs", "fine");
        let locked = tree.add_file("locked.rs", "secret");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // root can read anything; only assert when the permission bites
        if std::fs::read(&locked).is_ok() {
            return;
        }

        let report = count_tree(ScanConfig::with_source_defaults(tree.path())).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, crate::scan::WarningKind::ReadFile);
    }
}
