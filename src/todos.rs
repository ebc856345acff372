//! TODO/FIXME/HACK comment scanning
//!
//! `PatternAggregator` matches every line of every visited file against one
//! precompiled pattern per configured tag. Matching is line-oriented: a block
//! comment is only matched on the physical line that carries the tag.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::error::ScanError;
use crate::output::stdout_for;
use crate::scan::{FileEntry, ScanConfig, ScanWarning, TreeWalker, Visitor};

/// Tags searched when none are configured.
pub const DEFAULT_TAGS: &[&str] = &["TODO", "FIXME", "HACK", "BUG", "XXX"];

/// A tagged comment found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoMatch {
    pub file: PathBuf,
    /// 1-indexed
    pub line: usize,
    /// The configured tag, as given
    pub tag: String,
    /// Rest of the line after the tag, trimmed
    pub message: String,
}

/// Result of a TODO scan, in traversal and line order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoReport {
    pub matches: Vec<TodoMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
}

/// One compiled pattern per tag.
struct TagPattern {
    tag: String,
    regex: Regex,
}

/// Visitor collecting `TodoMatch`es.
pub struct PatternAggregator {
    patterns: Vec<TagPattern>,
    matches: Vec<TodoMatch>,
}

impl PatternAggregator {
    /// Compile one pattern per tag. Blank and repeated tags are dropped,
    /// keeping first-seen order; nothing left is an error.
    pub fn new<I, S>(tags: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique = unique_tags(tags);
        if unique.is_empty() {
            return Err(ScanError::NoTags);
        }
        Ok(Self::compile(unique))
    }

    fn compile(tags: Vec<String>) -> Self {
        let any_tag = tags
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let patterns = tags
            .into_iter()
            .map(|tag| TagPattern {
                regex: tag_regex(&tag, &any_tag),
                tag,
            })
            .collect();

        Self {
            patterns,
            matches: Vec::new(),
        }
    }

    /// Scan one file's content line by line.
    pub fn scan_content(&mut self, file: &Path, content: &str) {
        for (idx, line) in content.split('\n').enumerate() {
            for pattern in &self.patterns {
                if let Some(caps) = pattern.regex.captures(line) {
                    let message = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                    self.matches.push(TodoMatch {
                        file: file.to_path_buf(),
                        line: idx + 1,
                        tag: pattern.tag.clone(),
                        message: message.to_string(),
                    });
                }
            }
        }
    }

    pub fn finalize(self) -> TodoReport {
        TodoReport {
            matches: self.matches,
            warnings: Vec::new(),
        }
    }
}

impl Default for PatternAggregator {
    fn default() -> Self {
        Self::compile(unique_tags(DEFAULT_TAGS.iter().copied()))
    }
}

impl Visitor for PatternAggregator {
    fn visit_file(&mut self, file: &mut FileEntry<'_>) {
        let Some(content) = file.read_content() else {
            return;
        };
        let path = file.path().to_path_buf();
        self.scan_content(&path, &content);
    }
}

fn unique_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !unique.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            unique.push(tag.to_string());
        }
    }
    unique
}

/// Build the pattern for `tag`: a comment marker, optionally a run of other
/// configured tags, then the tag itself with an optional colon.
fn tag_regex(tag: &str, any_tag: &str) -> Regex {
    let pattern = format!(
        r"(?://|#|/\*)\s*(?:(?:{any}):?\s+)*?{tag}:?\s*(.*)",
        any = any_tag,
        tag = regex::escape(tag),
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("tag pattern built from escaped literals is invalid")
}

/// Walk `config.root` and collect tagged comments.
pub fn scan_tree<I, S>(config: ScanConfig, tags: I) -> Result<TodoReport, ScanError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut aggregator = PatternAggregator::new(tags)?;
    let summary = TreeWalker::new(config).walk(&mut aggregator)?;
    let mut report = aggregator.finalize();
    report.warnings = summary.warnings;
    Ok(report)
}

fn tag_color(tag: &str) -> Color {
    match tag.to_ascii_uppercase().as_str() {
        "TODO" => Color::Blue,
        "FIXME" | "BUG" => Color::Red,
        "HACK" => Color::Yellow,
        "XXX" => Color::Magenta,
        _ => Color::White,
    }
}

/// Print matches to stdout, one block per match.
pub fn print_todos(report: &TodoReport, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);

    let mut location = ColorSpec::new();
    location.set_dimmed(true);

    for item in &report.matches {
        let mut tag_spec = ColorSpec::new();
        tag_spec.set_fg(Some(tag_color(&item.tag))).set_bold(true);
        stdout.set_color(&tag_spec)?;
        write!(stdout, "[{}]", item.tag)?;
        stdout.set_color(&location)?;
        writeln!(stdout, " {}:{}", item.file.display(), item.line)?;
        stdout.reset()?;
        writeln!(stdout, "  {}", item.message)?;
        writeln!(stdout)?;
    }

    Ok(())
}
