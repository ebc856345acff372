//! prix - a developer toolkit for source trees, shell history and command aliases

pub mod alias;
pub mod cleanup;
pub mod error;
pub mod history;
pub mod lines;
pub mod output;
pub mod probe;
pub mod runner;
pub mod scan;
pub mod todos;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use alias::{AliasRecord, AliasStore};
pub use error::{AliasError, CleanupError, HistoryError, ScanError};
pub use lines::{LineAggregator, LineReport, count_tree};
pub use output::{OutputConfig, Status, print_json, print_status};
pub use probe::{ProjectProbe, ProjectSummary};
pub use runner::{CommandFailure, CommandResult, CommandRunner, Shell};
pub use scan::{FileEntry, PathFilter, ScanConfig, ScanWarning, TreeWalker, Visitor, WalkSummary};
pub use todos::{PatternAggregator, TodoMatch, TodoReport, scan_tree};
