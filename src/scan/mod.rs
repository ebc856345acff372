//! Recursive directory scanning
//!
//! `TreeWalker` performs a sequential depth-first walk rooted at
//! `ScanConfig::root`, consults `PathFilter` for every entry, and hands each
//! qualifying file to a `Visitor`. Visitors own their accumulated state and
//! are consumed after the walk to produce a report.
//!
//! Unlistable directories and unreadable files never abort a walk; they are
//! collected as `ScanWarning`s in the returned `WalkSummary`.

mod config;
mod filter;
mod walker;

pub use config::{DEFAULT_EXCLUDED, DEFAULT_EXTENSIONS, ScanConfig};
pub use filter::{PathFilter, extension_of};
pub use walker::{FileEntry, ScanWarning, TreeWalker, Visitor, WalkSummary, WarningKind};
