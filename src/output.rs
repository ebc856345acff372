//! Shared console and JSON output helpers

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::scan::ScanWarning;

/// Configuration for result output.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Emit machine-readable JSON instead of console text
    pub json: bool,
}

/// Open stdout with color enabled or disabled.
pub fn stdout_for(use_color: bool) -> StandardStream {
    let color_choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(color_choice)
}

/// Write a bold title with an underline rule.
pub fn header(out: &mut impl WriteColor, title: &str) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    out.set_color(&bold)?;
    writeln!(out, "{}", title)?;
    out.reset()?;
    writeln!(out, "{}", "─".repeat(title.chars().count()))
}

/// How an operation ended, for the final status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Partial { message: String, warnings: usize },
}

impl Status {
    /// Success, downgraded to partial success when warnings were collected.
    pub fn from_warnings(message: impl Into<String>, warnings: &[ScanWarning]) -> Self {
        if warnings.is_empty() {
            Status::Success(message.into())
        } else {
            Status::Partial {
                message: message.into(),
                warnings: warnings.len(),
            }
        }
    }
}

/// Print the final status line of an operation.
pub fn print_status(status: &Status, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);
    let mut spec = ColorSpec::new();
    writeln!(stdout)?;
    match status {
        Status::Success(message) => {
            spec.set_fg(Some(Color::Green));
            stdout.set_color(&spec)?;
            write!(stdout, "{}", message)?;
        }
        Status::Partial { message, warnings } => {
            spec.set_fg(Some(Color::Yellow));
            stdout.set_color(&spec)?;
            let noun = if *warnings == 1 { "warning" } else { "warnings" };
            write!(stdout, "{} ({} {})", message, warnings, noun)?;
        }
    }
    stdout.reset()?;
    writeln!(stdout)
}

/// Print any serializable report as pretty JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

/// Format a number with thousand separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}
