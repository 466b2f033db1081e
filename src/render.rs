//! Plain-text output for the `types` and `classify` commands.

use rvsnoop_core::config::{ColorMode, OutputConfig};
use rvsnoop_core::{Color, Record, RecordType};
use std::fmt::Write as _;
use std::io::IsTerminal;

/// One line per type: `<n>. <name> <color> [hidden] <rule>`.
pub fn type_row(position: usize, record_type: &RecordType) -> String {
    let hidden = if record_type.is_selected() { "" } else { " [hidden]" };
    format!(
        "{}. {} {}{} {}",
        position,
        record_type.name(),
        record_type.color(),
        hidden,
        record_type.matcher()
    )
}

/// Formats classified records as `<type>\t<color>\t<send subject>`, optionally
/// prefixed with a timestamp column.
#[derive(Debug, Clone)]
pub struct LineFormat {
    pub show_timestamps: bool,
    pub timestamp_format: String,
    pub ansi: bool,
}

impl LineFormat {
    pub fn plain() -> Self {
        Self {
            show_timestamps: false,
            timestamp_format: String::new(),
            ansi: false,
        }
    }

    /// Resolve [`ColorMode::Auto`] against whether stdout is a terminal.
    pub fn from_config(output: &OutputConfig) -> Self {
        let ansi = match output.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        };
        Self {
            show_timestamps: output.show_timestamps,
            timestamp_format: output.timestamp_format.clone(),
            ansi,
        }
    }

    pub fn classified<R: Record + ?Sized>(&self, record: &R, record_type: &RecordType) -> String {
        let mut line = String::new();
        if self.show_timestamps {
            let ts = record.timestamp();
            // chrono reports a bad format string as a fmt error
            if write!(line, "{}", ts.format(&self.timestamp_format)).is_err() {
                line.clear();
                line.push_str(&ts.to_rfc3339());
            }
            line.push('\t');
        }
        if self.ansi {
            line.push_str(&paint(record_type.name(), record_type.color()));
        } else {
            line.push_str(record_type.name());
        }
        line.push_str(&format!("\t{}\t{}", record_type.color(), record.send_subject()));
        line
    }
}

fn paint(text: &str, color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m{text}\x1b[0m", color.r, color.g, color.b)
}
