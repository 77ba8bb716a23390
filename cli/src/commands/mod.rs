//! Command implementations for the NoteHub CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod browse;
pub mod create;
pub mod delete;
pub mod list;
pub mod read;

use anyhow::Result;
use colored::Colorize;
use notehub_client::{Notice, NoticeKind};
use notehub_core::FieldErrors;
use serde::Serialize;

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Format a timestamp for human display.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
///
/// Counts characters, not bytes, so multi-byte titles are cut cleanly.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a notice the way the browse screen shows toasts.
pub fn print_notice(notice: &Notice) {
    let label = match notice.kind {
        NoticeKind::Info => "Info:".blue().bold(),
        NoticeKind::Success => "Done:".green().bold(),
        NoticeKind::Error => "Error:".red().bold(),
    };
    println!("{} {}", label, notice.message);
}

/// Print per-field validation messages.
pub fn print_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        println!("  {} {}", format!("{}:", field).red(), message);
    }
}
