//! Parsing of a handler's diagnostic side channel.

use crate::diagnostics::VERBOSE_MARKER;
use crate::protocol::{LogEntry, LogLevel};

/// Category assigned to lines that do not follow `HH:MM:SS [category] message`
pub const FALLBACK_CATEGORY: &str = "handler";

/// Split raw stderr text into ordered log entries, skipping blank lines
pub fn parse_log_output(stderr: &str) -> Vec<LogEntry> {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_log_line)
        .collect()
}

/// Parse one diagnostic line
pub fn parse_log_line(line: &str) -> LogEntry {
    let mut parts = line.splitn(3, ' ');
    if let (Some(timestamp), Some(tag), Some(message)) = (parts.next(), parts.next(), parts.next())
        && let Some(category) = tag.strip_prefix('[').and_then(|t| t.strip_suffix(']'))
    {
        return LogEntry {
            timestamp: timestamp.to_string(),
            level: infer_level(message),
            category: category.to_string(),
            message: message.to_string(),
        };
    }

    LogEntry {
        timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        level: LogLevel::Info,
        category: FALLBACK_CATEGORY.to_string(),
        message: line.to_string(),
    }
}

/// Heuristic severity from message content
pub fn infer_level(message: &str) -> LogLevel {
    let lower = message.to_lowercase();
    if lower.contains("error") || lower.contains("failed") {
        LogLevel::Error
    } else if lower.contains("warn") {
        LogLevel::Warn
    } else if message.starts_with(VERBOSE_MARKER) {
        LogLevel::Verbose
    } else {
        LogLevel::Info
    }
}
