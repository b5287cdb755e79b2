//! Handler-side diagnostics.
//!
//! Records are emitted through the `log` facade with a category as the
//! target (`log::info!(target: diagnostics::GUARD, ...)`) and written to
//! stderr as `HH:MM:SS [category] message`, which the gateway parses back
//! into structured log entries.

use log::{Level, LevelFilter};
use std::io::Write;

/// Handler initialization and config generation
pub const INIT: &str = "init";
/// Configuration loading and persistence
pub const CONFIG: &str = "config";
/// Release-readiness checks
pub const PREFLIGHT: &str = "pre-flight";
/// Version guard
pub const GUARD: &str = "guard";
/// Side-effecting release steps
pub const EXEC: &str = "exec";
/// Compensation steps
pub const ROLLBACK: &str = "rollback";

/// All categories, in the order they appear during a release
pub const CATEGORIES: [&str; 6] = [INIT, CONFIG, PREFLIGHT, GUARD, EXEC, ROLLBACK];

/// Marker that flags a line as verbose
pub const VERBOSE_MARKER: &str = "V$";

/// Install the stderr logger for a handler process.
///
/// Category targets log at `Debug` when `verbose`, `Info` otherwise; other
/// targets only surface warnings. `RUST_LOG` directives are applied on top.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .target(env_logger::Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .format(|buf, record| {
            let time = chrono::Local::now().format("%H:%M:%S").to_string();
            writeln!(
                buf,
                "{}",
                format_line(&time, record.target(), record.level(), &record.args().to_string())
            )
        });
    for category in CATEGORIES {
        builder.filter(Some(category), level);
    }
    builder.parse_env(env_logger::Env::default());

    // A logger may already be installed when running under a test harness
    let _ = builder.try_init();
}

/// Render a record as side-channel lines.
///
/// Every line of a multi-line message (tool output, error chains) gets its
/// own timestamp, category and severity marker; blank lines are dropped.
pub fn format_line(time: &str, category: &str, level: Level, message: &str) -> String {
    let marker = match level {
        Level::Error => "error: ",
        Level::Warn => "warning: ",
        Level::Info => "",
        Level::Debug | Level::Trace => "V$ ",
    };
    let lines: Vec<String> = message
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("{} [{}] {}{}", time, category, marker, line))
        .collect();
    if lines.is_empty() {
        return format!("{} [{}] {}", time, category, marker.trim_end());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LogLevel;

    #[test]
    fn test_format_line_markers() {
        assert_eq!(
            format_line("12:00:00", GUARD, Level::Info, "local version 1.2.2"),
            "12:00:00 [guard] local version 1.2.2"
        );
        assert_eq!(
            format_line("12:00:00", EXEC, Level::Debug, "git push origin HEAD"),
            "12:00:00 [exec] V$ git push origin HEAD"
        );
        assert_eq!(
            format_line("12:00:00", GUARD, Level::Warn, "no tags yet"),
            "12:00:00 [guard] warning: no tags yet"
        );
    }

    #[test]
    fn test_multiline_message_keeps_category_and_severity() {
        let rendered = format_line(
            "12:00:00",
            EXEC,
            Level::Error,
            "goreleaser release --clean failed:\n  GITHUB_TOKEN not set\n\n  exit status 1",
        );
        assert_eq!(
            rendered,
            "12:00:00 [exec] error: goreleaser release --clean failed:\n\
             12:00:00 [exec] error:   GITHUB_TOKEN not set\n\
             12:00:00 [exec] error:   exit status 1"
        );

        let entries = crate::gateway::parse_log_output(&rendered);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.category == EXEC && e.level == LogLevel::Error));
        assert_eq!(entries[1].message, "error:   GITHUB_TOKEN not set");
    }
}
