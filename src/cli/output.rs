//! Colored terminal output for handler responses
//!
//! Renders diagnostics, tables and errors from a [`ReleaseResponse`].

use crate::protocol::{DataValue, LogEntry, LogLevel, Manifest, ReleaseResponse, Row};
use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Print an info message (normal output)
    pub fn info(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
        let _ = write!(&mut buffer, "ℹ");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {}", message);
        self.bufwtr.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
        let _ = write!(&mut buffer, "✓");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {}", message);
        self.bufwtr.print(&buffer)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = write!(&mut buffer, "⚠");
        let _ = buffer.reset();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(&mut buffer, " {}", message);
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        if buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red))).is_err()
            || writeln!(&mut buffer, " {}", message).is_err()
            || buffer.reset().is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Blue)));
        let _ = write!(&mut buffer, "→");
        let _ = buffer.reset();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::White)));
        let _ = writeln!(&mut buffer, " {}", message);
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "═══ {} ═══", title);
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "    {}", message);
        self.bufwtr.print(&buffer)
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        self.bufwtr.print(&buffer)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Print one handler diagnostic with the style of its severity
    pub fn log_entry(&self, entry: &LogEntry) -> std::io::Result<()> {
        let line = format!("{} [{}] {}", entry.timestamp, entry.category, entry.message);
        match entry.level {
            LogLevel::Info => self.info(&line),
            LogLevel::Verbose => self.verbose(&line),
            LogLevel::Warn => self.warn(&line),
            LogLevel::Error => {
                if !self.quiet {
                    self.error(&line);
                }
                Ok(())
            }
        }
    }

    /// Print a table; columns are the union of all row keys
    pub fn table(&self, rows: &[Row]) -> std::io::Result<()> {
        if self.quiet || rows.is_empty() {
            return Ok(());
        }

        let mut columns: Vec<&str> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(*c).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let mut buffer = self.bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_bold(true));
        for (column, width) in columns.iter().zip(&widths) {
            let _ = write!(&mut buffer, "{:<width$}  ", column.to_uppercase(), width = *width);
        }
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer);
        for row in &cells {
            for (cell, width) in row.iter().zip(&widths) {
                let _ = write!(&mut buffer, "{:<width$}  ", cell, width = *width);
            }
            let _ = writeln!(&mut buffer);
        }
        self.bufwtr.print(&buffer)
    }

    /// Print handler diagnostics, then the result or the error
    pub fn render(&self, response: &ReleaseResponse) -> std::io::Result<()> {
        for entry in &response.logs {
            self.log_entry(entry)?;
        }

        if let Some(error) = &response.error {
            self.error(&format!("[{}] {}", error.code, error.message));
            for (key, value) in &error.details {
                match value {
                    DataValue::List(items) => {
                        self.println(&format!("{}:", key))?;
                        for item in items {
                            self.indent(item)?;
                        }
                    }
                    other => self.indent(&format!("{}: {}", key, display(other)))?,
                }
            }
            return Ok(());
        }

        let Some(data) = &response.data else {
            return Ok(());
        };
        if let Some(DataValue::Rows(rows)) = data.get("items") {
            self.table(rows)?;
        }
        for (key, value) in data.iter().filter(|(key, _)| key.as_str() != "items") {
            match value {
                DataValue::Rows(rows) => {
                    self.section(key)?;
                    self.table(rows)?;
                }
                DataValue::List(items) if !items.is_empty() => {
                    self.println(&format!("{}:", key))?;
                    for item in items {
                        self.indent(item)?;
                    }
                }
                DataValue::List(_) => {}
                other => self.println(&format!("{}: {}", key, display(other)))?,
            }
        }
        self.success(&format!("{} completed", response.metadata.command))
    }

    /// Print installed handlers
    pub fn manifests(&self, manifests: &[Manifest]) -> std::io::Result<()> {
        if manifests.is_empty() {
            return self.warn("no handlers installed");
        }
        for manifest in manifests {
            self.section(&format!("{} {}", manifest.name, manifest.version))?;
            if !manifest.description.is_empty() {
                self.println(&manifest.description)?;
            }
            for command in &manifest.commands {
                self.indent(&format!("{:<14} {}", command.name, command.description))?;
            }
        }
        Ok(())
    }
}

fn display(value: &DataValue) -> String {
    match value {
        DataValue::Scalar(s) => s.to_string(),
        DataValue::List(items) => items.join(", "),
        DataValue::Map(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", "),
        DataValue::Rows(rows) => format!("{} rows", rows.len()),
    }
}
