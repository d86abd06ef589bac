//! Output formatting
//!
//! Decides what reaches the terminal: human-readable summaries, JSON for
//! scripting, and the log level handed to the tracing subscriber.

use serde::Serialize;

/// Output preferences from the global CLI flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,
    /// Results are printed as JSON
    pub json: bool,
    /// Verbosity level (-v count)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Default tracing filter directive for these flags
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Print a human-readable line unless quiet or JSON output is active
    pub fn line(&self, message: &str) {
        if !self.quiet && !self.json {
            println!("{message}");
        }
    }

    /// Print a value as pretty JSON when JSON output is active
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<bool> {
        if !self.json {
            return Ok(false);
        }
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(true)
    }
}

/// Print an error with its full cause chain to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} error: {error:#}", status::ERROR);
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}
