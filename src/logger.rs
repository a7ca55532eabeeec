//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output that only appears with `--verbose`
//! - `Outcome` for one-line result display of CLI commands
//!
//! # Example
//!
//! ```ignore
//! log!("serve"; "http://{}", addr);
//! debug!("resolve"; "strategy {} failed: {}", name, err);
//!
//! logger::outcome_ok("github.com -> data:image/png (1.2 KiB)");
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold().to_string(),
        "probe" => prefix.bright_cyan().bold().to_string(),
        "resolve" => prefix.bright_green().bold().to_string(),
        "store" => prefix.bright_magenta().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Outcome (one-line command results)
// ============================================================================

/// Get current UTC time formatted as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Timestamped result line for CLI commands.
///
/// Results of `resolve`, `probe` and `network` share one display so that
/// batch invocations read as an aligned list.
pub struct Outcome;

static OUTCOME: LazyLock<Mutex<Outcome>> = LazyLock::new(|| Mutex::new(Outcome));

impl Outcome {
    /// Display success message (✓ prefix, green).
    pub fn ok(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Display advisory message (⚠ prefix, yellow).
    pub fn warn(&mut self, message: &str) {
        self.display(format!("{}", "⚠".yellow()), message);
    }

    fn display(&mut self, symbol: String, message: &str) {
        // Held lock keeps lines from parallel callers whole.
        let mut stdout = stdout().lock();
        writeln!(stdout, "{}", Self::line(&symbol, message)).ok();
        stdout.flush().ok();
    }

    fn line(symbol: &str, message: &str) -> String {
        let timestamp = format!("[{}]", now()).dimmed().to_string();
        format!("{timestamp} {symbol} {message}")
    }
}

/// Global outcome: success
pub fn outcome_ok(message: &str) {
    OUTCOME.lock().ok(message);
}

/// Global outcome: advisory warning
pub fn outcome_warn(message: &str) {
    OUTCOME.lock().warn(message);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_line() {
        let line = Outcome::line("✓", "github.com -> dataUri");
        assert!(line.ends_with(" ✓ github.com -> dataUri"));
        assert!(line.contains(':'));
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_prefix_contains_module() {
        let prefix = colorize_prefix("probe", "probe");
        assert!(prefix.contains("[probe]"));
    }
}
