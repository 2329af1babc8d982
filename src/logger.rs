//! Logging utilities with colored module prefixes.
//!
//! All diagnostics go to stderr: stdout stays clean and the health command
//! talks to its scheduler only through the exit code.
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "found {} posts", posts.len());
//! debug!("probe"; "POST {}", url);
//! ```

use owo_colors::{OwoColorize, Stream, Style};
use std::{
    io::{Write, stderr},
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

/// Write `[module] message` to stderr.
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {message}").ok();
    stderr.flush().ok();
}

/// Pick the prefix style for a module
fn prefix_style(module_lower: &str) -> Style {
    match module_lower {
        "build" | "rss" => Style::new().bright_blue().bold(),
        "health" | "probe" => Style::new().bright_green().bold(),
        "change" => Style::new().bright_magenta().bold(),
        "skip" => Style::new().dimmed(),
        "error" => Style::new().bright_red().bold(),
        _ => Style::new().bright_yellow().bold(),
    }
}

/// Apply color to a module prefix, honoring `--color` and stderr TTY detection
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    let style = prefix_style(&module.to_ascii_lowercase());
    prefix
        .if_supports_color(Stream::Stderr, |text| text.style(style))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_without_color() {
        owo_colors::set_override(false);
        assert_eq!(colorize_prefix("build"), "[build]");
        assert_eq!(colorize_prefix("Change"), "[Change]");
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
