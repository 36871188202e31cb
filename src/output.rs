//! Terminal output for the assetmig CLI.
//!
//! Status lines go to stderr with a right-aligned verb, coloured when stderr
//! is a terminal. Stdout is left for machine-readable output.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::{MissingAsset, Severity};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width of the verb column.
const VERB_WIDTH: usize = 12;

/// Cargo-style status printer.
pub struct Printer {
    color: bool,
    verbose: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
            verbose: false,
        }
    }

    /// Also print `verbose` lines.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Progress through a stage, e.g. "     Copying Sprites/Characters/Feca".
    pub fn status(&self, verb: &str, message: &str) {
        self.line(GREEN, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.line(GREEN, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.line(CYAN, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(YELLOW, verb, message);
    }

    /// Detail line, printed only with `--verbose`.
    pub fn verbose(&self, verb: &str, message: &str) {
        if self.verbose {
            self.line(DIM, verb, message);
        }
    }

    /// One indented line per missing asset, severity first.
    pub fn missing_asset(&self, missing: &MissingAsset) {
        eprintln!(
            "  {}: {} ({})",
            self.severity(missing.severity),
            missing.identifier,
            self.dim(&missing.reason)
        );
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// Paths and report locations.
    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// Severity name, red from `High` up and yellow below.
    fn severity(&self, severity: Severity) -> String {
        let color = if severity >= Severity::High { RED } else { YELLOW };
        self.paint(&format!("{BOLD}{color}"), severity.name())
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&self, color: &str, verb: &str, message: &str) {
        let verb = format!("{verb:>VERB_WIDTH$}");
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{} {message}", self.paint(&format!("{BOLD}{color}"), &verb));
    }
}

/// `plural(1, "clip", "clips")` gives "1 clip".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    let word = if n == 1 { singular } else { pluralized };
    format!("{} {}", n, word)
}

/// Path relative to the working directory when it lies below it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer(color: bool) -> Printer {
        Printer {
            color,
            verbose: false,
        }
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "clip", "clips"), "1 clip");
        assert_eq!(plural(0, "file", "files"), "0 files");
        assert_eq!(plural(5, "frame", "frames"), "5 frames");
    }

    #[test]
    fn test_display_path_outside_cwd() {
        let p = Path::new("/nonexistent/path/to/file");
        assert_eq!(display_path(p), "/nonexistent/path/to/file");
    }

    #[test]
    fn test_display_path_cwd_is_dot() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(display_path(&cwd), ".");
    }

    #[test]
    fn test_severity_colours() {
        assert_eq!(printer(false).severity(Severity::Critical), "Critical");
        assert_eq!(
            printer(true).severity(Severity::High),
            format!("{BOLD}{RED}High{RESET}")
        );
        assert_eq!(
            printer(true).severity(Severity::Medium),
            format!("{BOLD}{YELLOW}Medium{RESET}")
        );
    }

    #[test]
    fn test_plain_without_terminal() {
        let p = printer(false);
        assert_eq!(p.dim("x"), "x");
        assert_eq!(p.cyan("Reports/migration.json"), "Reports/migration.json");
    }
}
