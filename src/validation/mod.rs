//! Validation for both ends of a migration.
//!
//! `extraction` checks the raw input before processing starts and gates the
//! run on its score. `report` re-scans the processed output and produces the
//! migration report. Used by `assetmig migrate`, `assetmig validate` and
//! `assetmig report`.

mod diagnostic;
mod extraction;
mod report;

pub use diagnostic::{Diagnostic, Diagnostics, Level};
pub use extraction::{
    validate_extraction, CategoryCount, CharacterCheck, ExtractionSummary, REQUIRED_CATEGORIES,
};
pub use report::{
    audio_duration, build_report, report_paths, AssetKind, CategoryReport, MigrationReport,
    MissingAsset, Severity, ValidationEntry, REPORT_HTML, REPORT_JSON,
};

/// Print diagnostics to stderr.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for d in diagnostics.iter() {
        let level = match d.level {
            Level::Error => "error",
            Level::Warning => "warning",
        };
        eprintln!("  {}[{}]: {}", level, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("    help: {}", help);
        }
    }

    let errors = diagnostics.error_count();
    let warnings = diagnostics.warning_count();

    if errors > 0 {
        eprintln!(
            "Extraction check failed: {} error(s), {} warning(s)",
            errors, warnings
        );
    } else if warnings > 0 {
        eprintln!("Extraction check passed ({} warning(s))", warnings);
    } else {
        eprintln!("Extraction check passed.");
    }
}
