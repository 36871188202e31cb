//! Report command implementation.
//!
//! Re-validates an existing output root and rewrites both report files.

use clap::Args;

use crate::error::{MigrateError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{build_report, report_paths, MigrationReport, Severity};

use super::ConfigArgs;

/// Rebuild the migration report from an output root
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Exit with an error when any Critical finding exists
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ReportArgs, printer: &Printer) -> Result<MigrationReport> {
    let config = args.config.load(printer)?;
    let root = &config.output_root;
    printer.status("Validating", &display_path(root));

    let generated_at = chrono::Utc::now().to_rfc3339();
    let report = build_report(root, &config, &generated_at)?;

    let (json, html) = report_paths(root);
    report.write_json(&json)?;
    report.write_html(&html)?;

    for category in &report.categories {
        printer.info(
            &category.name,
            &format!(
                "{} valid of {} expected ({:.0}%)",
                category.valid_count,
                category.expected,
                category.progress * 100.0
            ),
        );
    }

    for missing in &report.missing_assets {
        printer.missing_asset(missing);
    }

    let critical = report
        .missing_assets
        .iter()
        .filter(|m| m.severity == Severity::Critical)
        .count();

    printer.success(
        "Finished",
        &format!(
            "{} of {} valid, overall {:.1}%",
            report.valid_assets,
            plural(report.total_assets, "asset", "assets"),
            report.overall_progress * 100.0
        ),
    );
    printer.info("Report", &printer.cyan(&display_path(&json)));
    printer.info("Report", &printer.cyan(&display_path(&html)));

    if args.strict && critical > 0 {
        return Err(MigrateError::Build {
            message: plural(critical, "critical finding", "critical findings"),
            help: Some(format!("See {}", display_path(&html))),
        });
    }

    Ok(report)
}
