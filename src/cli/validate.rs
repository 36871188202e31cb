//! Validate command implementation.
//!
//! Scores an extraction root without touching the output.

use clap::Args;

use crate::error::{MigrateError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, validate_extraction, ExtractionSummary};

use super::ConfigArgs;

/// Check an extraction root before migrating
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the summary as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<ExtractionSummary> {
    let config = args.config.load(printer)?;
    printer.status("Checking", &display_path(&config.extraction_root));

    let summary = validate_extraction(&config.extraction_root, &config);

    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| MigrateError::Build {
            message: format!("Failed to serialize summary: {}", e),
            help: None,
        })?;
        println!("{}", json);
    }

    for count in &summary.per_category {
        let line = format!("{}/{} ({:.0}%)", count.found, count.expected, count.score * 100.0);
        if count.folder.is_some() {
            printer.info(count.category.name(), &line);
        } else {
            printer.warning(count.category.name(), &printer.dim("missing"));
        }
    }
    printer.verbose(
        "Characters",
        &plural(summary.characters.len(), "folder checked", "folders checked"),
    );

    print_diagnostics(&summary.diagnostics);

    let score = format!("{:.1}%", summary.overall_score * 100.0);
    if summary.overall_score < config.min_extraction_score || !summary.errors().is_empty() {
        return Err(MigrateError::Precondition {
            message: format!("extraction score {}", score),
            help: summary.errors().first().map(|e| e.to_string()),
        });
    }

    printer.success("Score", &printer.bold(&score));
    Ok(summary)
}
