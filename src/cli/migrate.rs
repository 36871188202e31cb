//! Migrate command implementation.
//!
//! Runs the whole pipeline with an indicatif progress bar.

use std::sync::Mutex;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{CancelToken, MigrationSummary, Pipeline, ProgressSink, Stage};
use crate::validation::{report_paths, Severity};

use super::ConfigArgs;

/// Run the full migration
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Worker threads (default: available parallelism)
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Progress bar with one 0..100 pass per stage.
struct BarProgress {
    bar: ProgressBar,
    stage: Mutex<Option<Stage>>,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self {
            bar,
            stage: Mutex::new(None),
        }
    }
}

impl ProgressSink for BarProgress {
    fn on_progress(&self, stage: Stage, fraction: f32) {
        if let Ok(mut current) = self.stage.lock() {
            if *current != Some(stage) {
                *current = Some(stage);
                self.bar.set_message(stage.to_string());
                self.bar.reset();
            }
        }
        self.bar.set_position((fraction.clamp(0.0, 1.0) * 100.0) as u64);
    }
}

pub fn run(args: MigrateArgs, printer: &Printer) -> Result<MigrationSummary> {
    let mut config = args.config.load(printer)?;
    if args.workers.is_some() {
        config.workers = args.workers;
    }

    printer.status(
        "Migrating",
        &format!(
            "{} -> {}",
            display_path(&config.extraction_root),
            display_path(&config.output_root)
        ),
    );
    printer.verbose("Workers", &config.effective_workers().to_string());

    let output_root = config.output_root.clone();
    let pipeline = Pipeline::new(config);
    let generated_at = chrono::Utc::now().to_rfc3339();
    let cancel = CancelToken::new();

    let summary = if args.no_progress {
        pipeline.run(&generated_at, &crate::pipeline::NoProgress, &cancel)?
    } else {
        let progress = BarProgress::new();
        let summary = pipeline.run(&generated_at, &progress, &cancel);
        progress.bar.finish_and_clear();
        summary?
    };

    print_summary(&summary, printer);

    if summary.cancelled {
        printer.warning("Cancelled", "migration stopped before the report was written");
        return Ok(summary);
    }

    let (json, html) = report_paths(&output_root);
    printer.success(
        "Finished",
        &format!(
            "{} processed, {} failed, score {:.1}%",
            plural(summary.files_processed, "file", "files"),
            summary.files_failed,
            summary.final_score * 100.0
        ),
    );
    printer.info("Report", &printer.cyan(&display_path(&json)));
    printer.info("Report", &printer.cyan(&display_path(&html)));

    Ok(summary)
}

fn print_summary(summary: &MigrationSummary, printer: &Printer) {
    for failure in summary.failures() {
        printer.warning(
            "Failed",
            &format!(
                "{}: {}",
                display_path(&failure.source),
                failure.error.as_deref().unwrap_or("unknown error")
            ),
        );
    }

    for note in &summary.notes {
        printer.verbose("Note", note);
    }

    if let Some(report) = &summary.report {
        for missing in report.missing_assets.iter().filter(|m| m.severity >= Severity::High) {
            printer.missing_asset(missing);
        }
    }
}
