use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use sasab::engine::progress::ProgressReporter;
use sasab::workflows::batch::{self, BatchReport};
use tracing::{info, warn};

pub fn run(config: AppConfig) -> Result<()> {
    let batch_config = &config.batch;
    info!(
        input = %batch_config.input_dir.display(),
        output = %batch_config.output_dir.display(),
        probe_radius = batch_config.sasa.probe_radius,
        points_per_atom = batch_config.sasa.points_per_atom,
        "Invoking the batch annotation workflow..."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let report = batch::run(batch_config, &reporter)?;

    print_summary(&report);
    if report.attempted() == 0 {
        warn!("No files with a matching extension were found.");
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::BatchIncomplete {
            failed: report.failed.len(),
            total: report.attempted(),
        })
    }
}

fn print_summary(report: &BatchReport) {
    println!(
        "Annotated {} file(s), {} failed, {} skipped.",
        report.processed.len(),
        report.failed.len(),
        report.skipped.len()
    );
    for failed in &report.failed {
        println!("  ✗ {}: {}", failed.input.display(), failed.error);
    }
}
