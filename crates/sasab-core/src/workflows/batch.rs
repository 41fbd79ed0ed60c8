use super::annotate::{self, AnnotationSummary};
use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::report::write_residue_report_to_path;
use crate::core::io::traits::MolecularFile;
use crate::engine::config::{BatchConfig, UnknownRadiusPolicy};
use crate::engine::error::EngineError;
use crate::engine::estimator::SurfaceAreaEstimator;
use crate::engine::progress::{Progress, ProgressReporter};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

const RESIDUE_REPORT_SUFFIX: &str = "_residues.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub residue_report: Option<PathBuf>,
    pub summary: AnnotationSummary,
}

#[derive(Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: EngineError,
}

/// Outcome of a batch run. Files are listed in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    /// Directory entries ignored by the extension filter.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    /// Number of files that matched the extension filter.
    pub fn attempted(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `<output_dir>/<stem><suffix>.<ext>`, keeping the input's own extension.
pub fn output_path(config: &BatchConfig, input: &Path) -> Option<PathBuf> {
    let stem = input.file_stem()?;
    let extension = input.extension()?;
    let mut name = OsString::from(stem);
    name.push(&config.output_suffix);
    name.push(".");
    name.push(extension);
    Some(config.output_dir.join(name))
}

/// `<output_dir>/<stem><suffix>_residues.csv`.
pub fn residue_report_path(config: &BatchConfig, input: &Path) -> Option<PathBuf> {
    let stem = input.file_stem()?;
    let mut name = OsString::from(stem);
    name.push(&config.output_suffix);
    name.push(RESIDUE_REPORT_SUFFIX);
    Some(config.output_dir.join(name))
}

/// Annotates every matching structure file in `config.input_dir` and writes the
/// results to `config.output_dir`.
///
/// A file that fails to parse or write is recorded in the report and the batch
/// moves on. Unknown radii follow `config.unknown_radius`.
///
/// # Errors
///
/// Returns [`EngineError::InputNotFound`] if the input directory does not
/// exist, [`EngineError::Io`] if it cannot be listed or the output directory
/// cannot be created, and the file's error when an unknown radius aborts the
/// batch.
#[instrument(skip_all, name = "batch_workflow")]
pub fn run(config: &BatchConfig, reporter: &ProgressReporter) -> Result<BatchReport, EngineError> {
    if !config.input_dir.is_dir() {
        return Err(EngineError::InputNotFound {
            path: config.input_dir.clone(),
        });
    }
    fs::create_dir_all(&config.output_dir).map_err(|source| EngineError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    let mut report = BatchReport::default();
    let inputs = list_inputs(config, &mut report.skipped)?;
    info!(
        input_dir = %config.input_dir.display(),
        files = inputs.len(),
        skipped = report.skipped.len(),
        "Starting batch."
    );
    reporter.report(Progress::BatchStart {
        total_files: inputs.len() as u64,
    });

    let estimator = SurfaceAreaEstimator::new(config.sasa);

    for input in inputs {
        let Some(output) = output_path(config, &input) else {
            continue;
        };
        reporter.report(Progress::FileStart {
            file_name: display_name(&input),
            output_name: display_name(&output),
        });

        match process_file(config, &estimator, &input, output) {
            Ok(processed) => {
                reporter.report(Progress::FileFinish { succeeded: true });
                report.processed.push(processed);
            }
            Err(err) => {
                error!(file = %input.display(), error = %err, "Failed to process structure.");
                reporter.report(Progress::Message(format!("{}: {}", display_name(&input), err)));
                reporter.report(Progress::FileFinish { succeeded: false });
                let abort = matches!(err, EngineError::UnknownRadius { .. })
                    && config.unknown_radius == UnknownRadiusPolicy::Abort;
                if abort {
                    reporter.report(Progress::BatchFinish);
                    return Err(err);
                }
                report.failed.push(FailedFile { input, error: err });
            }
        }
    }

    reporter.report(Progress::BatchFinish);
    info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        "Batch finished."
    );
    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn list_inputs(config: &BatchConfig, skipped: &mut Vec<PathBuf>) -> Result<Vec<PathBuf>, EngineError> {
    let io_err = |source| EngineError::Io {
        path: config.input_dir.clone(),
        source,
    };
    let mut entries = fs::read_dir(&config.input_dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort();

    let mut inputs = Vec::with_capacity(entries.len());
    for path in entries {
        let matches = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.accepts_extension(ext));
        if matches {
            inputs.push(path);
        } else {
            debug!(path = %path.display(), "Skipping entry with unsupported extension.");
            skipped.push(path);
        }
    }
    Ok(inputs)
}

#[instrument(skip_all, name = "structure", fields(file = %display_name(input)))]
fn process_file(
    config: &BatchConfig,
    estimator: &SurfaceAreaEstimator,
    input: &Path,
    output: PathBuf,
) -> Result<ProcessedFile, EngineError> {
    let (mut system, metadata) =
        PdbFile::read_from_path(input).map_err(|source| EngineError::Structure {
            path: input.to_path_buf(),
            source,
        })?;
    debug!(file = %input.display(), atoms = system.atom_count(), "Structure loaded.");

    let summary = annotate::run(&mut system, estimator, &config.radii)?;

    PdbFile::write_to_path(&system, &metadata, &output).map_err(|source| match source {
        PdbError::Io(source) => EngineError::Io {
            path: output.clone(),
            source,
        },
        other => EngineError::Structure {
            path: output.clone(),
            source: other,
        },
    })?;

    let residue_report = if config.residue_report {
        let path = residue_report_path(config, input).ok_or_else(|| {
            EngineError::Internal(format!("No file stem for '{}'", input.display()))
        })?;
        let rows = annotate::residue_totals(&system);
        write_residue_report_to_path(&rows, &path).map_err(|source| EngineError::Report {
            path: path.clone(),
            source,
        })?;
        Some(path)
    } else {
        None
    };

    Ok(ProcessedFile {
        input: input.to_path_buf(),
        output,
        residue_report,
        summary,
    })
}
