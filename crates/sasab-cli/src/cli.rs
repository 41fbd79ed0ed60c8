use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

/// Computes per-atom solvent-accessible surface area for every PDB file in a
/// directory and writes it into the B-factor column of a copy of each file.
#[derive(Parser, Debug)]
#[command(
    name = "sasab",
    version,
    about = "SASA-B - Write per-atom solvent-accessible surface area into the B-factor column of PDB files.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Directory containing the input structure files.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory the annotated files are written to (created if missing).
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    // --- Estimator ---
    /// Solvent probe radius in Angstroms [default: 1.4]
    #[arg(long, value_name = "FLOAT")]
    pub probe: Option<f64>,

    /// Sample points per atom sphere [default: 100]
    #[arg(long, value_name = "INT")]
    pub points: Option<usize>,

    // --- Configuration ---
    /// Path to a TOML configuration file.
    /// Without it, the per-user config.toml is read if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Radius in Angstroms for elements missing from the radius table.
    /// Without it, such elements make the file fail.
    #[arg(long, value_name = "FLOAT")]
    pub fallback_radius: Option<f64>,

    /// Abort the whole batch when an element has no radius, instead of skipping the file.
    #[arg(long)]
    pub strict: bool,

    /// Text inserted between the input file stem and its extension [default: _sasa_b]
    #[arg(long, value_name = "TEXT")]
    pub suffix: Option<String>,

    /// File extension to process; may be repeated [default: pdb]
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Also write a per-residue SASA table (CSV) next to each output file.
    #[arg(long)]
    pub residue_report: bool,

    // --- Logging & runtime ---
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}
