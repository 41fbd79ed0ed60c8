use crate::core::radii::RadiusTable;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PROBE_RADIUS: f64 = 1.4;
pub const DEFAULT_POINTS_PER_ATOM: usize = 100;
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_sasa_b";
pub const DEFAULT_EXTENSIONS: &[&str] = &["pdb"];

/// Below this many sample points the per-atom estimate becomes noisy.
pub const LOW_POINT_COUNT_THRESHOLD: usize = 20;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Parameters of the Shrake-Rupley estimator.
///
/// `points_per_atom` trades accuracy for speed: the estimate for each atom is
/// quantized to `1/points_per_atom` of its expanded sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrakeRupleyConfig {
    pub probe_radius: f64,
    pub points_per_atom: usize,
}

impl Default for ShrakeRupleyConfig {
    fn default() -> Self {
        Self {
            probe_radius: DEFAULT_PROBE_RADIUS,
            points_per_atom: DEFAULT_POINTS_PER_ATOM,
        }
    }
}

#[derive(Default)]
pub struct ShrakeRupleyConfigBuilder {
    probe_radius: Option<f64>,
    points_per_atom: Option<usize>,
}

impl ShrakeRupleyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe_radius(mut self, radius: f64) -> Self {
        self.probe_radius = Some(radius);
        self
    }
    pub fn points_per_atom(mut self, points: usize) -> Self {
        self.points_per_atom = Some(points);
        self
    }

    pub fn build(self) -> Result<ShrakeRupleyConfig, ConfigError> {
        let probe_radius = self.probe_radius.unwrap_or(DEFAULT_PROBE_RADIUS);
        if !probe_radius.is_finite() || probe_radius <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "probe_radius",
                reason: format!("must be a positive number, got {}", probe_radius),
            });
        }
        let points_per_atom = self.points_per_atom.unwrap_or(DEFAULT_POINTS_PER_ATOM);
        if points_per_atom == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "points_per_atom",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(ShrakeRupleyConfig {
            probe_radius,
            points_per_atom,
        })
    }
}

/// What a batch does when a structure contains an element without a radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRadiusPolicy {
    /// Record the file as failed and continue with the next one.
    #[default]
    SkipFile,
    /// Stop the whole batch with the error.
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub sasa: ShrakeRupleyConfig,
    pub radii: RadiusTable,
    /// Lower-case file extensions (without the dot) that are processed.
    pub extensions: Vec<String>,
    pub output_suffix: String,
    pub unknown_radius: UnknownRadiusPolicy,
    pub residue_report: bool,
}

impl BatchConfig {
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

#[derive(Default)]
pub struct BatchConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sasa: Option<ShrakeRupleyConfig>,
    radii: Option<RadiusTable>,
    extensions: Option<Vec<String>>,
    output_suffix: Option<String>,
    unknown_radius: Option<UnknownRadiusPolicy>,
    residue_report: bool,
}

impl BatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, path: PathBuf) -> Self {
        self.input_dir = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn sasa(mut self, config: ShrakeRupleyConfig) -> Self {
        self.sasa = Some(config);
        self
    }
    pub fn radii(mut self, table: RadiusTable) -> Self {
        self.radii = Some(table);
        self
    }
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }
    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = Some(suffix.into());
        self
    }
    pub fn unknown_radius(mut self, policy: UnknownRadiusPolicy) -> Self {
        self.unknown_radius = Some(policy);
        self
    }
    pub fn residue_report(mut self, enabled: bool) -> Self {
        self.residue_report = enabled;
        self
    }

    pub fn build(self) -> Result<BatchConfig, ConfigError> {
        let extensions = self
            .extensions
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect());
        if extensions.is_empty() || extensions.iter().any(|e| e.is_empty()) {
            return Err(ConfigError::InvalidParameter {
                name: "extensions",
                reason: "at least one non-empty extension is required".to_string(),
            });
        }

        let output_suffix = self
            .output_suffix
            .unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
        if output_suffix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidParameter {
                name: "output_suffix",
                reason: format!("must not contain path separators, got '{}'", output_suffix),
            });
        }

        Ok(BatchConfig {
            input_dir: self
                .input_dir
                .ok_or(ConfigError::MissingParameter("input_dir"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            sasa: self.sasa.unwrap_or_default(),
            radii: self.radii.unwrap_or_default(),
            extensions,
            output_suffix,
            unknown_radius: self.unknown_radius.unwrap_or_default(),
            residue_report: self.residue_report,
        })
    }
}
