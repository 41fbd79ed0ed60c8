use sasab::engine::config::{
    DEFAULT_EXTENSIONS, DEFAULT_OUTPUT_SUFFIX, DEFAULT_POINTS_PER_ATOM, DEFAULT_PROBE_RADIUS,
};

pub const USER_CONFIG_FILE_NAME: &str = "config.toml";

pub struct DefaultsConfig {
    pub probe_radius: f64,
    pub points_per_atom: usize,
    pub output_suffix: String,
    pub extensions: Vec<String>,
    pub residue_report: bool,
    pub strict: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            probe_radius: DEFAULT_PROBE_RADIUS,
            points_per_atom: DEFAULT_POINTS_PER_ATOM,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            residue_report: false,
            strict: false,
        }
    }
}
