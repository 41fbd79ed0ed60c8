use sasab::engine::config::BatchConfig;
use std::path::PathBuf;

pub struct AppConfig {
    /// The configuration file that contributed settings, if any.
    pub source: Option<PathBuf>,
    pub batch: BatchConfig,
}
