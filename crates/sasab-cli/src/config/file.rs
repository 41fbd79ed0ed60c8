use super::defaults::USER_CONFIG_FILE_NAME;
use crate::error::{CliError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings read from a TOML configuration file. Every field is optional;
/// anything left out falls through to the built-in defaults.
///
/// ```toml
/// [sasa]
/// probe-radius = 1.4
/// points-per-atom = 100
///
/// [radii]
/// table = "radii.toml"
/// fallback = 2.0
///
/// [radii.elements]
/// SE = 1.9
///
/// [output]
/// suffix = "_sasa_b"
/// extensions = ["pdb", "ent"]
/// residue-report = false
/// strict = false
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub sasa: Option<FileSasaConfig>,
    pub radii: Option<FileRadiiConfig>,
    pub output: Option<FileOutputConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSasaConfig {
    pub probe_radius: Option<f64>,
    pub points_per_atom: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRadiiConfig {
    /// A radius table file; relative paths are resolved against the config file.
    pub table: Option<PathBuf>,
    pub fallback: Option<f64>,
    #[serde(default)]
    pub elements: HashMap<String, f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub suffix: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub residue_report: Option<bool>,
    pub strict: Option<bool>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read config file '{}': {}", path.display(), e))
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|e| {
            CliError::Config(format!("Invalid config file '{}': {}", path.display(), e))
        })?;

        if let Some(table) = config.radii.as_mut().and_then(|r| r.table.as_mut()) {
            if table.is_relative() {
                if let Some(parent) = path.parent() {
                    *table = parent.join(&*table);
                }
            }
        }
        Ok(config)
    }

    /// Location of the per-user configuration file, whether or not it exists.
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "sasab", "sasab")
            .map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE_NAME))
    }

    /// Loads the explicitly given file, or else `user_path` if it exists.
    ///
    /// # Return
    ///
    /// The parsed configuration and the file it came from; an empty
    /// configuration and `None` if no file applies.
    pub fn resolve(
        explicit: Option<&Path>,
        user_path: Option<PathBuf>,
    ) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match user_path {
            Some(path) if path.is_file() => Ok((Self::from_file(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn full_file_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [sasa]
            probe-radius = 1.2
            points-per-atom = 500

            [radii]
            table = "radii.toml"
            fallback = 2.0

            [radii.elements]
            SE = 1.9

            [output]
            suffix = "_exp"
            extensions = ["pdb", "ent"]
            residue-report = true
            strict = true
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        let sasa = config.sasa.unwrap();
        assert_eq!(sasa.probe_radius, Some(1.2));
        assert_eq!(sasa.points_per_atom, Some(500));

        let radii = config.radii.unwrap();
        assert_eq!(radii.table, Some(dir.path().join("radii.toml")));
        assert_eq!(radii.fallback, Some(2.0));
        assert_eq!(radii.elements.get("SE"), Some(&1.9));

        let output = config.output.unwrap();
        assert_eq!(output.suffix.as_deref(), Some("_exp"));
        assert_eq!(
            output.extensions,
            Some(vec!["pdb".to_string(), "ent".to_string()])
        );
        assert_eq!(output.residue_report, Some(true));
        assert_eq!(output.strict, Some(true));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sasa]\nprobe = 1.4\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn resolve_prefers_explicit_then_user_file() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let user = dir.path().join("user.toml");
        fs::write(&explicit, "[sasa]\npoints-per-atom = 10\n").unwrap();
        fs::write(&user, "[sasa]\npoints-per-atom = 20\n").unwrap();

        let (config, source) = FileConfig::resolve(Some(&explicit), Some(user.clone())).unwrap();
        assert_eq!(config.sasa.unwrap().points_per_atom, Some(10));
        assert_eq!(source, Some(explicit));

        let (config, source) = FileConfig::resolve(None, Some(user.clone())).unwrap();
        assert_eq!(config.sasa.unwrap().points_per_atom, Some(20));
        assert_eq!(source, Some(user));

        let (config, source) =
            FileConfig::resolve(None, Some(dir.path().join("absent.toml"))).unwrap();
        assert!(config.sasa.is_none());
        assert_eq!(source, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::resolve(Some(&dir.path().join("absent.toml")), None);
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
