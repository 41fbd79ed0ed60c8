use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileRadiiConfig};
use super::models::AppConfig;
use crate::cli::Cli;
use crate::error::{CliError, Result};
use sasab::core::radii::RadiusTable;
use sasab::engine::config::{BatchConfigBuilder, ShrakeRupleyConfigBuilder, UnknownRadiusPolicy};
use tracing::info;

/// Resolves the final configuration with precedence CLI > config file > defaults.
pub fn build_config(args: &Cli) -> Result<AppConfig> {
    let (file_config, source) =
        FileConfig::resolve(args.config.as_deref(), FileConfig::user_config_path())?;
    if let Some(path) = &source {
        info!("Using configuration file {:?}", path);
    }
    let mut app = merge(args, file_config)?;
    app.source = source;
    Ok(app)
}

fn merge(args: &Cli, file_config: FileConfig) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let sasa_file = file_config.sasa.unwrap_or_default();
    let output_file = file_config.output.unwrap_or_default();

    let sasa = ShrakeRupleyConfigBuilder::new()
        .probe_radius(
            args.probe
                .or(sasa_file.probe_radius)
                .unwrap_or(defaults.probe_radius),
        )
        .points_per_atom(
            args.points
                .or(sasa_file.points_per_atom)
                .unwrap_or(defaults.points_per_atom),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let radii = build_radius_table(args.fallback_radius, file_config.radii.unwrap_or_default())?;

    let extensions = if !args.extensions.is_empty() {
        args.extensions.clone()
    } else {
        output_file.extensions.unwrap_or(defaults.extensions)
    };
    let output_suffix = args
        .suffix
        .clone()
        .or(output_file.suffix)
        .unwrap_or(defaults.output_suffix);
    let residue_report =
        args.residue_report || output_file.residue_report.unwrap_or(defaults.residue_report);
    let strict = args.strict || output_file.strict.unwrap_or(defaults.strict);

    let batch = BatchConfigBuilder::new()
        .input_dir(args.input_dir.clone())
        .output_dir(args.output_dir.clone())
        .sasa(sasa)
        .radii(radii)
        .extensions(extensions)
        .output_suffix(output_suffix)
        .unknown_radius(if strict {
            UnknownRadiusPolicy::Abort
        } else {
            UnknownRadiusPolicy::SkipFile
        })
        .residue_report(residue_report)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        source: None,
        batch,
    })
}

fn build_radius_table(cli_fallback: Option<f64>, file: FileRadiiConfig) -> Result<RadiusTable> {
    let table = match &file.table {
        Some(path) => RadiusTable::from_toml_file(path),
        None => Ok(RadiusTable::new()),
    }
    .and_then(|table| table.with_overrides(file.elements))
    .map_err(|e| CliError::Config(e.to_string()))?;

    match cli_fallback.or(file.fallback) {
        Some(radius) => table
            .with_fallback(radius)
            .map_err(|e| CliError::Config(e.to_string())),
        None => Ok(table),
    }
}
