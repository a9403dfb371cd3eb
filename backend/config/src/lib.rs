//! `gifsmith-config`: runtime configuration for the gifsmith bot.
//!
//! Provides:
//! - Typed config schema (discord, media pipeline, logging)
//! - YAML loading
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with path-addressed errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_file_path, load_config};
pub use schema::{DiscordConfig, GifsmithConfig, LoggingConfig, MediaSettings};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Read a config file, substitute `${VAR}` references and apply defaults,
/// returning the config together with its validation report.
pub async fn load_with_report(path: &Path) -> Result<(GifsmithConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;

    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: GifsmithConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);
    let report = validate(&config);
    Ok((config, report))
}

/// Load, apply env substitution, apply defaults and validate a config file.
///
/// Validation errors fail the load; the report is logged through whatever
/// subscriber is current. Binaries that install their logger from this config
/// should use [`load_with_report`] and log the report afterwards.
pub async fn load_and_prepare(path: &Path) -> Result<GifsmithConfig> {
    let (config, report) = load_with_report(path).await?;
    report.log();
    report.ensure_valid(path)?;
    Ok(config)
}
