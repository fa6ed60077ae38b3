use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::classpath::split_definition;
use crate::cli::{Cli, OutputFormat};

pub const CLASSPATH_ENV: &str = "MAIN_DEX_CLASSPATH";

/// Defaults read from `config.json`. Command line arguments take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classpath: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub roots_file: Option<PathBuf>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(path) = cli.config.as_deref() {
        return Config::from_file(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => Config::from_file(&path),
        _ => Ok(Config::default()),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("main-dex-list").join("config.json"))
}

/// Classpath locations from the argument, then the environment, then the config file.
pub fn resolve_classpath(arg: Option<&str>, config: &Config) -> Result<Vec<PathBuf>> {
    classpath_from_sources(arg, env::var(CLASSPATH_ENV).ok().as_deref(), config)
}

fn classpath_from_sources(
    arg: Option<&str>,
    env_value: Option<&str>,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    if let Some(definition) = arg {
        return Ok(split_definition(definition));
    }

    // An empty variable counts as unset.
    if let Some(definition) = env_value {
        let locations = split_definition(definition);
        if !locations.is_empty() {
            return Ok(locations);
        }
    }

    if !config.classpath.is_empty() {
        return Ok(config.classpath.clone());
    }

    anyhow::bail!("No classpath given (pass it as an argument, set {CLASSPATH_ENV}, or add it to the config file)")
}

pub fn resolve_format(arg: Option<OutputFormat>, config: &Config) -> OutputFormat {
    arg.or(config.format).unwrap_or_default()
}
