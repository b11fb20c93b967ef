use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use clap::Args;
use directories::ProjectDirs;
use launch_api::LaunchConfig;
use tracing::warn;

use crate::paths::entry_relative_path;

/// Command line overrides for individual launch settings.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Entry file that marks a game directory.
    #[arg(long = "main")]
    pub entry_file: Option<String>,
    /// Directory holding the engine executable.
    #[arg(long)]
    pub exec_dir: Option<PathBuf>,
    /// Engine executable name.
    #[arg(long)]
    pub exec_name: Option<String>,
    /// Maximum number of concurrent instances.
    #[arg(long)]
    pub max_instances: Option<u32>,
    /// Kill running instances instead of refusing at capacity (true/false).
    #[arg(long)]
    pub overwrite: Option<bool>,
    /// Pass `--console` to the engine on Windows (true/false).
    #[arg(long)]
    pub console: Option<bool>,
    /// Ask the editor to save all documents before launching (true/false).
    #[arg(long)]
    pub save_all: Option<bool>,
}

/// Location of the config file: explicit path, then `LOVELAUNCHER_CONFIG`,
/// then `launcher.toml` in the platform config directory.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("LOVELAUNCHER_CONFIG").ok().map(PathBuf::from))
        .or_else(|| {
            ProjectDirs::from("org", "lovelauncher", "lovelauncher")
                .map(|dirs| dirs.config_dir().join("launcher.toml"))
        })
}

/// Resolve the launch configuration from defaults, the config file,
/// environment variables and command line overrides, in increasing priority.
pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<LaunchConfig> {
    let mut config = match config_path(explicit) {
        Some(path) => read_file(&path)?,
        None => LaunchConfig::default(),
    };
    apply_env(&mut config);
    apply_overrides(&mut config, overrides);
    validate(&config)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<LaunchConfig> {
    match fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(LaunchConfig::default()),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

fn apply_env(config: &mut LaunchConfig) {
    if let Some(v) = env_value("LOVELAUNCHER_MAIN") {
        config.entry_file = v;
    }
    if let Some(v) = env_value::<String>("LOVELAUNCHER_PATH") {
        config.executable_dir = PathBuf::from(v);
    }
    if let Some(v) = env_value("LOVELAUNCHER_EXEC_NAME") {
        config.executable_name = v;
    }
    if let Some(v) = env_value("LOVELAUNCHER_MAX_INSTANCES") {
        config.max_instances = v;
    }
    if let Some(v) = env_value("LOVELAUNCHER_OVERWRITE") {
        config.overwrite_on_launch = v;
    }
    if let Some(v) = env_value("LOVELAUNCHER_CONSOLE") {
        config.use_console_subsystem = v;
    }
    if let Some(v) = env_value("LOVELAUNCHER_SAVE_ALL") {
        config.save_all_before_launch = v;
    }
}

/// Apply command line overrides on top of an already resolved config.
pub fn apply_overrides(config: &mut LaunchConfig, overrides: &Overrides) {
    if let Some(v) = &overrides.entry_file {
        config.entry_file = v.clone();
    }
    if let Some(v) = &overrides.exec_dir {
        config.executable_dir = v.clone();
    }
    if let Some(v) = &overrides.exec_name {
        config.executable_name = v.clone();
    }
    if let Some(v) = overrides.max_instances {
        config.max_instances = v;
    }
    if let Some(v) = overrides.overwrite {
        config.overwrite_on_launch = v;
    }
    if let Some(v) = overrides.console {
        config.use_console_subsystem = v;
    }
    if let Some(v) = overrides.save_all {
        config.save_all_before_launch = v;
    }
}

pub fn validate(config: &LaunchConfig) -> Result<()> {
    if config.entry_file.trim().is_empty() {
        anyhow::bail!("`main` must name an entry file");
    }
    if entry_relative_path(&config.entry_file).is_none() {
        anyhow::bail!(
            "`main` must be a file name relative to the game directory, got {:?}",
            config.entry_file
        );
    }
    if config.executable_name.trim().is_empty() {
        anyhow::bail!("`execName` must name the engine executable");
    }
    Ok(())
}

/// The effective configuration as TOML, using the editor's key names.
pub fn render(config: &LaunchConfig) -> Result<String> {
    toml::to_string_pretty(config).context("rendering config")
}
