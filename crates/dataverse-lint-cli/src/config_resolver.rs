//! Locating and loading the run configuration.
//!
//! A plugin project usually sits a few directories below its solution, and
//! `check` may be pointed at a single `.cs` file. The configuration is taken
//! from the first of:
//!
//! 1. the `--config` flag
//! 2. the nearest `dataverse-lint.toml` / `.dataverse-lint.toml` in the
//!    target directory or one of its ancestors, up to the solution root (the
//!    first directory holding a `.sln` file or `.git`)
//! 3. `config.toml` under `$DATAVERSE_LINT_CONFIG_DIR` or `~/.dataverse-lint/`
//! 4. built-in defaults

use anyhow::{Context, Result};
use dataverse_lint_core::Config;
use std::path::{Path, PathBuf};

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Given with `--config`.
    Flag(PathBuf),
    /// Found next to the sources.
    Project(PathBuf),
    /// The per-user file.
    Global(PathBuf),
    /// Nothing found.
    Defaults,
}

/// A parsed configuration and its origin.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The parsed configuration.
    pub config: Config,
    /// Where it was read from.
    pub origin: ConfigOrigin,
}

/// Finds and parses the configuration for a run over `target`.
///
/// # Errors
///
/// Fails when the chosen file cannot be read or is not valid TOML. A
/// `--config` path that does not exist is an error; it is never skipped.
pub fn load(target: &Path, flag: Option<&Path>) -> Result<ResolvedConfig> {
    load_with(target, flag, global_config_dir().as_deref())
}

fn load_with(target: &Path, flag: Option<&Path>, global_dir: Option<&Path>) -> Result<ResolvedConfig> {
    let origin = locate(target, flag, global_dir);
    let config = match &origin {
        ConfigOrigin::Flag(path) | ConfigOrigin::Project(path) | ConfigOrigin::Global(path) => {
            Config::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        ConfigOrigin::Defaults => Config::default(),
    };
    Ok(ResolvedConfig { config, origin })
}

impl ResolvedConfig {
    /// Logs where the configuration came from. A global file is reported at
    /// info level since it applies to every project on the machine.
    pub fn log_origin(&self) {
        match &self.origin {
            ConfigOrigin::Global(path) => tracing::info!("Using global config: {}", path.display()),
            ConfigOrigin::Defaults => tracing::debug!("No config found; using defaults"),
            ConfigOrigin::Flag(path) | ConfigOrigin::Project(path) => {
                tracing::debug!("Using config: {}", path.display());
            }
        }
    }
}

fn locate(target: &Path, flag: Option<&Path>, global_dir: Option<&Path>) -> ConfigOrigin {
    if let Some(path) = flag {
        return ConfigOrigin::Flag(path.to_path_buf());
    }
    if let Some(path) = find_project_config(target) {
        return ConfigOrigin::Project(path);
    }
    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|path| path.is_file())
        .map_or(ConfigOrigin::Defaults, ConfigOrigin::Global)
}

/// Nearest project config at or above `target`, stopping at the solution root.
fn find_project_config(target: &Path) -> Option<PathBuf> {
    let start = if target.is_file() {
        target.parent()?
    } else {
        target
    };
    for dir in start.ancestors() {
        if let Some(found) = Config::find_in(dir) {
            return Some(found);
        }
        if is_solution_root(dir) {
            break;
        }
    }
    None
}

fn is_solution_root(dir: &Path) -> bool {
    if dir.join(".git").exists() {
        return true;
    }
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(Result::ok)
            .any(|entry| entry.path().extension().is_some_and(|ext| ext == "sln"))
    })
}

/// The per-user config directory: `$DATAVERSE_LINT_CONFIG_DIR`, else
/// `~/.dataverse-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DATAVERSE_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".dataverse-lint"))
}
