//! Configuration loading and root folder resolution

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default tick cadence for the session loop (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Default lookahead window for upcoming-interval warnings (seconds)
pub const DEFAULT_WARNING_WINDOW_SECS: f64 = 5.0;

/// Session tuning from the `[session]` table of config.toml
///
/// Missing file or missing keys fall back to compiled defaults; a
/// broken config never prevents startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Tick cadence of the session loop in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Upcoming-interval warning window in seconds
    #[serde(default = "default_warning_window_secs")]
    pub warning_window_secs: f64,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_warning_window_secs() -> f64 {
    DEFAULT_WARNING_WINDOW_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            warning_window_secs: DEFAULT_WARNING_WINDOW_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    root_folder: Option<PathBuf>,
    #[serde(default)]
    session: Option<SessionConfig>,
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `PACELINE_ROOT` environment variable
/// 3. TOML config file `root_folder` key
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("PACELINE_ROOT") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_config_file() {
        if let Some(root_folder) = config.root_folder {
            return root_folder;
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Load session tuning from config.toml, falling back to defaults
pub fn load_session_config() -> SessionConfig {
    match load_config_file() {
        Ok(config) => config.session.unwrap_or_default(),
        Err(e) => {
            debug!("no usable config file ({e}), using session defaults");
            SessionConfig::default()
        }
    }
}

fn load_config_file() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| {
        warn!("failed to parse {}: {e}", path.display());
        Error::Config(format!("invalid config file {}: {e}", path.display()))
    })
}

/// Platform configuration file path (`<config dir>/paceline/config.toml`)
fn config_file_path() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("paceline").join("config.toml"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("config file not found: {}", path.display())))
    }
}

/// OS-dependent default root folder for plan storage
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("paceline"))
        .unwrap_or_else(|| PathBuf::from("./paceline_data"))
}
