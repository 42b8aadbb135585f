//! Configuration loading and management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Debugger behaviour
    #[serde(default)]
    pub debugger: DebuggerConfig,

    /// Command history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from file or default locations
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(|| {
            // Try .makedbg/config.toml in current directory
            let local = PathBuf::from(".makedbg/config.toml");
            if local.exists() {
                return Some(local);
            }

            // Try ~/.makedbg/config.toml
            dirs::home_dir().map(|h| h.join(".makedbg/config.toml"))
        });

        match config_path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(&p)?;
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Some(p) if path.is_some() => Err(Error::Config(format!(
                "config file {} does not exist",
                p.display()
            ))),
            _ => Ok(Config::default()),
        }
    }
}

/// Debugger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebuggerConfig {
    /// Name shown at the start of the prompt
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Stop at every interception point, not only at breakpoints
    #[serde(default)]
    pub stop_on_error: bool,

    /// Use the interactive line editor (falls back to plain reads if false)
    #[serde(default = "default_true")]
    pub line_editing: bool,

    /// Number of `<`/`>` pairs shown in the prompt before it degrades to `...`
    #[serde(default = "default_max_nest_depth")]
    pub max_nest_depth: usize,

    /// Show only base names of files in locations
    #[serde(default)]
    pub basename_filenames: bool,
}

fn default_prompt() -> String {
    "makedbg".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_nest_depth() -> usize {
    5
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            stop_on_error: false,
            line_editing: default_true(),
            max_nest_depth: default_max_nest_depth(),
            basename_filenames: false,
        }
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// File the line editor loads history from and saves it to
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Maximum entries kept by the line editor
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    1000
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: None,
            max_entries: default_max_entries(),
        }
    }
}

/// Initialize .makedbg directory with a default config
pub fn init() -> Result<PathBuf> {
    let dir = PathBuf::from(".makedbg");

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        let default_config = Config::default();
        let config_str =
            toml::to_string_pretty(&default_config).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(&config_path, config_str)?;
    }

    Ok(config_path)
}
