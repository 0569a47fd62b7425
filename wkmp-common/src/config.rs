//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is read from a TOML file. Every field is optional:
//! a missing or malformed file degrades to compiled defaults with a warning,
//! it never prevents startup.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`WKMP_ROOT_FOLDER`, then `WKMP_ROOT`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the shared database file inside the root folder
pub const DATABASE_FILE_NAME: &str = "wkmp.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the music collection
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Path to the SQLite database (defaults to `<root>/wkmp.db`)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Music indexing settings
    #[serde(default)]
    pub music: MusicSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings consumed read-only by the indexer
///
/// Passed explicitly into the extraction and grouping entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicSettings {
    /// Characters that separate multiple values packed into one tag value.
    /// Empty means multi-value tags are never split.
    #[serde(default)]
    pub separators: String,

    /// Skip podcasts, ringtones, recordings and other non-music audio
    #[serde(default = "default_exclude_non_music")]
    pub exclude_non_music: bool,

    /// Number of extraction tasks kept in flight
    #[serde(default = "default_extraction_pool_size")]
    pub extraction_pool_size: usize,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            separators: String::new(),
            exclude_non_music: default_exclude_non_music(),
            extraction_pool_size: default_extraction_pool_size(),
        }
    }
}

fn default_exclude_non_music() -> bool {
    true
}

fn default_extraction_pool_size() -> usize {
    8
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::audio_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
            .unwrap_or_else(|| PathBuf::from("./Music"));

        Self {
            root_folder,
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Resolves the root folder following the priority order above
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Command-line override (highest priority)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in ["WKMP_ROOT_FOLDER", "WKMP_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(config_path) = default_config_path(&self.module_name) {
            if config_path.exists() {
                let config = load_toml_config(&config_path);
                if let Some(root_folder) = config.root_folder {
                    return root_folder;
                }
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder on disk
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

/// Default config file location for a module: `<config dir>/wkmp/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wkmp").join(format!("{}.toml", module_name)))
}

/// Load TOML config, degrading to defaults when missing or malformed
pub fn load_toml_config(path: &Path) -> TomlConfig {
    match try_load_toml_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Using default configuration");
            TomlConfig::default()
        }
    }
}

/// Load TOML config, reporting missing or malformed files
pub fn try_load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "Loaded TOML config");
    Ok(config)
}

/// Write TOML config, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
