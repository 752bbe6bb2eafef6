//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `MAMMO_ROOT_FOLDER` environment variable
//! 3. `MAMMO_ROOT` environment variable
//! 4. TOML config file (`root_folder` key)
//! 5. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the next tier is used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "MAMMO_ROOT_FOLDER";

/// Shorter alias accepted for the root folder
pub const ROOT_ENV: &str = "MAMMO_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "mammo.db";

/// Upload directory name inside the root folder
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional so that partial files are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Directory for uploaded images (defaults to `<root>/uploads`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<PathBuf>,

    /// Upload size ceiling in MiB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_mb: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Resolves the root folder and the TOML file for one module
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_path: None,
        }
    }

    /// Root folder given on the command line
    pub fn with_cli_arg(mut self, root_folder: Option<PathBuf>) -> Self {
        self.cli_arg = root_folder;
        self
    }

    /// Explicit TOML path, replacing the per-user default location
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.config_path = path;
        }
        self
    }

    /// `~/.config/mammo/<module>.toml` unless overridden
    pub fn config_file_path(&self) -> Option<PathBuf> {
        self.config_path.clone().or_else(|| {
            dirs::config_dir().map(|d| d.join("mammo").join(format!("{}.toml", self.module_name)))
        })
    }

    /// Load the module's TOML file, if present and valid
    pub fn load_toml(&self) -> Option<TomlConfig> {
        let path = self.config_file_path()?;
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return None;
        }
        match TomlConfig::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                None
            }
        }
    }

    /// Resolve the root folder; never fails
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(root) = self.load_toml().and_then(|c| c.root_folder) {
            return root;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder layout
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder).map_err(|e| {
            Error::Config(format!(
                "Cannot create root folder {}: {}",
                self.root_folder.display(),
                e
            ))
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR_NAME)
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/mammo (or /var/lib/mammo for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("mammo"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/mammo"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("mammo"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/mammo"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("mammo"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\mammo"))
    } else {
        PathBuf::from("./mammo_data")
    }
}
