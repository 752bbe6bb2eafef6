//! Service configuration for mammo-api
//!
//! Two tiers: command line (with environment fallbacks handled by clap),
//! then the module TOML file, then compiled defaults. The root folder itself
//! is resolved by `mammo_common::config::RootFolderResolver`.

use clap::Parser;
use mammo_common::config::{CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig};
use mammo_common::{Error, Result};
use std::path::PathBuf;

/// Module name used for the TOML file (`~/.config/mammo/mammo-api.toml`)
pub const MODULE_NAME: &str = "mammo-api";

/// Command-line arguments for mammo-api
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mammo-api")]
#[command(about = "Mammogram upload and mock analysis service")]
#[command(version)]
pub struct Args {
    /// Root folder holding the database and uploads
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "MAMMO_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MAMMO_PORT")]
    pub port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long, env = "MAMMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. "info", "mammo_api=debug")
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge CLI, TOML and defaults
    pub fn resolve(args: &Args) -> Result<Self> {
        let resolver = RootFolderResolver::new(MODULE_NAME)
            .with_cli_arg(args.root_folder.clone())
            .with_config_path(args.config.clone());
        let toml = resolver.load_toml().unwrap_or_default();
        Self::from_parts(args, &toml, resolver.resolve())
    }

    /// Merge already-loaded sources
    pub fn from_parts(args: &Args, toml: &TomlConfig, root_folder: PathBuf) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();
        let initializer = RootFolderInitializer::new(root_folder.clone());

        let max_upload_bytes = match toml.max_upload_mb {
            Some(0) => {
                return Err(Error::Config("max_upload_mb must be greater than zero".to_string()))
            }
            Some(mb) => mb.saturating_mul(1024 * 1024),
            None => defaults.max_upload_bytes,
        };

        let upload_dir = match &toml.upload_dir {
            Some(dir) if dir.is_relative() => root_folder.join(dir),
            Some(dir) => dir.clone(),
            None => initializer.uploads_path(),
        };

        Ok(Self {
            database_path: initializer.database_path(),
            upload_dir,
            host: args
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or(defaults.host),
            port: args.port.or(toml.port).unwrap_or(defaults.port),
            max_upload_bytes,
            log_level: args
                .log_level
                .clone()
                .unwrap_or_else(|| toml.logging.level.clone()),
            root_folder,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
