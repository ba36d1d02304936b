//! Configuration management for the UCS language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Settings file locations

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::settings::SettingsOverrides;

/// Command-line arguments for the UCS language server
#[derive(Debug, Parser)]
#[command(name = "ucs-language-server")]
#[command(about = "Language server for UCS localization string files")]
#[command(version)]
pub struct Args {
    /// Workspace settings file, instead of `.ucs.toml` in the workspace root
    #[arg(long, help = "Settings TOML file to use for the workspace")]
    pub config: Option<PathBuf>,

    /// Indentation width used by the space-to-tab conversion
    #[arg(long, help = "Number of spaces that are converted into a tab")]
    pub tab_size: Option<usize>,

    #[arg(long, help = "Quiet period in milliseconds before a document is re-scanned")]
    pub debounce_ms: Option<u64>,

    #[arg(long, help = "Line count above which a progress indicator is shown")]
    pub large_file_threshold: Option<usize>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace settings file explicitly set via command line
    pub config_path: Option<PathBuf>,
    /// User-global settings file
    pub user_settings_file: Option<PathBuf>,
    /// Values that win over every settings file
    pub overrides: SettingsOverrides,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        // Default user config file: ~/.config/ucs-ls/config.toml
        let user_settings_file =
            dirs::config_dir().map(|config_dir| config_dir.join("ucs-ls").join("config.toml"));

        Ok(Config {
            config_path: args.config,
            user_settings_file,
            overrides: SettingsOverrides {
                tab_size: args.tab_size,
                debounce_ms: args.debounce_ms,
                large_file_threshold: args.large_file_threshold,
            },
            log_level: args.log_level,
        })
    }
}
