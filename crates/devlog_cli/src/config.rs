//! Configuration file support for devlog.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `DEVLOG_`, e.g., `DEVLOG_GITHUB_TOKEN`)
//! 3. Config file (./devlog.toml or ~/.config/devlog/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/devlog/devlog.db` on Linux
//! (using the XDG state directory) if not explicitly configured. Sync settings
//! (auto-sync, interval, excluded repositories) live in a separate JSON file
//! next to it, since they are edited at runtime.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/devlog/devlog.db"  # optional, this is the default
//!
//! [github]
//! login = "octocat"
//! token = "ghp_..."  # or use DEVLOG_GITHUB_TOKEN env var
//!
//! [sync]
//! window_size = 30
//! fetch_timeout_secs = 15
//! settings_path = "/home/me/.local/state/devlog/settings.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use devlog::source::DEFAULT_WINDOW_SIZE;
use devlog::sync::DEFAULT_FETCH_TIMEOUT;

const APP_NAME: &str = "devlog";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Sync pipeline options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Login whose push events are ingested. Also the entry owner.
    pub login: Option<String>,
    /// GitHub API token.
    /// Can also be set via DEVLOG_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise.
    pub api_base: Option<String>,
}

/// Sync pipeline options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Number of upstream events requested per cycle.
    pub window_size: usize,
    /// Timeout on a single upstream fetch.
    pub fetch_timeout_secs: u64,
    /// Where the sync settings JSON lives. Defaults to the state directory.
    pub settings_path: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            settings_path: None,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/devlog/config.toml)
    /// 3. Local config file (./devlog.toml)
    /// 4. Environment variables with DEVLOG_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("devlog.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./devlog.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // DEVLOG_GITHUB_TOKEN -> github.token
        builder = builder.add_source(
            Environment::with_prefix("DEVLOG")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("devlog.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Path of the sync settings JSON file.
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.sync
            .settings_path
            .clone()
            .or_else(|| Self::default_state_dir().map(|dir| dir.join("settings.json")))
    }

    pub fn github_login(&self) -> Option<String> {
        self.github
            .login
            .as_deref()
            .map(str::trim)
            .filter(|login| !login.is_empty())
            .map(str::to_string)
    }

    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.fetch_timeout_secs.max(1))
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/devlog` or `~/.local/state/devlog`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            // state_dir() returns None on macOS/Windows
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
