//! Layered configuration: defaults, then environment, then TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding [`SyncConfig::scid_root`].
pub const ENV_SCID_ROOT: &str = "SIERRA_SCID_ROOT";

/// Environment variable overriding [`SyncConfig::depth_root`].
pub const ENV_DEPTH_ROOT: &str = "SIERRA_DEPTH_ROOT";

const DEFAULT_SCID_ROOT: &str = r"C:\SierraChart\Data";
const DEFAULT_DEPTH_ROOT: &str = r"C:\SierraChart\Data\MarketDepthData";
const DEFAULT_FALLBACK_WINDOW_DAYS: u32 = 7;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`SyncConfig`].
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// Storage roots and discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory holding `.scid` trade files.
    #[serde(default = "default_scid_root")]
    pub scid_root: PathBuf,

    /// Directory holding `.depth` files.
    #[serde(default = "default_depth_root")]
    pub depth_root: PathBuf,

    /// Days on either side of the requested day scanned when it has no
    /// depth files.
    #[serde(default = "default_fallback_window_days")]
    pub fallback_window_days: u32,
}

fn default_scid_root() -> PathBuf {
    PathBuf::from(DEFAULT_SCID_ROOT)
}

fn default_depth_root() -> PathBuf {
    PathBuf::from(DEFAULT_DEPTH_ROOT)
}

const fn default_fallback_window_days() -> u32 {
    DEFAULT_FALLBACK_WINDOW_DAYS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            scid_root: default_scid_root(),
            depth_root: default_depth_root(),
            fallback_window_days: DEFAULT_FALLBACK_WINDOW_DAYS,
        }
    }
}

/// Values present in a configuration file; absent keys leave the lower
/// layers untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayer {
    scid_root: Option<PathBuf>,
    depth_root: Option<PathBuf>,
    fallback_window_days: Option<u32>,
}

impl SyncConfig {
    /// Creates a configuration with explicit roots and the default window.
    #[must_use]
    pub fn new(scid_root: impl Into<PathBuf>, depth_root: impl Into<PathBuf>) -> Self {
        Self {
            scid_root: scid_root.into(),
            depth_root: depth_root.into(),
            fallback_window_days: DEFAULT_FALLBACK_WINDOW_DAYS,
        }
    }

    /// Returns the per-user configuration file path, e.g.
    /// `~/.config/sierra-sync/config.toml` on Linux.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sierra-sync")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration from the process environment and a TOML file.
    ///
    /// `path` is read when given; otherwise [`default_path`](Self::default_path)
    /// is read if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        Self::load_with(file.as_deref(), |key| std::env::var_os(key).map(PathBuf::from))
    }

    /// Loads configuration with an explicit environment lookup.
    ///
    /// Precedence, lowest first: built-in defaults, `SIERRA_SCID_ROOT` /
    /// `SIERRA_DEPTH_ROOT`, then keys present in `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` cannot be read or parsed.
    pub fn load_with(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(root) = env(ENV_SCID_ROOT).filter(|p| !p.as_os_str().is_empty()) {
            config.scid_root = root;
        }
        if let Some(root) = env(ENV_DEPTH_ROOT).filter(|p| !p.as_os_str().is_empty()) {
            config.depth_root = root;
        }

        if let Some(path) = file {
            let layer = read_layer(path)?;
            debug!(path = %path.display(), "applying config file");
            if let Some(root) = layer.scid_root {
                config.scid_root = root;
            }
            if let Some(root) = layer.depth_root {
                config.depth_root = root;
            }
            if let Some(days) = layer.fallback_window_days {
                config.fallback_window_days = days;
            }
        }

        Ok(config)
    }
}

fn read_layer(path: &Path) -> Result<FileLayer, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
