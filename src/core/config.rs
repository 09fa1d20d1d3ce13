//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SfsError};

/// Env var holding the default source directory.
pub const ENV_RAW_DATA_BASE_DIR: &str = "RAW_DATA_BASE_DIR";
/// Env var holding the default exclusion filename.
pub const ENV_UPLOAD_TEMPLATE: &str = "UPLOAD_TEMPLATE";
/// Extension used when nothing else is configured.
pub const DEFAULT_EXTENSION: &str = ".xlsx";

/// Full SFS configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Inputs of a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScannerConfig {
    /// Directory to list. Kept as a string: full-path output concatenates it verbatim.
    pub directory: Option<String>,
    /// Entry name that is never returned.
    pub exclude_name: Option<String>,
    /// Case-sensitive name suffix an entry must carry.
    pub extension: String,
    /// Prefix each returned name with `directory`.
    pub full_path: bool,
}

/// JSONL diagnostics log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; `None` disables the JSONL log.
    pub jsonl_log: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by sfs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            directory: None,
            exclude_name: None,
            extension: DEFAULT_EXTENSION.to_string(),
            full_path: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            jsonl_log: None,
            max_size_bytes: 10 * 1024 * 1024, // 10 MiB
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[SFS-CONFIG] WARNING: HOME not set, falling back to /tmp for config path"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir.join(".config").join("sfs").join("config.toml"),
        }
    }
}

impl ScannerConfig {
    /// Defaults with `RAW_DATA_BASE_DIR`/`UPLOAD_TEMPLATE` (and `SFS_SCANNER_*`) applied.
    pub fn from_env() -> Result<Self> {
        let mut scanner = Self::default();
        scanner.apply_env_overrides_from(env_var)?;
        Ok(scanner)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_RAW_DATA_BASE_DIR) {
            self.directory = Some(raw);
        }
        if let Some(raw) = lookup(ENV_UPLOAD_TEMPLATE) {
            self.exclude_name = Some(raw);
        }
        if let Some(raw) = lookup("SFS_SCANNER_EXTENSION") {
            self.extension = raw;
        }
        if let Some(raw) = lookup("SFS_SCANNER_FULL_PATH") {
            self.full_path = parse_env_bool("SFS_SCANNER_FULL_PATH", &raw)?;
        }
        Ok(())
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    fn load_with<F>(path: Option<&Path>, mut lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| SfsError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(SfsError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(&mut lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        self.scanner.apply_env_overrides_from(&mut lookup)?;

        if let Some(raw) = lookup("SFS_LOG_JSONL") {
            self.logging.jsonl_log = Some(PathBuf::from(raw));
        }

        Ok(())
    }

    /// Reject settings that leave the activity log unusable.
    ///
    /// Scanner strings are not checked; a value no entry name can match just
    /// never matches.
    pub fn validate(&self) -> Result<()> {
        if self.logging.max_size_bytes == 0 {
            return Err(SfsError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| SfsError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
