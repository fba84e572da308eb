//! Configuration file support
//!
//! Settings can be kept in a TOML file and passed with `--config`:
//!
//! ```toml
//! [device]
//! programmer = "spidev:dev=/dev/spi_3wires_lxm2582"
//! delay_us = 1000
//! strict_writes = false
//!
//! [registers]
//! file = "lmx2582_1ghz.txt"
//! format = "tics"
//! ```
//!
//! Command-line options take precedence. A relative `registers.file` is
//! resolved against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lmx2582_core::{LoaderConfig, TableFormat, WritePolicy, DEFAULT_REGISTER_DELAY};
use thiserror::Error;

use crate::cli::TableArgs;

/// Backend used when neither the command line nor the config names one
pub const DEFAULT_PROGRAMMER: &str = "spidev";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML or unknown keys
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value has the right type but is not acceptable
    #[error("Invalid config value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// No register table given anywhere
    #[error("No register table specified. Use --registers <FILE> or [registers] file in the config")]
    MissingRegisters,
}

/// Parsed config file
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub device: DeviceSection,
    pub registers: RegistersSection,
    /// Directory of the file this config was loaded from
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// `[device]` section
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSection {
    pub programmer: Option<String>,
    pub delay_us: Option<u64>,
    pub strict_writes: Option<bool>,
}

/// `[registers]` section
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistersSection {
    pub file: Option<PathBuf>,
    pub format: Option<String>,
}

impl Config {
    /// Parse config from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config file if one was given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(format) = &self.registers.format {
            format
                .parse::<TableFormat>()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: "registers.format",
                    reason,
                })?;
        }
        if let Some(programmer) = &self.device.programmer {
            if programmer.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "device.programmer",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Register table path and format, command line first
    pub fn resolve_table(&self, args: &TableArgs) -> Result<(PathBuf, TableFormat), ConfigError> {
        let path = match (&args.registers, &self.registers.file) {
            (Some(path), _) => path.clone(),
            (None, Some(file)) => match &self.base_dir {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file.clone(),
            },
            (None, None) => return Err(ConfigError::MissingRegisters),
        };

        let format = match (args.format, &self.registers.format) {
            (Some(format), _) => format,
            (None, Some(format)) => {
                format
                    .parse()
                    .map_err(|reason| ConfigError::InvalidValue {
                        key: "registers.format",
                        reason,
                    })?
            }
            (None, None) => TableFormat::from_path(&path),
        };

        Ok((path, format))
    }

    /// Backend string, command line first
    pub fn resolve_programmer(&self, arg: Option<&str>) -> String {
        arg.or(self.device.programmer.as_deref())
            .unwrap_or(DEFAULT_PROGRAMMER)
            .to_string()
    }

    /// Loader settings, command line first
    pub fn resolve_loader(&self, delay_us: Option<u64>, strict_writes: bool) -> LoaderConfig {
        let register_delay = delay_us
            .or(self.device.delay_us)
            .map(Duration::from_micros)
            .unwrap_or(DEFAULT_REGISTER_DELAY);

        let policy = if strict_writes || self.device.strict_writes.unwrap_or(false) {
            WritePolicy::Strict
        } else {
            WritePolicy::Tolerant
        };

        LoaderConfig::default()
            .with_policy(policy)
            .with_register_delay(register_delay)
    }
}
