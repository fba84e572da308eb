//! Character device implementation
//!
//! This module provides `SpidevOpener`, which implements `DeviceOpener` by
//! opening the driver's device node write-only, and `SpidevHandle`, the
//! open node.

use crate::error::{Result, SpidevError};

use lmx2582_core::{DeviceOpener, RegisterDevice};

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// Device node created by the spi2pll_lxm2582 driver
///
/// Rigol spells the chip "lxm2582" in the driver name.
pub const DEFAULT_DEVICE: &str = "/dev/spi_3wires_lxm2582";

/// Configuration for opening the device node
#[derive(Debug, Clone)]
pub struct SpidevConfig {
    /// Device path (e.g., "/dev/spi_3wires_lxm2582")
    pub device: String,
}

impl Default for SpidevConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

impl SpidevConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

/// Opens the driver's device node
#[derive(Debug, Clone)]
pub struct SpidevOpener {
    config: SpidevConfig,
}

impl SpidevOpener {
    pub fn new(config: SpidevConfig) -> Self {
        Self { config }
    }

    /// Opener for a device path with default settings
    pub fn with_device(device: &str) -> Self {
        Self::new(SpidevConfig::new(device))
    }
}

impl DeviceOpener for SpidevOpener {
    type Device = SpidevHandle;

    fn path(&self) -> &str {
        &self.config.device
    }

    fn open(&mut self) -> io::Result<SpidevHandle> {
        log::debug!("spidev: Opening {} write-only", self.config.device);

        let file = OpenOptions::new().write(true).open(&self.config.device)?;

        log::debug!("spidev: Opened {}", self.config.device);
        Ok(SpidevHandle {
            file: Some(file),
            path: self.config.device.clone(),
        })
    }
}

/// Open device node
///
/// The file is closed by [`RegisterDevice::close`] or, failing that, when
/// the handle is dropped.
#[derive(Debug)]
pub struct SpidevHandle {
    file: Option<File>,
    path: String,
}

impl SpidevHandle {
    /// Whether the node is still open
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl RegisterDevice for SpidevHandle {
    /// Single `write()` call, no retry on a short count
    ///
    /// The driver returns 0 on success, which `write_all` reports as
    /// `WriteZero`.
    fn write_register(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("{} is closed", self.path),
            )),
        }
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            log::debug!("spidev: Closed {}", self.path);
        }
    }
}

/// Parse programmer options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<SpidevConfig> {
    let mut config = SpidevConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                if value.is_empty() {
                    return Err(SpidevError::NoDevice);
                }
                config.device = value.to_string();
            }
            _ => {
                return Err(SpidevError::InvalidParameter(format!(
                    "unknown option {}={}",
                    key, value
                )));
            }
        }
    }

    Ok(config)
}
