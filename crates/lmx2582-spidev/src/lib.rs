//! lmx2582-spidev - Character device backend for the LMX2582 loader
//!
//! Rigol's `spi2pll_lxm2582_gpio` kernel driver bit-bangs the LMX2582's
//! 3-wire bus and exposes it as a write-only character device. Every
//! `write()` of 3 bytes shifts one register word into the chip.
//!
//! # Example
//!
//! ```no_run
//! use lmx2582_core::{LoaderConfig, RegisterLoader, RegisterTable};
//! use lmx2582_spidev::{SpidevConfig, SpidevOpener};
//!
//! let table = RegisterTable::from_tics_file("lmx2582.txt")?;
//! let mut device = SpidevOpener::new(SpidevConfig::default());
//! RegisterLoader::new(LoaderConfig::default()).run(&table, &mut device)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with lmx2582ctl CLI
//!
//! ```bash
//! # Default device node
//! lmx2582ctl write -r lmx2582.txt
//!
//! # Explicit device node
//! lmx2582ctl write -r lmx2582.txt -p spidev:dev=/dev/spi_3wires_lxm2582
//! ```
//!
//! # System Requirements
//!
//! - `spi2pll_lxm2582_gpio` (or a compatible driver) loaded
//! - Write access to the device node

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, SpidevConfig, SpidevHandle, SpidevOpener, DEFAULT_DEVICE};
pub use error::{Result, SpidevError};

/// Build an opener from programmer options
///
/// # Example Options
///
/// - `dev=/dev/spi_3wires_lxm2582` - Optional: device path
pub fn open_spidev(options: &[(&str, &str)]) -> Result<SpidevOpener> {
    let config = parse_options(options)?;
    Ok(SpidevOpener::new(config))
}
