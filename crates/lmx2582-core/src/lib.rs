//! lmx2582-core - Register table and loader for the LMX2582 PLL+VCO
//!
//! The LMX2582 is configured by shifting 46 24-bit words into it, one per
//! register, in a fixed order from R70 down to R0. This crate holds that
//! table and the sequencing around pushing it to a device.
//!
//! # Overview
//!
//! - [`table`]: the [`RegisterTable`] type and its size invariant
//! - [`tics`]: parser for register exports produced by TI's TICS Pro
//! - [`loader`]: the [`RegisterLoader`] write loop and its device traits
//! - [`pacing`]: the inter-register [`Delay`] abstraction
//!
//! # Example
//!
//! ```ignore
//! use lmx2582_core::{LoaderConfig, RegisterLoader, RegisterTable};
//!
//! let table = RegisterTable::from_tics_file("lmx2582_1ghz.txt")?;
//! let mut loader = RegisterLoader::new(LoaderConfig::default());
//! let report = loader.run(&table, &mut device)?;
//! println!("{} registers written", report.registers_written);
//! ```

pub mod error;
pub mod loader;
pub mod pacing;
pub mod table;
pub mod tics;

// Re-exports
pub use error::{LoadError, Result, TableError};
pub use loader::{
    DeviceOpener, LoadProgress, LoadReport, LoaderConfig, NoProgress, RegisterDevice,
    RegisterLoader, WritePolicy,
};
pub use pacing::{Delay, ThreadDelay, DEFAULT_REGISTER_DELAY};
pub use table::{
    RegisterTable, TableFormat, WriteTransaction, BYTES_PER_REGISTER, PROGRAMMING_ORDER, REGISTERS,
    TABLE_BYTES,
};
