//! lmx2582-dummy - In-memory register sink for testing
//!
//! This crate provides a device that records every register write instead
//! of sending it to hardware. It's useful for dry runs and for exercising
//! the loader's failure paths without a board.
//!
//! Recorded state is shared between the [`DummyOpener`] and the devices it
//! opens, so it can be inspected after the loader has dropped the device.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use lmx2582_core::{DeviceOpener, RegisterDevice};

/// Name reported as the device path
pub const DUMMY_PATH: &str = "dummy";

/// Error code for a failed write
const EIO: i32 = 5;

/// Byte count a successful dummy write reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportedCount {
    /// Always 0, like the spi2pll_lxm2582 driver
    #[default]
    Zero,
    /// The full register size
    Full,
    /// A fixed value
    Fixed(usize),
}

/// Configuration for the dummy device
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    /// Fail `open()` with this error kind
    pub fail_open: Option<io::ErrorKind>,
    /// Fail the write with this index (0-based)
    pub fail_write_at: Option<usize>,
    /// Count returned by successful writes
    pub reported: ReportedCount,
}

/// Everything the dummy device has seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DummyState {
    /// Number of `open()` calls
    pub opens: usize,
    /// Number of `close()` calls
    pub closes: usize,
    /// Register words in the order they were written, including a failed one
    pub writes: Vec<Vec<u8>>,
}

/// Opens [`DummyDevice`]s that record into a shared [`DummyState`]
#[derive(Debug, Clone, Default)]
pub struct DummyOpener {
    config: DummyConfig,
    state: Rc<RefCell<DummyState>>,
}

impl DummyOpener {
    /// Create a new dummy opener with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            state: Rc::default(),
        }
    }

    /// Create a dummy opener that accepts everything
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Snapshot of the recorded state
    pub fn state(&self) -> DummyState {
        self.state.borrow().clone()
    }

    /// Register words written so far
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.borrow().writes.clone()
    }
}

impl DeviceOpener for DummyOpener {
    type Device = DummyDevice;

    fn path(&self) -> &str {
        DUMMY_PATH
    }

    fn open(&mut self) -> io::Result<DummyDevice> {
        self.state.borrow_mut().opens += 1;

        if let Some(kind) = self.config.fail_open {
            log::debug!("dummy: open failing with {:?}", kind);
            return Err(io::Error::from(kind));
        }

        log::debug!("dummy: opened");
        Ok(DummyDevice {
            config: self.config.clone(),
            state: self.state.clone(),
            writes: 0,
        })
    }
}

/// Recording register sink
#[derive(Debug)]
pub struct DummyDevice {
    config: DummyConfig,
    state: Rc<RefCell<DummyState>>,
    writes: usize,
}

impl RegisterDevice for DummyDevice {
    fn write_register(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let index = self.writes;
        self.writes += 1;
        self.state.borrow_mut().writes.push(bytes.to_vec());

        if self.config.fail_write_at == Some(index) {
            log::debug!("dummy: write {} failing", index);
            return Err(io::Error::from_raw_os_error(EIO));
        }

        log::trace!("dummy: write {} {:02X?}", index, bytes);
        Ok(match self.config.reported {
            ReportedCount::Zero => 0,
            ReportedCount::Full => bytes.len(),
            ReportedCount::Fixed(n) => n,
        })
    }

    fn close(&mut self) {
        self.state.borrow_mut().closes += 1;
        log::debug!("dummy: closed after {} writes", self.writes);
    }
}

/// Parse dummy options from a list of key-value pairs
///
/// - `fail_open=<kind>`: `notfound` or `denied`
/// - `fail_at=<index>`: fail the write at this register index
/// - `reported=<zero|full|N>`: count returned by successful writes
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "fail_open" => {
                config.fail_open = Some(match *value {
                    "notfound" => io::ErrorKind::NotFound,
                    "denied" => io::ErrorKind::PermissionDenied,
                    _ => return Err(format!("Invalid fail_open value: {}", value)),
                });
            }
            "fail_at" => {
                let index: usize = value
                    .parse()
                    .map_err(|_| format!("Invalid fail_at value: {}", value))?;
                config.fail_write_at = Some(index);
            }
            "reported" => {
                config.reported = match *value {
                    "zero" => ReportedCount::Zero,
                    "full" => ReportedCount::Full,
                    n => ReportedCount::Fixed(
                        n.parse()
                            .map_err(|_| format!("Invalid reported value: {}", value))?,
                    ),
                };
            }
            _ => return Err(format!("Unknown option: {}={}", key, value)),
        }
    }

    Ok(config)
}
