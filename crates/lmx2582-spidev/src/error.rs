//! Error types for device option parsing

use thiserror::Error;

/// spidev backend errors
#[derive(Debug, Error)]
pub enum SpidevError {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device path given but empty
    #[error("No device specified. Use dev=/dev/<node>")]
    NoDevice,
}

/// Result type for spidev backend operations
pub type Result<T> = std::result::Result<T, SpidevError>;
