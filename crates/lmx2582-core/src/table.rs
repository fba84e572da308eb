//! LMX2582 register table
//!
//! Each register is written as a 24-bit word, MSB first:
//!
//! ```text
//! [R/W bit, 0 writes] [7-bit address] [16-bit data field]
//! ```
//!
//! The table holds the 46 registers the chip needs, already ordered for
//! programming (highest address first, R0 last so the VCO calibration runs
//! with everything else in place).

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{LoadError, TableError};

/// Number of registers in a complete LMX2582 configuration
pub const REGISTERS: usize = 46;

/// Size of a single register write
pub const BYTES_PER_REGISTER: usize = 3;

/// Total size of a valid register table
pub const TABLE_BYTES: usize = REGISTERS * BYTES_PER_REGISTER;

/// Register addresses in the order they must be programmed
pub const PROGRAMMING_ORDER: [u8; REGISTERS] = [
    70, 69, 68, 64, 62, 61, 59, 48, 47, 46, 45, 44, 43, 42, 41, 40, 39, 38, 37, 36, 35, 34, 33, 32,
    31, 30, 29, 28, 25, 24, 23, 22, 20, 19, 14, 13, 12, 11, 10, 9, 8, 7, 4, 2, 1, 0,
];

/// Mask for the address bits in the first byte of a register word
const ADDRESS_MASK: u8 = 0x7F;

/// On-disk format of a register table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    /// TICS Pro "export hex register values" text file
    #[default]
    Tics,
    /// Raw register bytes, three per register
    Raw,
}

impl TableFormat {
    /// Guess the format from a file extension (`.bin` is raw, anything else TICS)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => Self::Raw,
            _ => Self::Tics,
        }
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tics" | "txt" => Ok(Self::Tics),
            "raw" | "bin" => Ok(Self::Raw),
            _ => Err(format!("Unknown table format: {} (expected tics or raw)", s)),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tics => write!(f, "tics"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Ordered register values to push to the chip
///
/// Construction does not check the size; [`RegisterTable::validate`] does,
/// and the loader calls it before touching the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterTable {
    bytes: Vec<u8>,
}

impl RegisterTable {
    /// Wrap raw register bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Read a raw binary table
    pub fn from_raw_file(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Read {} raw register bytes from {}", bytes.len(), path.display());
        Ok(Self { bytes })
    }

    /// Read a table in the given format
    pub fn from_file(path: impl AsRef<Path>, format: TableFormat) -> Result<Self, TableError> {
        match format {
            TableFormat::Tics => Self::from_tics_file(path),
            TableFormat::Raw => Self::from_raw_file(path),
        }
    }

    /// Raw register bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check that the table is exactly [`TABLE_BYTES`] long
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.bytes.len() != TABLE_BYTES {
            return Err(LoadError::DataIntegrity {
                expected: TABLE_BYTES,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Iterate the register writes in table order
    ///
    /// A trailing partial register is not yielded.
    pub fn transactions(&self) -> impl Iterator<Item = WriteTransaction<'_>> {
        self.bytes
            .chunks_exact(BYTES_PER_REGISTER)
            .enumerate()
            .map(|(index, bytes)| WriteTransaction {
                index,
                offset: index * BYTES_PER_REGISTER,
                bytes,
            })
    }
}

/// One register write: the bytes to send and where they sit in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTransaction<'a> {
    /// Position in the table (0-based)
    pub index: usize,
    /// Byte offset in the table, used for diagnostics
    pub offset: usize,
    /// Register word, MSB first
    pub bytes: &'a [u8],
}

impl WriteTransaction<'_> {
    /// Register address encoded in the first byte
    pub fn address(&self) -> u8 {
        self.bytes[0] & ADDRESS_MASK
    }

    /// 16-bit data field
    pub fn data(&self) -> u16 {
        u16::from_be_bytes([self.bytes[1], self.bytes[2]])
    }
}

impl fmt::Display for WriteTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{:<2} 0x{:02X}{:02X}{:02X}",
            self.address(),
            self.bytes[0],
            self.bytes[1],
            self.bytes[2]
        )
    }
}
