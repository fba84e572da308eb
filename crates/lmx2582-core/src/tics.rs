//! TICS Pro register export parsing
//!
//! TICS Pro's "Export Hex Register Values" writes one register per line,
//! name and value separated by a tab:
//!
//! ```text
//! R70	0x460000
//! R69	0x450000
//! ...
//! R0	0x00221C
//! ```
//!
//! The export for the LMX2582 lists exactly the 46 registers in
//! [`PROGRAMMING_ORDER`], so the parsed table is already in write order.

use std::fs;
use std::path::Path;

use crate::error::TableError;
use crate::table::{RegisterTable, BYTES_PER_REGISTER, PROGRAMMING_ORDER, REGISTERS};

/// `0x` plus six hex digits
const VALUE_LEN: usize = 8;

impl RegisterTable {
    /// Parse a TICS Pro export
    pub fn from_tics_str(source: &str) -> Result<Self, TableError> {
        if source.trim().is_empty() {
            return Err(TableError::Empty);
        }

        let mut lines: Vec<&str> = source.split('\n').collect();
        if lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.len() != REGISTERS {
            return Err(TableError::LineCount {
                expected: REGISTERS,
                found: lines.len(),
            });
        }

        let mut bytes = Vec::with_capacity(REGISTERS * BYTES_PER_REGISTER);
        for (k, line) in lines.iter().enumerate() {
            let word = parse_line(k, line.trim())?;
            bytes.extend_from_slice(&word);
        }

        Ok(Self::from_bytes(bytes))
    }

    /// Read and parse a TICS Pro export file
    pub fn from_tics_file(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_tics_str(&source)?;
        log::info!("LMX2582 registers source: {}", path.display());
        Ok(table)
    }
}

/// Parse line `k` (0-based) into a register word
fn parse_line(k: usize, line: &str) -> Result<[u8; BYTES_PER_REGISTER], TableError> {
    let line_no = k + 1;

    let mut parts = line.split('\t');
    let (name, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(value), None) => (name, value),
        _ => return Err(TableError::Malformed { line: line_no }),
    };

    let number = parse_register_name(name).ok_or_else(|| TableError::BadName {
        line: line_no,
        name: name.to_string(),
    })?;

    let expected = PROGRAMMING_ORDER[k];
    if number != expected {
        return Err(TableError::UnexpectedRegister {
            line: line_no,
            expected,
            found: number,
        });
    }

    let bad_value = |reason| TableError::BadValue {
        line: line_no,
        name: name.to_string(),
        reason,
    };

    if value.len() != VALUE_LEN {
        return Err(bad_value("it should have 8 chars"));
    }
    let hex = value
        .strip_prefix("0x")
        .ok_or_else(|| bad_value("it should be hexadecimal and start with 0x"))?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad_value("it doesn't look like a hex number"));
    }

    let mut word = [0u8; BYTES_PER_REGISTER];
    for (i, byte) in word.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| bad_value("it doesn't look like a hex number"))?;
    }

    if word[0] & 0x7F != number {
        log::warn!(
            "Line {}: R{} value 0x{} encodes address {}",
            line_no,
            number,
            hex,
            word[0] & 0x7F
        );
    }

    Ok(word)
}

/// Parse `R<n>` with one or two decimal digits
fn parse_register_name(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('R')?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
