//! Convert command implementation

use lmx2582_core::{RegisterTable, TableFormat};
use std::fs;
use std::path::Path;

/// Convert a register table to a raw binary file
pub fn run_convert(
    input: &Path,
    format: TableFormat,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = RegisterTable::from_file(input, format)?;
    table.validate()?;

    fs::write(output, table.as_bytes())?;
    println!("Wrote {} bytes to {:?}", table.len(), output);

    Ok(())
}
