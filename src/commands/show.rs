//! Show command implementation

use lmx2582_core::{RegisterTable, TableFormat};
use std::path::Path;

/// Parse a register table and print it
///
/// The size check runs after printing so a malformed raw table can still
/// be inspected.
pub fn run_show(path: &Path, format: TableFormat) -> Result<(), Box<dyn std::error::Error>> {
    let table = RegisterTable::from_file(path, format)?;

    println!("Register table: {} ({})", path.display(), format);
    println!();
    println!("{:>5} {:>6}  {:<8} {:>8}", "Index", "Offset", "Register", "Value");
    println!("{}", "-".repeat(32));

    for tx in table.transactions() {
        println!(
            "{:>5} {:>6}  R{:<7} 0x{:02X}{:02X}{:02X}",
            tx.index,
            tx.offset,
            tx.address(),
            tx.bytes[0],
            tx.bytes[1],
            tx.bytes[2]
        );
    }

    println!();
    table.validate()?;
    println!("{} bytes, table OK", table.len());

    Ok(())
}
