//! Man page generator for lmx2582ctl
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::PathBuf;

#[path = "../cli.rs"]
mod cli;
#[allow(dead_code)]
#[path = "../programmers.rs"]
mod programmers;

/// Layout of the file passed with `--config`
const CONFIG_SECTION: &str = "\
CONFIGURATION
    --config <FILE> reads a TOML file with two optional sections. Unknown keys
    are rejected and command line options take precedence.

    [device]
    programmer = \"spidev:dev=/dev/spi_3wires_lxm2582\"
    delay_us = 1000
    strict_writes = false

    [registers]
    file = \"lmx2582_1ghz.txt\"
    format = \"tics\"

    A relative registers file is resolved against the directory of the
    configuration file.";

fn render() -> std::io::Result<Vec<u8>> {
    let cmd = cli::Cli::command().after_long_help(CONFIG_SECTION);
    let man = clap_mangen::Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    Ok(buffer)
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let output_dir = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let output_path = output_dir.join("lmx2582ctl.1");
    fs::write(&output_path, render()?)?;

    println!("Man page generated at: {}", output_path.display());
    println!("  man -l {}", output_path.display());

    Ok(())
}
