//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand};
use lmx2582_core::TableFormat;
use std::path::PathBuf;

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Device backend, e.g. spidev:dev=/dev/spi_3wires_lxm2582 [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "lmx2582ctl")]
#[command(author, version, about = "LMX2582 PLL+VCO register loader", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML format)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Register table options shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Register table file (TICS Pro export or raw binary)
    #[arg(short, long)]
    pub registers: Option<PathBuf>,

    /// Register table format [tics, raw] (default: guessed from the file extension)
    #[arg(long)]
    pub format: Option<TableFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the register table to the chip
    Write {
        /// Device backend to use
        #[arg(short, long, help = programmer_help())]
        programmer: Option<String>,

        #[command(flatten)]
        table: TableArgs,

        /// Delay after each register write, in microseconds
        #[arg(long)]
        delay_us: Option<u64>,

        /// Treat a write that reports fewer than 3 bytes as a failure
        #[arg(long)]
        strict_writes: bool,

        /// Don't show a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Parse and print a register table without touching the device
    Show {
        #[command(flatten)]
        table: TableArgs,
    },

    /// Convert a register table to raw binary
    Convert {
        #[command(flatten)]
        table: TableArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List device backends
    ListProgrammers,
}
