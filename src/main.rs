//! lmx2582ctl - LMX2582 PLL+VCO register loader
//!
//! Writes a 46-register configuration to a TI LMX2582 through the
//! `spi2pll_lxm2582_gpio` kernel driver, one 3-byte write per register with
//! a 1 ms pause in between.
//!
//! # Architecture
//!
//! - `lmx2582-core` holds the register table, the TICS Pro parser and the
//!   loader, which is generic over a `DeviceOpener`
//! - `lmx2582-spidev` opens the driver's device node
//! - `lmx2582-dummy` records writes in memory for dry runs
//!
//! Exit status is 0 when every register was written and 1 on any failure.

mod cli;
mod commands;
mod config;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use lmx2582_core::RegisterTable;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger, verbosity overrides the default
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Write {
            programmer,
            table,
            delay_us,
            strict_writes,
            no_progress,
        } => {
            let (path, format) = config.resolve_table(&table)?;
            let registers = RegisterTable::from_file(&path, format)?;
            let programmer = config.resolve_programmer(programmer.as_deref());
            let loader = config.resolve_loader(delay_us, strict_writes);

            log::debug!("Using {} with {:?}", programmer, loader);
            commands::run_write(&registers, &programmer, loader, !no_progress)?;
            Ok(())
        }
        Commands::Show { table } => {
            let (path, format) = config.resolve_table(&table)?;
            commands::run_show(&path, format)
        }
        Commands::Convert { table, output } => {
            let (path, format) = config.resolve_table(&table)?;
            commands::run_convert(&path, format, &output)
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
    }
}
