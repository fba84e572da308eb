//! Write command implementation

use indicatif::{ProgressBar, ProgressStyle};
use lmx2582_core::{
    DeviceOpener, LoadProgress, LoadReport, LoaderConfig, NoProgress, RegisterLoader,
    RegisterTable, WriteTransaction,
};

use crate::programmers::{find_programmer, parse_programmer_string, unknown_programmer_error};

/// Progress bar over the register writes
struct BarProgress {
    pb: Option<ProgressBar>,
}

impl LoadProgress for BarProgress {
    fn started(&mut self, registers: usize) {
        let pb = ProgressBar::new(registers as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        self.pb = Some(pb);
    }

    fn register_written(&mut self, tx: &WriteTransaction<'_>) {
        if let Some(pb) = &self.pb {
            pb.set_message(format!("R{}", tx.address()));
            pb.inc(1);
        }
    }

    fn finished(&mut self, _report: &LoadReport) {
        if let Some(pb) = self.pb.take() {
            pb.finish_with_message("done");
        }
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        // Failed runs leave the bar where the write stopped
        if let Some(pb) = self.pb.take() {
            pb.abandon();
        }
    }
}

/// Write `table` through the backend named by `programmer`
pub fn run_write(
    table: &RegisterTable,
    programmer: &str,
    config: LoaderConfig,
    show_progress: bool,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let (name, options) = parse_programmer_string(programmer)?;
    let canonical = find_programmer(name).ok_or_else(|| unknown_programmer_error(name))?;

    match canonical {
        #[cfg(feature = "spidev")]
        "spidev" => {
            let mut opener = lmx2582_spidev::open_spidev(&options)?;
            load(table, &mut opener, config, show_progress)
        }

        #[cfg(feature = "dummy")]
        "dummy" => {
            let dummy_config = lmx2582_dummy::parse_options(&options)?;
            let mut opener = lmx2582_dummy::DummyOpener::new(dummy_config);
            let result = load(table, &mut opener, config, show_progress);

            let state = opener.state();
            log::info!(
                "dummy: {} open(s), {} close(s), {} write(s)",
                state.opens,
                state.closes,
                state.writes.len()
            );
            result
        }

        _ => Err(unknown_programmer_error(name)),
    }
}

fn load<O: DeviceOpener>(
    table: &RegisterTable,
    opener: &mut O,
    config: LoaderConfig,
    show_progress: bool,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let mut loader = RegisterLoader::new(config);

    let report = if show_progress {
        loader.run_with_progress(table, opener, &mut BarProgress { pb: None })?
    } else {
        loader.run_with_progress(table, opener, &mut NoProgress)?
    };

    Ok(report)
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use lmx2582_core::{LoadError, TABLE_BYTES};
    use std::time::Duration;

    fn fast() -> LoaderConfig {
        LoaderConfig::default().with_register_delay(Duration::ZERO)
    }

    fn table() -> RegisterTable {
        RegisterTable::from_bytes(vec![0u8; TABLE_BYTES])
    }

    #[test]
    fn test_dummy_write() {
        let report = run_write(&table(), "dummy", fast(), false).unwrap();
        assert_eq!(report.registers_written, 46);
    }

    #[test]
    fn test_dummy_write_failure() {
        let err = run_write(&table(), "dummy:fail_at=4", fast(), false).unwrap_err();
        let load = err.downcast_ref::<LoadError>().unwrap();
        assert_eq!(load.offset(), Some(12));
    }

    #[test]
    fn test_unknown_programmer() {
        let err = run_write(&table(), "ch341a", fast(), false).unwrap_err();
        assert!(err.to_string().starts_with("Unknown device backend: ch341a"));
    }

    #[test]
    fn test_bad_backend_options() {
        let err = run_write(&table(), "dummy:fail_att=3", fast(), false).unwrap_err();
        assert_eq!(err.to_string(), "Unknown option: fail_att=3");

        let err = run_write(&table(), "dummy:4", fast(), false).unwrap_err();
        assert!(err.to_string().starts_with("Malformed option '4'"));
    }
}
