//! Register loader
//!
//! Pushes a [`RegisterTable`] to a device one register at a time:
//!
//! 1. Validate the table size (no device I/O on failure)
//! 2. Open the device write-only
//! 3. Write each register in table order, pausing after every write
//! 4. Close the device
//!
//! The first failure aborts the run. A new run always starts from the
//! first register; there is no resume.

use std::io;
use std::time::Duration;

use crate::error::{LoadError, Result};
use crate::pacing::{Delay, ThreadDelay, DEFAULT_REGISTER_DELAY};
use crate::table::{RegisterTable, WriteTransaction, REGISTERS};

/// Write-only register sink (an open device handle)
pub trait RegisterDevice {
    /// Write one register word and return the count reported by the driver
    fn write_register(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Release the handle
    ///
    /// Called exactly once by the loader, on every exit path after a
    /// successful open.
    fn close(&mut self) {}
}

/// Opens a [`RegisterDevice`]
pub trait DeviceOpener {
    type Device: RegisterDevice;

    /// Path or name of the device, for diagnostics
    fn path(&self) -> &str;

    /// Open the device write-only
    fn open(&mut self) -> io::Result<Self::Device>;
}

/// How the byte count returned by a write is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Only an explicit error is a failure; any returned count is success
    ///
    /// The spi2pll_lxm2582 driver returns 0 from `write()` on success, so a
    /// short-write check would reject every register.
    #[default]
    Tolerant,
    /// A count below the register size is a failure
    Strict,
}

impl WritePolicy {
    /// Turn the outcome of a single write into a load result
    pub fn check(self, tx: &WriteTransaction<'_>, result: io::Result<usize>) -> Result<()> {
        let written = result.map_err(|source| LoadError::Write {
            offset: tx.offset,
            source,
        })?;

        if self == Self::Strict && written < tx.bytes.len() {
            return Err(LoadError::ShortWrite {
                offset: tx.offset,
                written,
                requested: tx.bytes.len(),
            });
        }

        Ok(())
    }
}

/// Loader settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Interpretation of write return values
    pub policy: WritePolicy,
    /// Pause after each register write
    pub register_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            policy: WritePolicy::default(),
            register_delay: DEFAULT_REGISTER_DELAY,
        }
    }
}

impl LoaderConfig {
    /// Set the write policy
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the delay after each register write
    pub fn with_register_delay(mut self, delay: Duration) -> Self {
        self.register_delay = delay;
        self
    }
}

/// Outcome of a completed load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub registers_written: usize,
    pub bytes_written: usize,
}

/// Progress callbacks for a load
pub trait LoadProgress {
    /// Called once the device is open, before the first write
    fn started(&mut self, registers: usize);

    /// Called after each accepted register write
    fn register_written(&mut self, tx: &WriteTransaction<'_>);

    /// Called after the device has been closed on success
    fn finished(&mut self, report: &LoadReport);
}

/// A no-op progress reporter
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn started(&mut self, _registers: usize) {}
    fn register_written(&mut self, _tx: &WriteTransaction<'_>) {}
    fn finished(&mut self, _report: &LoadReport) {}
}

/// Open device, closed when dropped
struct OpenDevice<D: RegisterDevice> {
    device: D,
}

impl<D: RegisterDevice> OpenDevice<D> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.device.write_register(bytes)
    }
}

impl<D: RegisterDevice> Drop for OpenDevice<D> {
    fn drop(&mut self) {
        self.device.close();
    }
}

/// Sequential register writer
pub struct RegisterLoader<D: Delay = ThreadDelay> {
    config: LoaderConfig,
    delay: D,
}

impl RegisterLoader<ThreadDelay> {
    /// Create a loader that sleeps the calling thread between writes
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_delay(config, ThreadDelay)
    }
}

impl<D: Delay> RegisterLoader<D> {
    /// Create a loader with a custom delay source
    pub fn with_delay(config: LoaderConfig, delay: D) -> Self {
        Self { config, delay }
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Write `table` to the device opened by `opener`
    pub fn run<O>(&mut self, table: &RegisterTable, opener: &mut O) -> Result<LoadReport>
    where
        O: DeviceOpener + ?Sized,
    {
        self.run_with_progress(table, opener, &mut NoProgress)
    }

    /// Write `table` to the device opened by `opener`, reporting progress
    pub fn run_with_progress<O, P>(
        &mut self,
        table: &RegisterTable,
        opener: &mut O,
        progress: &mut P,
    ) -> Result<LoadReport>
    where
        O: DeviceOpener + ?Sized,
        P: LoadProgress + ?Sized,
    {
        table.validate()?;

        log::debug!("Opening {}", opener.path());
        let device = opener.open().map_err(|source| LoadError::Open {
            path: opener.path().to_string(),
            source,
        })?;
        let mut device = OpenDevice { device };

        log::info!(
            "Writing {} registers to {} ({:?} between writes, {:?} policy)",
            REGISTERS,
            opener.path(),
            self.config.register_delay,
            self.config.policy
        );
        progress.started(REGISTERS);

        let mut report = LoadReport {
            registers_written: 0,
            bytes_written: 0,
        };
        for tx in table.transactions() {
            log::debug!("[{:2}] byte {:3}: {}", tx.index, tx.offset, tx);

            let result = device.write(tx.bytes);
            self.config.policy.check(&tx, result)?;

            report.registers_written += 1;
            report.bytes_written += tx.bytes.len();
            progress.register_written(&tx);

            self.delay.delay(self.config.register_delay);
        }

        drop(device);
        log::info!(
            "Wrote {} registers ({} bytes)",
            report.registers_written,
            report.bytes_written
        );
        progress.finished(&report);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{BYTES_PER_REGISTER, TABLE_BYTES};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Open,
        Write(usize, Vec<u8>),
        Delay(Duration),
        Close,
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct TestDevice {
        log: Log,
        writes: usize,
        fail_at: Option<usize>,
        reply: fn(usize) -> usize,
    }

    impl RegisterDevice for TestDevice {
        fn write_register(&mut self, bytes: &[u8]) -> io::Result<usize> {
            let index = self.writes;
            self.writes += 1;
            self.log
                .borrow_mut()
                .push(Event::Write(index, bytes.to_vec()));
            if self.fail_at == Some(index) {
                return Err(io::Error::from_raw_os_error(5));
            }
            Ok((self.reply)(index))
        }

        fn close(&mut self) {
            self.log.borrow_mut().push(Event::Close);
        }
    }

    struct TestOpener {
        log: Log,
        fail_open: bool,
        fail_at: Option<usize>,
        reply: fn(usize) -> usize,
    }

    impl TestOpener {
        /// `reply` gives the count returned for the write at each index
        fn new(reply: fn(usize) -> usize) -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                fail_open: false,
                fail_at: None,
                reply,
            }
        }

        fn failing_at(mut self, index: usize) -> Self {
            self.fail_at = Some(index);
            self
        }

        fn events(&self) -> Vec<Event> {
            self.log.borrow().clone()
        }

        fn writes(&self) -> Vec<(usize, Vec<u8>)> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Write(i, b) => Some((i, b)),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, event: &Event) -> usize {
            self.events().iter().filter(|e| *e == event).count()
        }
    }

    impl DeviceOpener for TestOpener {
        type Device = TestDevice;

        fn path(&self) -> &str {
            "/dev/test_lmx2582"
        }

        fn open(&mut self) -> io::Result<TestDevice> {
            self.log.borrow_mut().push(Event::Open);
            if self.fail_open {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            Ok(TestDevice {
                log: self.log.clone(),
                writes: 0,
                fail_at: self.fail_at,
                reply: self.reply,
            })
        }
    }

    /// Records delays into the opener's event log instead of sleeping
    struct LogDelay(Log);

    impl Delay for LogDelay {
        fn delay(&mut self, duration: Duration) {
            self.0.borrow_mut().push(Event::Delay(duration));
        }
    }

    fn loader(opener: &TestOpener, config: LoaderConfig) -> RegisterLoader<LogDelay> {
        RegisterLoader::with_delay(config, LogDelay(opener.log.clone()))
    }

    fn table() -> RegisterTable {
        RegisterTable::from_bytes((0..TABLE_BYTES as u8).collect::<Vec<_>>())
    }

    #[test]
    fn test_bad_table_size_never_opens() {
        for len in [0, 3, 137, 139, 276] {
            let mut opener = TestOpener::new(|_| 0);
            let mut loader = loader(&opener, LoaderConfig::default());
            let err = loader
                .run(&RegisterTable::from_bytes(vec![0u8; len]), &mut opener)
                .unwrap_err();

            assert!(matches!(err, LoadError::DataIntegrity { actual, .. } if actual == len));
            assert!(opener.events().is_empty());
        }
    }

    #[test]
    fn test_writes_all_registers_in_order() {
        let mut opener = TestOpener::new(|_| 0);
        let mut loader = loader(&opener, LoaderConfig::default());
        let table = table();

        let report = loader.run(&table, &mut opener).unwrap();
        assert_eq!(report.registers_written, REGISTERS);
        assert_eq!(report.bytes_written, TABLE_BYTES);

        let writes = opener.writes();
        assert_eq!(writes.len(), REGISTERS);
        for (i, (index, bytes)) in writes.iter().enumerate() {
            assert_eq!(*index, i);
            let offset = i * BYTES_PER_REGISTER;
            assert_eq!(bytes.as_slice(), &table.as_bytes()[offset..offset + 3]);
        }
    }

    #[test]
    fn test_delay_after_every_write() {
        let mut opener = TestOpener::new(|_| 3);
        let mut loader = loader(&opener, LoaderConfig::default());
        loader.run(&table(), &mut opener).unwrap();

        let events = opener.events();
        assert_eq!(events.first(), Some(&Event::Open));
        assert_eq!(events.last(), Some(&Event::Close));

        let body = &events[1..events.len() - 1];
        assert_eq!(body.len(), REGISTERS * 2);
        for pair in body.chunks(2) {
            assert!(matches!(pair[0], Event::Write(..)));
            assert_eq!(pair[1], Event::Delay(Duration::from_micros(1000)));
        }
    }

    #[test]
    fn test_custom_register_delay() {
        let mut opener = TestOpener::new(|_| 0);
        let config = LoaderConfig::default().with_register_delay(Duration::from_millis(5));
        let mut loader = loader(&opener, config);
        loader.run(&table(), &mut opener).unwrap();

        assert_eq!(
            opener.count(&Event::Delay(Duration::from_millis(5))),
            REGISTERS
        );
    }

    #[test]
    fn test_zero_return_is_success() {
        let mut opener = TestOpener::new(|_| 0);
        let mut loader = loader(&opener, LoaderConfig::default());
        assert!(loader.run(&table(), &mut opener).is_ok());
        assert_eq!(opener.count(&Event::Close), 1);
    }

    #[test]
    fn test_write_error_stops_at_failing_register() {
        for k in [0usize, 1, 17, 45] {
            let mut opener = TestOpener::new(|_| 0).failing_at(k);
            let mut loader = loader(&opener, LoaderConfig::default());
            let err = loader.run(&table(), &mut opener).unwrap_err();

            match &err {
                LoadError::Write { offset, .. } => assert_eq!(*offset, k * 3),
                other => panic!("unexpected {:?}", other),
            }
            assert_eq!(err.offset(), Some(k * 3));

            let writes = opener.writes();
            assert_eq!(writes.len(), k + 1);
            assert_eq!(writes.last().map(|w| w.0), Some(k));

            assert_eq!(opener.count(&Event::Close), 1);
            assert_eq!(opener.events().last(), Some(&Event::Close));
            // No pause after the failed write
            assert_eq!(opener.count(&Event::Delay(DEFAULT_REGISTER_DELAY)), k);
        }
    }

    #[test]
    fn test_open_failure_writes_nothing() {
        let mut opener = TestOpener::new(|_| 0);
        opener.fail_open = true;
        let mut loader = loader(&opener, LoaderConfig::default());

        let err = loader.run(&table(), &mut opener).unwrap_err();
        match &err {
            LoadError::Open { path, source } => {
                assert_eq!(path, "/dev/test_lmx2582");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(opener.events(), vec![Event::Open]);
    }

    #[test]
    fn test_fresh_run_restarts_at_first_register() {
        let mut failing = TestOpener::new(|_| 0).failing_at(10);
        let mut loader = loader(&failing, LoaderConfig::default());
        let table = table();
        assert!(loader.run(&table, &mut failing).is_err());

        let mut healthy = TestOpener::new(|_| 0);
        let mut loader =
            RegisterLoader::with_delay(LoaderConfig::default(), LogDelay(healthy.log.clone()));
        loader.run(&table, &mut healthy).unwrap();

        let writes = healthy.writes();
        assert_eq!(writes.len(), REGISTERS);
        assert_eq!(writes[0].1.as_slice(), &table.as_bytes()[..3]);
    }

    #[test]
    fn test_strict_policy_rejects_short_write() {
        let mut opener = TestOpener::new(|i| if i < 2 { 3 } else { 0 });
        let config = LoaderConfig::default().with_policy(WritePolicy::Strict);
        let mut loader = loader(&opener, config);

        let err = loader.run(&table(), &mut opener).unwrap_err();
        match err {
            LoadError::ShortWrite {
                offset,
                written,
                requested,
            } => {
                assert_eq!(offset, 6);
                assert_eq!(written, 0);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(opener.writes().len(), 3);
        assert_eq!(opener.count(&Event::Close), 1);
    }

    #[test]
    fn test_strict_policy_accepts_full_writes() {
        let mut opener = TestOpener::new(|_| 3);
        let config = LoaderConfig::default().with_policy(WritePolicy::Strict);
        let mut loader = loader(&opener, config);
        assert!(loader.run(&table(), &mut opener).is_ok());
    }

    #[test]
    fn test_progress_callbacks() {
        #[derive(Default)]
        struct Counter {
            started: Option<usize>,
            offsets: Vec<usize>,
            finished: Option<LoadReport>,
        }

        impl LoadProgress for Counter {
            fn started(&mut self, registers: usize) {
                self.started = Some(registers);
            }
            fn register_written(&mut self, tx: &WriteTransaction<'_>) {
                self.offsets.push(tx.offset);
            }
            fn finished(&mut self, report: &LoadReport) {
                self.finished = Some(*report);
            }
        }

        let mut opener = TestOpener::new(|_| 0);
        let mut loader = loader(&opener, LoaderConfig::default());
        let mut progress = Counter::default();
        loader
            .run_with_progress(&table(), &mut opener, &mut progress)
            .unwrap();

        assert_eq!(progress.started, Some(REGISTERS));
        let expected: Vec<usize> = (0..REGISTERS).map(|i| i * 3).collect();
        assert_eq!(progress.offsets, expected);
        assert_eq!(progress.finished.map(|r| r.registers_written), Some(REGISTERS));
    }

    #[test]
    fn test_error_messages() {
        let err = LoadError::DataIntegrity {
            expected: 138,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "Bad data: register table is 12 bytes, expected 138"
        );

        let err = LoadError::Write {
            offset: 27,
            source: io::Error::new(io::ErrorKind::Other, "Input/output error"),
        };
        assert_eq!(err.to_string(), "Write error at byte 27: Input/output error");
    }
}
