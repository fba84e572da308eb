//! Inter-register pacing

use std::time::Duration;

/// Delay after every register write (1 ms)
///
/// The spi2pll_lxm2582 driver bit-bangs the 3-wire bus and needs this gap
/// between consecutive writes.
pub const DEFAULT_REGISTER_DELAY: Duration = Duration::from_micros(1000);

/// Blocking delay source
pub trait Delay {
    /// Block for at least `duration`
    fn delay(&mut self, duration: Duration);
}

/// [`Delay`] backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
