//! Settle throttle: paces a burst of sequencer requests with a fixed pause.

use std::time::Duration;


/// Inserts `interval` between consecutive calls to [`Throttle::pace`].
///
/// The first call returns immediately; every later call sleeps first.
/// A zero interval never sleeps.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    calls: u64,
}


impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle { interval, calls: 0 }
    }

    /// A throttle that never sleeps.
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait if a previous call has been paced, then count this one.
    pub fn pace(&mut self) {
        if self.calls > 0 && !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
        self.calls += 1;
    }

    /// Number of calls paced so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
