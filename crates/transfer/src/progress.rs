//! Upload throughput over a sliding window of acknowledged chunks.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const DEFAULT_WINDOW: Duration = Duration::from_secs(5);
const DEFAULT_CAPACITY: usize = 100;

/// Bytes/second over the last few seconds of acknowledgements.
///
/// Owned by one upload session; not shared between threads.
#[derive(Debug, Clone)]
pub struct SpeedCalculator {
    samples: VecDeque<(Instant, u64)>,
    window: Duration,
    capacity: usize,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW, DEFAULT_CAPACITY)
    }
}

impl SpeedCalculator {
    /// Keeps samples newer than `window`, at most `capacity` of them.
    pub fn with_window(window: Duration, capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            window,
            capacity: capacity.max(2),
        }
    }

    /// Records `bytes` acknowledged now.
    pub fn add_sample(&mut self, bytes: u64) {
        self.add_sample_at(bytes, Instant::now());
    }

    fn add_sample_at(&mut self, bytes: u64, at: Instant) {
        self.samples.push_back((at, bytes));
        if let Some(cutoff) = at.checked_sub(self.window) {
            while self.samples.front().is_some_and(|(t, _)| *t < cutoff) {
                self.samples.pop_front();
            }
        }
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Average rate inside the window; 0.0 until two samples span some time.
    pub fn bytes_per_second(&self) -> f64 {
        let (Some((first, _)), Some((last, _))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let elapsed = last.duration_since(*first);
        if elapsed.is_zero() {
            return 0.0;
        }
        // The oldest sample only marks the start of the window.
        let bytes: u64 = self.samples.iter().skip(1).map(|(_, b)| b).sum();
        bytes as f64 / elapsed.as_secs_f64()
    }

    /// Time left for `remaining_bytes` at the current rate.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        let rate = self.bytes_per_second();
        (rate > 0.0).then(|| Duration::from_secs_f64(remaining_bytes as f64 / rate))
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
