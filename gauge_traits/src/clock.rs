use std::thread;
use std::time::{Duration, Instant};

/// Millisecond tick source for scheduling across the stack.
///
/// - now_ms(): monotonic milliseconds as a free-running 32-bit counter.
///   The counter wraps after ~49.7 days; consumers must compute elapsed
///   time with wraparound-safe arithmetic rather than plain subtraction.
/// - sleep(): sleeps for the provided duration (implementations may
///   simulate).
pub trait Clock {
    fn now_ms(&self) -> u32;
    fn sleep(&self, d: Duration);
}

/// Default real-time clock: milliseconds since process start, backed by
/// `std::time::Instant`. Truncation to u32 reproduces the wraparound of a
/// hardware millisecond counter.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(test)]
pub mod test_clock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Deterministic test clock whose time can be advanced manually.
    ///
    /// now_ms() = the stored tick; sleep(d) advances it by d without
    /// actually sleeping. Advancing past u32::MAX wraps, which is exactly
    /// the rollover case schedulers must survive.
    #[derive(Debug, Clone, Default)]
    pub struct TestClock {
        ticks: Arc<AtomicU32>,
    }

    impl TestClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advance(&self, d: Duration) {
            let ms = d.as_millis() as u32;
            self.ticks.fetch_add(ms, Ordering::Relaxed);
        }

        pub fn set(&self, now_ms: u32) {
            self.ticks.store(now_ms, Ordering::Relaxed);
        }
    }

    impl Clock for TestClock {
        fn now_ms(&self) -> u32 {
            self.ticks.load(Ordering::Relaxed)
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

    #[test]
    fn advance_wraps_like_hardware_millis() {
        let c = TestClock::new();
        c.set(u32::MAX - 5);
        c.advance(Duration::from_millis(10));
        assert_eq!(c.now_ms(), 4);
    }
}
