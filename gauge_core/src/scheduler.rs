//! Two-phase sampling cadence.
//!
//! The gauge samples fast for the first few seconds after power-on so a
//! freshly cleared rolling average converges before the driver looks at
//! the needle, then settles into a slow steady-state cadence.

use crate::util::elapsed_ms;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerCfg {
    /// Sampling interval during the startup window.
    pub startup_interval_ms: u32,
    /// Steady-state sampling interval.
    pub normal_interval_ms: u32,
    /// Elapsed time since boot after which the cadence settles.
    pub startup_window_ms: u32,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self {
            startup_interval_ms: 500,
            normal_interval_ms: 5_000,
            startup_window_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Startup,
    Normal,
}

/// Decides when the next sample is due. Transitions Startup -> Normal
/// exactly once and never back.
#[derive(Debug, Clone)]
pub struct SampleScheduler {
    cfg: SchedulerCfg,
    phase: Phase,
    boot_ms: u32,
    last_sample_ms: u32,
}

impl SampleScheduler {
    pub fn new(cfg: SchedulerCfg, now_ms: u32) -> Self {
        Self {
            cfg,
            phase: Phase::Startup,
            boot_ms: now_ms,
            last_sample_ms: now_ms,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn interval_ms(&self) -> u32 {
        match self.phase {
            Phase::Startup => self.cfg.startup_interval_ms,
            Phase::Normal => self.cfg.normal_interval_ms,
        }
    }

    /// Poll for a due sample. Returns false with no side effects when the
    /// interval has not elapsed. When due, the phase transition is
    /// checked first (once per due sample), then the sample time is
    /// recorded, so a due report is never issued twice without a
    /// qualifying delta in between.
    ///
    /// Elapsed math is wraparound-safe: a wrapped counter reads as the
    /// 30 s sentinel and forces an immediate re-sample.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if elapsed_ms(now_ms, self.last_sample_ms) < self.interval_ms() {
            return false;
        }
        if self.phase == Phase::Startup
            && elapsed_ms(now_ms, self.boot_ms) >= self.cfg.startup_window_ms
        {
            self.phase = Phase::Normal;
            tracing::debug!(now_ms, "sampling cadence settled to normal");
        }
        self.last_sample_ms = now_ms;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Phase, SampleScheduler, SchedulerCfg};

    fn sched() -> SampleScheduler {
        SampleScheduler::new(SchedulerCfg::default(), 0)
    }

    #[test]
    fn not_due_before_startup_interval() {
        let mut s = sched();
        assert!(!s.poll(0));
        assert!(!s.poll(499));
        assert_eq!(s.phase(), Phase::Startup);
    }

    #[test]
    fn startup_cadence_repeats_every_interval() {
        let mut s = sched();
        assert!(s.poll(500));
        assert!(!s.poll(700));
        assert!(!s.poll(999));
        assert!(s.poll(1_000));
        assert_eq!(s.phase(), Phase::Startup);
    }

    #[test]
    fn never_due_twice_at_the_same_instant() {
        let mut s = sched();
        assert!(s.poll(500));
        assert!(!s.poll(500));
    }

    #[test]
    fn settles_after_startup_window_and_never_reverts() {
        let mut s = sched();
        for t in [500, 1_000, 1_500, 2_000, 2_500, 3_000, 3_500, 4_000, 4_500] {
            assert!(s.poll(t), "startup sample at {t}");
            assert_eq!(s.phase(), Phase::Startup);
        }
        // The due sample at t=5000 crosses the window and settles.
        assert!(s.poll(5_000));
        assert_eq!(s.phase(), Phase::Normal);
        // Now the slow cadence applies.
        assert!(!s.poll(5_500));
        assert!(!s.poll(9_999));
        assert!(s.poll(10_000));
        assert_eq!(s.phase(), Phase::Normal);
        // Much later, still Normal.
        assert!(s.poll(1_000_000));
        assert_eq!(s.phase(), Phase::Normal);
    }

    #[test]
    fn late_first_poll_settles_immediately() {
        // If the loop never polled during the whole startup window, the
        // first due sample already transitions.
        let mut s = sched();
        assert!(s.poll(7_000));
        assert_eq!(s.phase(), Phase::Normal);
    }

    #[test]
    fn wraparound_forces_immediate_sample() {
        let cfg = SchedulerCfg::default();
        let mut s = SampleScheduler::new(cfg, u32::MAX - 100);
        // Counter wrapped: now < last_sample. Sentinel elapsed exceeds
        // every interval, so the poll is due at once.
        assert!(s.poll(5));
        // And the wrapped boot delta also satisfies the startup window.
        assert_eq!(s.phase(), Phase::Normal);
        // Cadence resumes normally from the new sample time.
        assert!(!s.poll(10));
        assert!(s.poll(5_005));
    }

    #[test]
    fn custom_intervals_are_honored() {
        let cfg = SchedulerCfg {
            startup_interval_ms: 100,
            normal_interval_ms: 1_000,
            startup_window_ms: 300,
        };
        let mut s = SampleScheduler::new(cfg, 0);
        assert!(s.poll(100));
        assert!(s.poll(200));
        assert_eq!(s.phase(), Phase::Startup);
        assert!(s.poll(300));
        assert_eq!(s.phase(), Phase::Normal);
        assert!(!s.poll(900));
        assert!(s.poll(1_300));
    }
}
