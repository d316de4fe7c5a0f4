//! Continuous gauge loop.
//!
//! Polls the control loop at a fixed host cadence until asked to shut
//! down. The scheduler inside the gauge decides which polls actually
//! sample; this loop just paces the polls and sleeps in between, so the
//! whole system stays a single cooperative thread.

use crate::error::Result;
use crate::{FuelGauge, TickStatus};
use gauge_traits::{FuelDisplay, FuelSensor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Host-side loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct RunCfg {
    /// Delay between scheduler polls in milliseconds.
    pub poll_ms: u64,
    /// Stop after this many rendered samples; None runs until shutdown.
    pub max_samples: Option<u64>,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            poll_ms: 50,
            max_samples: None,
        }
    }
}

/// Poll delay as a Duration, clamped to at least 1 ms.
#[inline]
pub fn poll_period(poll_ms: u64) -> Duration {
    Duration::from_millis(poll_ms.max(1))
}

/// Drive the gauge until shutdown is flagged or the sample budget is
/// spent. Returns the number of rendered samples.
pub fn run<S, D>(
    gauge: &mut FuelGauge<S, D>,
    cfg: &RunCfg,
    shutdown: &AtomicBool,
) -> Result<u64>
where
    S: FuelSensor,
    D: FuelDisplay,
{
    let clock = gauge.clock();
    let period = poll_period(cfg.poll_ms);
    let mut rendered: u64 = 0;

    tracing::info!(poll_ms = cfg.poll_ms, "gauge loop start");
    while !shutdown.load(Ordering::Relaxed) {
        match gauge.tick()? {
            TickStatus::Idle => {}
            TickStatus::Rendered(report) => {
                rendered += 1;
                tracing::debug!(
                    raw = report.raw,
                    gallons = report.gallons,
                    segments = report.segments,
                    rendered,
                    "sample rendered"
                );
                if let Some(max) = cfg.max_samples
                    && rendered >= max
                {
                    break;
                }
            }
        }
        clock.sleep(period);
    }
    tracing::info!(rendered, "gauge loop stop");
    Ok(rendered)
}
