#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core fuel-gauge logic (hardware-agnostic).
//!
//! This crate provides the hardware-independent estimation engine. All
//! hardware interactions go through the `gauge_traits::FuelSensor` and
//! `gauge_traits::FuelDisplay` traits.
//!
//! ## Architecture
//!
//! - **Calibration**: raw-code to gallons transfer curves (`calibration`)
//! - **Filtering**: rolling average over recent readings (`filter`)
//! - **Scheduling**: startup/normal sampling cadence (`scheduler`)
//! - **Quantization**: gallons to bar segments (`quantizer`)
//! - **Control**: `FuelGauge` ties one sample tick together
//!
//! Per due tick the order is fixed: scheduler poll, sensor read, filter,
//! calibration, quantization, meter render, stats render, diagnostics.
//! Polls that are not due touch nothing, least of all the sensor.

// Module declarations
pub mod calibration;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod mocks;
pub mod quantizer;
pub mod runner;
pub mod scheduler;
pub mod util;

pub use calibration::{DirectCurve, FuelCurve, TwoStageCurve};
pub use error::{BuildError, GaugeError, Result};
pub use filter::SampleFilter;
pub use quantizer::MeterScale;
pub use scheduler::{Phase, SampleScheduler, SchedulerCfg};

use eyre::WrapErr;
use gauge_traits::clock::{Clock, MonotonicClock};
use gauge_traits::{Diagnostics, FuelDisplay, FuelSensor};
use std::sync::Arc;

/// Filter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCfg {
    /// Rolling-average window in samples; 1 disables smoothing and the
    /// calibration sees each raw reading directly.
    pub window: usize,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { window: 100 }
    }
}

/// Everything computed for one rendered sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelReport {
    /// Scheduler tick that produced the sample.
    pub at_ms: u32,
    /// Latest raw sender code.
    pub raw: u16,
    /// Estimated sender resistance (two-stage curve only).
    pub ohms: Option<f32>,
    /// Unclamped fuel estimate.
    pub gallons: f32,
    /// Filled bar cells after quantization.
    pub segments: u8,
}

/// Outcome of a single control-loop poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus {
    /// No sample was due; nothing was read or rendered.
    Idle,
    /// A sample was taken and both render commands were issued.
    Rendered(FuelReport),
}

/// The control loop: one sensor, one display, one scheduler tick at a
/// time. Owns the filter window and scheduler state exclusively.
pub struct FuelGauge<S: FuelSensor, D: FuelDisplay> {
    sensor: S,
    display: D,
    curve: FuelCurve,
    filter: Option<SampleFilter>,
    scheduler: SampleScheduler,
    meter: MeterScale,
    clock: Arc<dyn Clock + Send + Sync>,
    diagnostics: Option<Box<dyn Diagnostics>>,
    last_report: Option<FuelReport>,
}

impl<S: FuelSensor, D: FuelDisplay> core::fmt::Debug for FuelGauge<S, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FuelGauge")
            .field("phase", &self.scheduler.phase())
            .field("curve", &self.curve)
            .field("last_report", &self.last_report)
            .finish()
    }
}

impl<S: FuelSensor, D: FuelDisplay> FuelGauge<S, D> {
    /// One poll of the control loop against the injected clock.
    pub fn tick(&mut self) -> Result<TickStatus> {
        let now_ms = self.clock.now_ms();
        self.tick_at(now_ms)
    }

    /// One poll at an explicit tick; the deterministic entry point tests
    /// and host schedulers drive directly.
    pub fn tick_at(&mut self, now_ms: u32) -> Result<TickStatus> {
        // Due decision strictly before any sensor access.
        if !self.scheduler.poll(now_ms) {
            return Ok(TickStatus::Idle);
        }

        let raw = self
            .sensor
            .read_raw()
            .map_err(|e| eyre::Report::new(GaugeError::Sensor(e.to_string())))
            .wrap_err("reading fuel sender")?;

        let basis = match &mut self.filter {
            Some(f) => {
                f.push(raw);
                f.average()
            }
            None => f32::from(raw),
        };

        let gallons = self.curve.gallons(basis);
        let ohms = self.curve.ohms(basis);
        let segments = self.meter.segments(gallons);

        self.display
            .render_meter(segments)
            .map_err(|e| eyre::Report::new(GaugeError::Display(e.to_string())))
            .wrap_err("rendering meter")?;
        self.display
            .render_stats(raw, gallons)
            .map_err(|e| eyre::Report::new(GaugeError::Display(e.to_string())))
            .wrap_err("rendering stats")?;

        let report = FuelReport {
            at_ms: now_ms,
            raw,
            ohms,
            gallons,
            segments,
        };

        if let Some(diag) = &mut self.diagnostics {
            diag.line(&snapshot_line(&report, self.scheduler.phase()));
        }
        tracing::debug!(
            at_ms = now_ms,
            raw,
            gallons,
            segments,
            phase = ?self.scheduler.phase(),
            "fuel sample"
        );

        self.last_report = Some(report);
        Ok(TickStatus::Rendered(report))
    }

    /// Most recent rendered sample, if any.
    pub fn last_report(&self) -> Option<FuelReport> {
        self.last_report
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    /// The filter window, when this build smooths at all.
    pub fn filter(&self) -> Option<&SampleFilter> {
        self.filter.as_ref()
    }

    pub fn curve(&self) -> &FuelCurve {
        &self.curve
    }

    /// Handle to the clock this gauge schedules against.
    pub fn clock(&self) -> Arc<dyn Clock + Send + Sync> {
        Arc::clone(&self.clock)
    }
}

/// One human-readable state snapshot per sample for the diagnostics sink.
fn snapshot_line(report: &FuelReport, phase: Phase) -> String {
    match report.ohms {
        Some(ohms) => format!(
            "t={}ms phase={:?} raw={} ohms={:.1} gal={:.2} seg={}",
            report.at_ms, phase, report.raw, ohms, report.gallons, report.segments
        ),
        None => format!(
            "t={}ms phase={:?} raw={} gal={:.2} seg={}",
            report.at_ms, phase, report.raw, report.gallons, report.segments
        ),
    }
}

/// Type-state placeholder for a builder slot not yet provided.
pub struct Missing;

/// Builder for `FuelGauge`. Sensor and display advance the type state, so
/// `build()` only exists once both collaborators are wired; everything
/// else defaults to the stock vehicle and is validated on build.
pub struct GaugeBuilder<S, D> {
    sensor: S,
    display: D,
    curve: FuelCurve,
    filter: FilterCfg,
    scheduler: SchedulerCfg,
    meter: MeterScale,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    diagnostics: Option<Box<dyn Diagnostics>>,
}

impl GaugeBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self {
            sensor: Missing,
            display: Missing,
            curve: FuelCurve::default(),
            filter: FilterCfg::default(),
            scheduler: SchedulerCfg::default(),
            meter: MeterScale::default(),
            clock: None,
            diagnostics: None,
        }
    }
}

impl Default for GaugeBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, D> GaugeBuilder<S, D> {
    pub fn with_sensor<S2: FuelSensor>(self, sensor: S2) -> GaugeBuilder<S2, D> {
        GaugeBuilder {
            sensor,
            display: self.display,
            curve: self.curve,
            filter: self.filter,
            scheduler: self.scheduler,
            meter: self.meter,
            clock: self.clock,
            diagnostics: self.diagnostics,
        }
    }

    pub fn with_display<D2: FuelDisplay>(self, display: D2) -> GaugeBuilder<S, D2> {
        GaugeBuilder {
            sensor: self.sensor,
            display,
            curve: self.curve,
            filter: self.filter,
            scheduler: self.scheduler,
            meter: self.meter,
            clock: self.clock,
            diagnostics: self.diagnostics,
        }
    }

    pub fn with_curve(mut self, curve: FuelCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerCfg) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_meter(mut self, meter: MeterScale) -> Self {
        self.meter = meter;
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }
}

impl<S: FuelSensor, D: FuelDisplay> GaugeBuilder<S, D> {
    /// Validate configuration and assemble the gauge. The scheduler boots
    /// at the clock's current tick.
    pub fn build(self) -> Result<FuelGauge<S, D>> {
        if self.filter.window == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "filter window must be >= 1",
            )));
        }
        if self.scheduler.startup_interval_ms == 0 || self.scheduler.normal_interval_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sampling intervals must be >= 1 ms",
            )));
        }
        if self.meter.max_segments == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "meter must have at least one segment",
            )));
        }
        if let Err(msg) = self.curve.validate() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(msg)));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };
        let filter = if self.filter.window > 1 {
            Some(SampleFilter::new(self.filter.window))
        } else {
            None
        };
        let boot_ms = clock.now_ms();
        let scheduler = SampleScheduler::new(self.scheduler, boot_ms);
        tracing::info!(
            boot_ms,
            window = self.filter.window,
            curve = ?self.curve,
            "fuel gauge assembled"
        );

        Ok(FuelGauge {
            sensor: self.sensor,
            display: self.display,
            curve: self.curve,
            filter,
            scheduler,
            meter: self.meter,
            clock,
            diagnostics: self.diagnostics,
            last_report: None,
        })
    }
}


#[cfg(test)]
mod snapshot_tests {
    use super::{FuelReport, Phase, snapshot_line};

    #[test]
    fn includes_ohms_only_when_modeled() {
        let with_ohms = FuelReport {
            at_ms: 500,
            raw: 243,
            ohms: Some(25.69),
            gallons: 14.17,
            segments: 12,
        };
        let line = snapshot_line(&with_ohms, Phase::Startup);
        assert!(line.contains("ohms=25.7"));
        assert!(line.contains("seg=12"));

        let direct = FuelReport {
            ohms: None,
            ..with_ohms
        };
        let line = snapshot_line(&direct, Phase::Normal);
        assert!(!line.contains("ohms"));
        assert!(line.contains("phase=Normal"));
    }
}
